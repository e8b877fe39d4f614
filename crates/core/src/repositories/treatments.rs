//! JSON-file treatment store.
//!
//! All treatments live in a single JSON document:
//!
//! ```text
//! {
//!   "treatments": [
//!     { "patientId": "42", "id": "...", "antibioticName": "...", ... }
//!   ]
//! }
//! ```
//!
//! Each entry is a [`TreatmentRecord`] tagged with the owning patient. A missing file is an
//! empty store. Writes go to a sibling temporary file that is then renamed over the original,
//! and a process-local lock serialises read-modify-write cycles.

use crate::config::CoreConfig;
use crate::constants::MAX_PROGRAMMED_DAYS;
use crate::error::{TrackerError, TrackerResult};
use crate::id::TreatmentId;
use crate::timeline::{build_timeline, Timeline, TimelineOptions};
use crate::treatment::{
    AntibioticType, StatusChange, TreatmentPeriod, TreatmentRecord, TreatmentStatus,
};
use crate::validation::validate_patient_id;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

/// Fields supplied when prescribing a new treatment program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTreatment {
    pub antibiotic_name: String,
    pub antibiotic_type: AntibioticType,
    pub start_date: NaiveDate,
    pub programmed_days: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTreatment {
    #[serde(default)]
    patient_id: String,
    #[serde(flatten)]
    record: TreatmentRecord,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    treatments: Vec<StoredTreatment>,
}

/// Treatment persistence backed by one JSON file.
#[derive(Clone, Debug)]
pub struct TreatmentStore {
    cfg: Arc<CoreConfig>,
    lock: Arc<Mutex<()>>,
}

impl TreatmentStore {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self {
            cfg,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Treatments recorded for `patient_id`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError` if the patient id is invalid or the store cannot be read.
    pub fn list_for_patient(&self, patient_id: &str) -> TrackerResult<Vec<TreatmentRecord>> {
        validate_patient_id(patient_id)?;
        let _guard = self.guard();

        Ok(self
            .load()?
            .treatments
            .into_iter()
            .filter(|t| t.patient_id == patient_id)
            .map(|t| t.record)
            .collect())
    }

    /// Builds the timeline for one patient from the stored records.
    ///
    /// # Errors
    ///
    /// Same as [`TreatmentStore::list_for_patient`]. Malformed stored records do not fail the
    /// call; they are reported in the timeline's exclusions.
    pub fn timeline_for_patient(
        &self,
        patient_id: &str,
        options: &TimelineOptions,
    ) -> TrackerResult<Timeline> {
        let records = self.list_for_patient(patient_id)?;
        Ok(build_timeline(&records, options))
    }

    /// Stores a new `active` treatment with no applied doses.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::InvalidInput` for an invalid patient id, a blank antibiotic name
    /// or a programmed length outside `1..=MAX_PROGRAMMED_DAYS`, and I/O or serialisation
    /// errors from the store.
    pub fn create(&self, patient_id: &str, new: NewTreatment) -> TrackerResult<TreatmentRecord> {
        validate_patient_id(patient_id)?;
        if new.antibiotic_name.trim().is_empty() {
            return Err(TrackerError::InvalidInput(
                "antibiotic name cannot be empty".into(),
            ));
        }
        if new.programmed_days == 0 {
            return Err(TrackerError::InvalidInput(
                "programmed days must be greater than zero".into(),
            ));
        }
        if new.programmed_days > MAX_PROGRAMMED_DAYS {
            return Err(TrackerError::InvalidInput(format!(
                "programmed days cannot exceed {MAX_PROGRAMMED_DAYS}"
            )));
        }

        let record = TreatmentRecord {
            id: TreatmentId::new().to_string(),
            antibiotic_name: new.antibiotic_name.trim().to_string(),
            antibiotic_type: new.antibiotic_type.as_str().to_string(),
            start_date: new.start_date.format("%Y-%m-%d").to_string(),
            days_applied: Some(0),
            programmed_days: Some(i64::from(new.programmed_days)),
            status: TreatmentStatus::Active.as_str().to_string(),
        };
        // Reject programs whose end date falls off the calendar before persisting them.
        TreatmentPeriod::from_record(&record).map_err(|source| TrackerError::InvalidRecord {
            id: record.id.clone(),
            source,
        })?;

        let _guard = self.guard();
        let mut file = self.load()?;
        file.treatments.push(StoredTreatment {
            patient_id: patient_id.to_string(),
            record: record.clone(),
        });
        self.save(&file)?;

        tracing::info!(treatment_id = %record.id, patient_id, "created treatment");
        Ok(record)
    }

    /// Applies a status change to a stored treatment and persists the result.
    ///
    /// # Errors
    ///
    /// - `TrackerError::TreatmentNotFound` if no treatment has this id.
    /// - `TrackerError::InvalidRecord` if the stored record is malformed.
    /// - `TrackerError::InvalidTransition` if the change is not allowed.
    pub fn apply_change(
        &self,
        treatment_id: &TreatmentId,
        change: StatusChange,
    ) -> TrackerResult<TreatmentRecord> {
        let id = treatment_id.to_string();
        let _guard = self.guard();
        let mut file = self.load()?;

        let stored = file
            .treatments
            .iter_mut()
            .find(|t| t.record.id == id)
            .ok_or_else(|| TrackerError::TreatmentNotFound(id.clone()))?;

        let period = TreatmentPeriod::from_record(&stored.record).map_err(|source| {
            TrackerError::InvalidRecord {
                id: id.clone(),
                source,
            }
        })?;
        let updated = period.apply(change)?;
        stored.record = updated.to_record();
        let record = stored.record.clone();

        self.save(&file)?;
        tracing::info!(treatment_id = %id, %change, status = %updated.status, "updated treatment");
        Ok(record)
    }

    /// Removes a treatment.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::TreatmentNotFound` if no treatment has this id.
    pub fn delete(&self, treatment_id: &TreatmentId) -> TrackerResult<()> {
        let id = treatment_id.to_string();
        let _guard = self.guard();
        let mut file = self.load()?;

        let before = file.treatments.len();
        file.treatments.retain(|t| t.record.id != id);
        if file.treatments.len() == before {
            return Err(TrackerError::TreatmentNotFound(id));
        }

        self.save(&file)?;
        tracing::info!(treatment_id = %id, "deleted treatment");
        Ok(())
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // The guarded value is `()`, so a poisoned lock carries no broken state.
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn load(&self) -> TrackerResult<StoreFile> {
        let path = self.cfg.data_file();
        if !path.exists() {
            return Ok(StoreFile::default());
        }

        let contents = fs::read_to_string(path).map_err(TrackerError::FileRead)?;
        if contents.trim().is_empty() {
            return Ok(StoreFile::default());
        }
        serde_json::from_str(&contents).map_err(TrackerError::Deserialization)
    }

    fn save(&self, file: &StoreFile) -> TrackerResult<()> {
        let path = self.cfg.data_file();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(TrackerError::DataDirCreation)?;
        }

        let json = serde_json::to_string_pretty(file).map_err(TrackerError::Serialization)?;
        let tmp = temp_path_for(path.to_path_buf());
        fs::write(&tmp, json).map_err(TrackerError::FileWrite)?;
        fs::rename(&tmp, path).map_err(TrackerError::FileWrite)
    }
}

fn temp_path_for(mut path: PathBuf) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| format!("{}.tmp", n.to_string_lossy()))
        .unwrap_or_else(|| "treatments.json.tmp".to_string());
    path.set_file_name(name);
    path
}
