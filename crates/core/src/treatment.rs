//! Treatment records, validated treatment periods and the status state machine.
//!
//! Treatments arrive from outside (the store, a REST body, a JSON file) as loosely typed
//! [`TreatmentRecord`]s. Before any timeline arithmetic they are validated into
//! [`TreatmentPeriod`]s, which carry calendar dates and tagged enums instead of strings.
//!
//! ## Status transitions
//!
//! ```text
//! active ──suspend──> suspended
//! active ──finish───> finished
//! active ──extend───> extended ──extend──> extended
//! ```
//!
//! `suspended` and `finished` accept no further changes. Doses can be recorded while a
//! program is `active` or `extended`.

use crate::constants::MAX_PROGRAMMED_DAYS;
use crate::error::{RecordError, TrackerError, TrackerResult};
use crate::lenient;
use chrono::{DateTime, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of drug administered by a treatment program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AntibioticType {
    Antibiotic,
    Corticoide,
}

impl AntibioticType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AntibioticType::Antibiotic => "antibiotic",
            AntibioticType::Corticoide => "corticoide",
        }
    }
}

impl fmt::Display for AntibioticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AntibioticType {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "antibiotic" => Ok(AntibioticType::Antibiotic),
            "corticoide" => Ok(AntibioticType::Corticoide),
            other => Err(RecordError::UnknownAntibioticType(other.to_string())),
        }
    }
}

/// Lifecycle state of a treatment program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TreatmentStatus {
    Active,
    Suspended,
    Extended,
    Finished,
}

impl TreatmentStatus {
    pub const ALL: [TreatmentStatus; 4] = [
        TreatmentStatus::Active,
        TreatmentStatus::Suspended,
        TreatmentStatus::Extended,
        TreatmentStatus::Finished,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TreatmentStatus::Active => "active",
            TreatmentStatus::Suspended => "suspended",
            TreatmentStatus::Extended => "extended",
            TreatmentStatus::Finished => "finished",
        }
    }

    /// Whether doses can still be recorded against the program.
    pub fn accepts_doses(&self) -> bool {
        matches!(self, TreatmentStatus::Active | TreatmentStatus::Extended)
    }
}

impl fmt::Display for TreatmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TreatmentStatus {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(TreatmentStatus::Active),
            "suspended" => Ok(TreatmentStatus::Suspended),
            "extended" => Ok(TreatmentStatus::Extended),
            "finished" => Ok(TreatmentStatus::Finished),
            other => Err(RecordError::UnknownStatus(other.to_string())),
        }
    }
}

/// A change requested against a treatment program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusChange {
    Suspend,
    Finish,
    Extend { additional_days: u32 },
    RecordDose,
}

impl fmt::Display for StatusChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusChange::Suspend => f.write_str("suspend"),
            StatusChange::Finish => f.write_str("finish"),
            StatusChange::Extend { additional_days } => {
                write!(f, "extend by {additional_days} days")
            }
            StatusChange::RecordDose => f.write_str("record dose"),
        }
    }
}

/// Wire shape of a treatment as served by the treatments API.
///
/// Fields stay loosely typed so that one malformed record can be excluded from a timeline
/// without rejecting the whole list: missing, `null` or wrong-typed values deserialize
/// (see [`crate::lenient`]) and are rejected later by [`TreatmentPeriod::from_record`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentRecord {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub antibiotic_name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub antibiotic_type: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub start_date: String,
    /// Absent or unreadable counts as no doses.
    #[serde(default, deserialize_with = "lenient::days")]
    pub days_applied: Option<i64>,
    #[serde(default, deserialize_with = "lenient::days")]
    pub programmed_days: Option<i64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: String,
}

/// A validated treatment program with calendar dates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreatmentPeriod {
    pub id: String,
    pub antibiotic_name: String,
    pub antibiotic_type: AntibioticType,
    pub start_date: NaiveDate,
    /// Planned completion date (inclusive), derived from `programmed_days`.
    pub end_date: NaiveDate,
    pub days_applied: u32,
    pub programmed_days: u32,
    pub status: TreatmentStatus,
}

impl TreatmentPeriod {
    /// Validates a wire record.
    ///
    /// # Errors
    ///
    /// Returns the first [`RecordError`] found: empty name, unparseable start date, unknown
    /// type or status, missing, negative or oversized day counts (programs are capped at
    /// [`MAX_PROGRAMMED_DAYS`]), or an end date past the calendar.
    pub fn from_record(record: &TreatmentRecord) -> Result<Self, RecordError> {
        if record.antibiotic_name.trim().is_empty() {
            return Err(RecordError::EmptyAntibioticName);
        }

        let start_date = parse_calendar_date(&record.start_date)
            .ok_or_else(|| RecordError::InvalidStartDate(record.start_date.clone()))?;
        let antibiotic_type = record.antibiotic_type.parse::<AntibioticType>()?;
        let status = record.status.parse::<TreatmentStatus>()?;
        let days_applied =
            day_count("daysApplied", record.days_applied.unwrap_or(0), u32::MAX)?;
        let programmed = record
            .programmed_days
            .ok_or(RecordError::MissingDays("programmedDays"))?;
        let programmed_days = day_count("programmedDays", programmed, MAX_PROGRAMMED_DAYS)?;
        let end_date = planned_end_date(start_date, programmed_days)
            .ok_or(RecordError::EndDateOutOfRange(programmed))?;

        Ok(Self {
            id: record.id.clone(),
            antibiotic_name: record.antibiotic_name.clone(),
            antibiotic_type,
            start_date,
            end_date,
            days_applied,
            programmed_days,
            status,
        })
    }

    /// Converts back to the wire shape, with the start date in `YYYY-MM-DD` form.
    pub fn to_record(&self) -> TreatmentRecord {
        TreatmentRecord {
            id: self.id.clone(),
            antibiotic_name: self.antibiotic_name.clone(),
            antibiotic_type: self.antibiotic_type.as_str().to_string(),
            start_date: self.start_date.format("%Y-%m-%d").to_string(),
            days_applied: Some(i64::from(self.days_applied)),
            programmed_days: Some(i64::from(self.programmed_days)),
            status: self.status.as_str().to_string(),
        }
    }

    /// Fraction of the program administered so far, clamped to `[0, 1]`.
    ///
    /// A program with no programmed days has no progress.
    pub fn progress(&self) -> f64 {
        if self.programmed_days == 0 {
            return 0.0;
        }
        (f64::from(self.days_applied) / f64::from(self.programmed_days)).clamp(0.0, 1.0)
    }

    /// Applies `change`, returning the updated period.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::InvalidTransition`] if the change is not allowed from the current
    ///   status.
    /// - [`TrackerError::InvalidInput`] for an extension of zero days, one past
    ///   [`MAX_PROGRAMMED_DAYS`], or a dose count overflow.
    pub fn apply(&self, change: StatusChange) -> TrackerResult<Self> {
        let mut next = self.clone();

        match (self.status, change) {
            (TreatmentStatus::Active, StatusChange::Suspend) => {
                next.status = TreatmentStatus::Suspended;
            }
            (TreatmentStatus::Active, StatusChange::Finish) => {
                next.status = TreatmentStatus::Finished;
            }
            (
                TreatmentStatus::Active | TreatmentStatus::Extended,
                StatusChange::Extend { additional_days },
            ) => {
                if additional_days == 0 {
                    return Err(TrackerError::InvalidInput(
                        "an extension must add at least one day".into(),
                    ));
                }
                next.programmed_days = self
                    .programmed_days
                    .checked_add(additional_days)
                    .filter(|days| *days <= MAX_PROGRAMMED_DAYS)
                    .ok_or_else(|| {
                        TrackerError::InvalidInput(format!(
                            "a program cannot exceed {MAX_PROGRAMMED_DAYS} days"
                        ))
                    })?;
                next.end_date = planned_end_date(self.start_date, next.programmed_days)
                    .ok_or_else(|| {
                        TrackerError::InvalidInput("extended end date is out of range".into())
                    })?;
                next.status = TreatmentStatus::Extended;
            }
            (status, StatusChange::RecordDose) if status.accepts_doses() => {
                next.days_applied = self
                    .days_applied
                    .checked_add(1)
                    .ok_or_else(|| TrackerError::InvalidInput("days applied overflow".into()))?;
            }
            (from, change) => return Err(TrackerError::InvalidTransition { from, change }),
        }

        Ok(next)
    }
}

/// Parses `YYYY-MM-DD`, or an RFC 3339 timestamp whose date in its own offset is used.
pub fn parse_calendar_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(input)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Inclusive planned end date; a program with zero programmed days ends on its start day.
pub(crate) fn planned_end_date(start: NaiveDate, programmed_days: u32) -> Option<NaiveDate> {
    match programmed_days {
        0 => Some(start),
        n => start.checked_add_days(Days::new(u64::from(n) - 1)),
    }
}

fn day_count(field: &'static str, value: i64, max: u32) -> Result<u32, RecordError> {
    if value < 0 {
        return Err(RecordError::NegativeDays { field, value });
    }
    u32::try_from(value)
        .ok()
        .filter(|days| *days <= max)
        .ok_or(RecordError::DaysTooLarge { field, value, max })
}
