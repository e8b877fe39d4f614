//! REST wire models and translation helpers.
//!
//! Responsibilities:
//! - Define the JSON request/response bodies served by BioTrack, with OpenAPI schemas
//! - Translate between core domain types and these wire bodies
//!
//! All bodies use camelCase keys, matching the treatments API consumed by the web client.

use biotrack_core::timeline::{
    AxisMarker, BarPosition, EventKind, ExcludedRecord, PeriodPosition, TimelineEvent,
    TimelineSummary, Track,
};
use biotrack_core::lenient;
use biotrack_core::treatment::parse_calendar_date;
use biotrack_core::{
    AntibioticType, NewTreatment, StatusChange, Timeline, TrackerError, TrackerResult,
    TreatmentPeriod, TreatmentRecord,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================================
// Generic bodies
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Error envelope returned for every non-2xx response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: ErrorDetail,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

// ============================================================================
// Treatments
// ============================================================================

/// A treatment as stored and served.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
///
/// Fields read leniently: a `null`, missing or wrong-typed value never fails the whole body.
/// Such rows are reported as excluded when a timeline is built from them.
pub struct TreatmentRes {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub antibiotic_name: String,
    /// `antibiotic` or `corticoide`.
    #[serde(default, deserialize_with = "lenient::text")]
    pub antibiotic_type: String,
    /// ISO date (`YYYY-MM-DD`).
    #[serde(default, deserialize_with = "lenient::text")]
    pub start_date: String,
    #[serde(default, deserialize_with = "lenient::days")]
    pub days_applied: Option<i64>,
    #[serde(default, deserialize_with = "lenient::days")]
    pub programmed_days: Option<i64>,
    /// `active`, `suspended`, `extended` or `finished`.
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: String,
}

impl From<TreatmentRecord> for TreatmentRes {
    fn from(r: TreatmentRecord) -> Self {
        Self {
            id: r.id,
            antibiotic_name: r.antibiotic_name,
            antibiotic_type: r.antibiotic_type,
            start_date: r.start_date,
            days_applied: r.days_applied,
            programmed_days: r.programmed_days,
            status: r.status,
        }
    }
}

impl From<TreatmentRes> for TreatmentRecord {
    fn from(r: TreatmentRes) -> Self {
        Self {
            id: r.id,
            antibiotic_name: r.antibiotic_name,
            antibiotic_type: r.antibiotic_type,
            start_date: r.start_date,
            days_applied: r.days_applied,
            programmed_days: r.programmed_days,
            status: r.status,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListTreatmentsRes {
    pub treatments: Vec<TreatmentRes>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTreatmentReq {
    pub antibiotic_name: String,
    pub antibiotic_type: String,
    pub start_date: String,
    pub programmed_days: u32,
}

impl CreateTreatmentReq {
    /// Validates the request into a core [`NewTreatment`].
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::InvalidInput` for an unknown antibiotic type or a start date
    /// that is not a calendar date.
    pub fn into_new_treatment(self) -> TrackerResult<NewTreatment> {
        let antibiotic_type = self
            .antibiotic_type
            .parse::<AntibioticType>()
            .map_err(|e| TrackerError::InvalidInput(e.to_string()))?;
        let start_date = parse_calendar_date(&self.start_date).ok_or_else(|| {
            TrackerError::InvalidInput(format!(
                "start date is not a calendar date: '{}'",
                self.start_date
            ))
        })?;

        Ok(NewTreatment {
            antibiotic_name: self.antibiotic_name,
            antibiotic_type,
            start_date,
            programmed_days: self.programmed_days,
        })
    }
}

/// Change requested through `POST /treatments/{id}/status`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatusAction {
    Suspend,
    Finish,
    Extend,
    RecordDose,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeReq {
    pub action: StatusAction,
    /// Required for `extend`.
    #[serde(default)]
    pub additional_days: Option<u32>,
}

impl StatusChangeReq {
    /// # Errors
    ///
    /// Returns `TrackerError::InvalidInput` when `extend` has no `additionalDays`.
    pub fn into_change(self) -> TrackerResult<StatusChange> {
        match self.action {
            StatusAction::Suspend => Ok(StatusChange::Suspend),
            StatusAction::Finish => Ok(StatusChange::Finish),
            StatusAction::RecordDose => Ok(StatusChange::RecordDose),
            StatusAction::Extend => self
                .additional_days
                .map(|additional_days| StatusChange::Extend { additional_days })
                .ok_or_else(|| {
                    TrackerError::InvalidInput("extend requires additionalDays".into())
                }),
        }
    }
}

// ============================================================================
// Timeline
// ============================================================================

/// Body of `POST /timeline`: render a timeline for records supplied by the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimelineReq {
    pub treatments: Vec<TreatmentRes>,
    #[serde(default)]
    pub zoom: Option<String>,
    #[serde(default)]
    pub grouping: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRes {
    pub id: String,
    pub antibiotic_name: String,
    pub antibiotic_type: String,
    pub start_date: String,
    pub end_date: String,
    pub days_applied: u32,
    pub programmed_days: u32,
    pub status: String,
    pub progress: f64,
}

impl From<&TreatmentPeriod> for PeriodRes {
    fn from(p: &TreatmentPeriod) -> Self {
        Self {
            id: p.id.clone(),
            antibiotic_name: p.antibiotic_name.clone(),
            antibiotic_type: p.antibiotic_type.to_string(),
            start_date: p.start_date.to_string(),
            end_date: p.end_date.to_string(),
            days_applied: p.days_applied,
            programmed_days: p.programmed_days,
            status: p.status.to_string(),
            progress: p.progress(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackRes {
    pub antibiotic_name: String,
    pub periods: Vec<PeriodRes>,
}

impl From<&Track> for TrackRes {
    fn from(t: &Track) -> Self {
        Self {
            antibiotic_name: t.antibiotic_name.clone(),
            periods: t.periods.iter().map(PeriodRes::from).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AxisMarkerRes {
    pub date: String,
    pub position: f64,
    pub label: String,
    pub is_minor: bool,
}

impl From<&AxisMarker> for AxisMarkerRes {
    fn from(m: &AxisMarker) -> Self {
        Self {
            date: m.date.to_string(),
            position: m.position,
            label: m.label.clone(),
            is_minor: m.is_minor,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventRes {
    pub date: String,
    pub position: f64,
    /// `start`, `pause`, `resume`, `finish` or `extend`.
    pub kind: String,
    pub antibiotic_name: String,
    pub treatment_id: String,
    pub description: String,
}

impl From<&TimelineEvent> for EventRes {
    fn from(e: &TimelineEvent) -> Self {
        let kind = match e.kind {
            EventKind::Start => "start",
            EventKind::Pause => "pause",
            EventKind::Resume => "resume",
            EventKind::Finish => "finish",
            EventKind::Extend => "extend",
        };
        Self {
            date: e.date.to_string(),
            position: e.position,
            kind: kind.to_string(),
            antibiotic_name: e.antibiotic_name.clone(),
            treatment_id: e.treatment_id.clone(),
            description: e.description.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PositionRes {
    pub treatment_id: String,
    pub left: f64,
    pub width: f64,
    pub progress: f64,
    pub visible: bool,
}

impl From<&PeriodPosition> for PositionRes {
    fn from(p: &PeriodPosition) -> Self {
        let BarPosition {
            left,
            width,
            progress,
            visible,
        } = p.bar;
        Self {
            treatment_id: p.treatment_id.clone(),
            left,
            width,
            progress,
            visible,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRes {
    pub total_treatments: usize,
    pub active: usize,
    pub suspended: usize,
    pub extended: usize,
    pub finished: usize,
    pub antibiotics: usize,
    pub corticoids: usize,
    pub total_programmed_days: u64,
    pub total_days_applied: u64,
    pub overall_progress: f64,
    pub ongoing_antibiotics: Vec<String>,
}

impl From<&TimelineSummary> for SummaryRes {
    fn from(s: &TimelineSummary) -> Self {
        Self {
            total_treatments: s.total_treatments,
            active: s.active,
            suspended: s.suspended,
            extended: s.extended,
            finished: s.finished,
            antibiotics: s.antibiotics,
            corticoids: s.corticoids,
            total_programmed_days: s.total_programmed_days,
            total_days_applied: s.total_days_applied,
            overall_progress: s.overall_progress,
            ongoing_antibiotics: s.ongoing_antibiotics.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExcludedRes {
    pub id: String,
    pub reason: String,
}

impl From<&ExcludedRecord> for ExcludedRes {
    fn from(e: &ExcludedRecord) -> Self {
        Self {
            id: e.id.clone(),
            reason: e.reason.clone(),
        }
    }
}

/// Timeline render bundle.
///
/// `status` is `ready` or `no_data`. With `no_data`, only `message` and `excluded` are
/// populated and clients should show the message instead of a timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelineRes {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<String>,
    pub tracks: Vec<TrackRes>,
    pub axis_markers: Vec<AxisMarkerRes>,
    pub events: Vec<EventRes>,
    pub positions: Vec<PositionRes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryRes>,
    pub excluded: Vec<ExcludedRes>,
}

impl From<&Timeline> for TimelineRes {
    fn from(timeline: &Timeline) -> Self {
        match timeline {
            Timeline::NoData { message, excluded } => Self {
                status: "no_data".into(),
                message: Some(message.clone()),
                min_date: None,
                max_date: None,
                total_days: None,
                zoom: None,
                tracks: Vec::new(),
                axis_markers: Vec::new(),
                events: Vec::new(),
                positions: Vec::new(),
                summary: None,
                excluded: excluded.iter().map(ExcludedRes::from).collect(),
            },
            Timeline::Ready(data) => Self {
                status: "ready".into(),
                message: None,
                min_date: Some(data.range.min_date.to_string()),
                max_date: Some(data.range.max_date.to_string()),
                total_days: Some(data.range.total_days),
                zoom: Some(data.zoom.to_string()),
                tracks: data.tracks.iter().map(TrackRes::from).collect(),
                axis_markers: data.axis_markers.iter().map(AxisMarkerRes::from).collect(),
                events: data.events.iter().map(EventRes::from).collect(),
                positions: data.positions.iter().map(PositionRes::from).collect(),
                summary: Some(SummaryRes::from(&data.summary)),
                excluded: data.excluded.iter().map(ExcludedRes::from).collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biotrack_core::{build_timeline, TimelineOptions, NO_DATA_MESSAGE};

    fn res(id: &str, start: &str, days: i64, applied: i64, status: &str) -> TreatmentRes {
        TreatmentRes {
            id: id.into(),
            antibiotic_name: "Amoxicillin".into(),
            antibiotic_type: "antibiotic".into(),
            start_date: start.into(),
            days_applied: Some(applied),
            programmed_days: Some(days),
            status: status.into(),
        }
    }

    #[test]
    fn create_request_validates_type_and_date() {
        let ok = CreateTreatmentReq {
            antibiotic_name: "Ceftriaxone".into(),
            antibiotic_type: "antibiotic".into(),
            start_date: "2024-04-02".into(),
            programmed_days: 7,
        };
        let new = ok.clone().into_new_treatment().unwrap();
        assert_eq!(new.start_date.to_string(), "2024-04-02");
        assert_eq!(new.antibiotic_type, AntibioticType::Antibiotic);

        let mut bad_type = ok.clone();
        bad_type.antibiotic_type = "antiviral".into();
        assert!(matches!(
            bad_type.into_new_treatment(),
            Err(TrackerError::InvalidInput(_))
        ));

        let mut bad_date = ok;
        bad_date.start_date = "April 2nd".into();
        assert!(matches!(
            bad_date.into_new_treatment(),
            Err(TrackerError::InvalidInput(_))
        ));
    }

    #[test]
    fn status_change_request_parses_snake_case_actions() {
        let req: StatusChangeReq =
            serde_json::from_str(r#"{"action":"extend","additionalDays":3}"#).unwrap();
        assert_eq!(
            req.into_change().unwrap(),
            StatusChange::Extend { additional_days: 3 }
        );

        let req: StatusChangeReq = serde_json::from_str(r#"{"action":"record_dose"}"#).unwrap();
        assert_eq!(req.into_change().unwrap(), StatusChange::RecordDose);

        let req: StatusChangeReq = serde_json::from_str(r#"{"action":"extend"}"#).unwrap();
        assert!(req.into_change().is_err());
    }

    #[test]
    fn ready_timeline_translates_every_section() {
        let records: Vec<TreatmentRecord> = vec![
            res("a", "2024-01-01", 5, 3, "active").into(),
            res("b", "2024-01-10", 3, 3, "finished").into(),
        ];
        let timeline = build_timeline(&records, &TimelineOptions::default());
        let wire = TimelineRes::from(&timeline);

        assert_eq!(wire.status, "ready");
        assert_eq!(wire.min_date.as_deref(), Some("2024-01-01"));
        assert_eq!(wire.max_date.as_deref(), Some("2024-01-12"));
        assert_eq!(wire.total_days, Some(12));
        assert_eq!(wire.zoom.as_deref(), Some("week"));
        assert_eq!(wire.tracks.len(), 1);
        assert_eq!(wire.tracks[0].periods[1].end_date, "2024-01-12");
        assert_eq!(wire.positions.len(), 2);
        assert!(wire.events.iter().any(|e| e.kind == "finish"));
        assert_eq!(wire.summary.as_ref().map(|s| s.total_treatments), Some(2));

        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["axisMarkers"][0]["isMinor"], false);
        assert!(json.get("message").is_none());
    }

    #[test]
    fn timeline_request_tolerates_null_and_missing_start_dates() {
        let req: TimelineReq = serde_json::from_str(
            r#"{"treatments":[
                {"id":"a","antibioticName":"Amoxicillin","antibioticType":"antibiotic",
                 "startDate":"2024-01-01","daysApplied":1,"programmedDays":5,"status":"active"},
                {"id":"b","antibioticName":"Prednisone","antibioticType":"corticoide",
                 "startDate":null,"programmedDays":"4","status":"active"},
                {"id":"c","antibioticName":"Cefazolin","antibioticType":"antibiotic",
                 "programmedDays":3,"status":"active"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(req.treatments[1].start_date, "");
        assert_eq!(req.treatments[1].programmed_days, Some(4));
        assert_eq!(req.treatments[2].days_applied, None);

        let records: Vec<TreatmentRecord> = req.treatments.into_iter().map(Into::into).collect();
        let wire = TimelineRes::from(&build_timeline(&records, &TimelineOptions::default()));
        assert_eq!(wire.status, "ready");
        let excluded: Vec<&str> = wire.excluded.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(excluded, vec!["b", "c"]);
    }

    #[test]
    fn no_data_timeline_carries_the_message() {
        let records: Vec<TreatmentRecord> = vec![res("x", "soon", 5, 0, "active").into()];
        let wire = TimelineRes::from(&build_timeline(&records, &TimelineOptions::default()));

        assert_eq!(wire.status, "no_data");
        assert_eq!(wire.message.as_deref(), Some(NO_DATA_MESSAGE));
        assert_eq!(wire.excluded.len(), 1);
        assert!(wire.tracks.is_empty());
        assert!(wire.summary.is_none());
    }
}
