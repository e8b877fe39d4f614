use crate::treatment::{StatusChange, TreatmentStatus};

/// Reasons a single treatment record cannot be turned into a [`crate::TreatmentPeriod`].
///
/// These never abort a timeline build; the offending record is excluded and reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("antibiotic name is empty")]
    EmptyAntibioticName,
    #[error("start date is not a calendar date: '{0}'")]
    InvalidStartDate(String),
    #[error("unknown antibiotic type: '{0}'")]
    UnknownAntibioticType(String),
    #[error("unknown treatment status: '{0}'")]
    UnknownStatus(String),
    #[error("{0} is missing or not a whole number")]
    MissingDays(&'static str),
    #[error("{field} must not be negative, got {value}")]
    NegativeDays { field: &'static str, value: i64 },
    #[error("{field} is too large: {value} (at most {max})")]
    DaysTooLarge {
        field: &'static str,
        value: i64,
        max: u32,
    },
    #[error("programmed days {0} put the end date outside the calendar")]
    EndDateOutOfRange(i64),
}

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid treatment record {id}: {source}")]
    InvalidRecord {
        id: String,
        #[source]
        source: RecordError,
    },
    #[error("cannot apply {change} to a treatment that is {from}")]
    InvalidTransition {
        from: TreatmentStatus,
        change: StatusChange,
    },
    #[error("treatment not found: {0}")]
    TreatmentNotFound(String),
    #[error("failed to create data directory: {0}")]
    DataDirCreation(std::io::Error),
    #[error("failed to read treatment file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write treatment file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialize treatments: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize treatments: {0}")]
    Deserialization(serde_json::Error),
}

pub type TrackerResult<T> = std::result::Result<T, TrackerError>;
