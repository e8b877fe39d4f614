//! Constants used throughout the BioTrack core crate.

/// Default location of the treatment store when no explicit file is configured.
pub const DEFAULT_DATA_FILE: &str = "biotrack_data/treatments.json";

/// Message shown by clients when a timeline has nothing to render.
pub const NO_DATA_MESSAGE: &str = "No treatment data to display";

/// Smallest bar width, as a fraction of the timeline, so short programs stay clickable.
pub const MIN_BAR_WIDTH: f64 = 0.001;

/// Longest program accepted, in days. Longer records are excluded from timelines and
/// rejected on create or extend.
pub const MAX_PROGRAMMED_DAYS: u32 = 3650;

/// Longest patient identifier accepted by the store.
pub const MAX_PATIENT_ID_LEN: usize = 64;
