//! Input validation utilities.
//!
//! Checks applied to identifiers and request fields before they reach the store.

use crate::constants::MAX_PATIENT_ID_LEN;
use crate::{TrackerError, TrackerResult};

/// Validates an opaque patient identifier.
///
/// Patient ids come from the hosting application and are only used as a lookup key, but they
/// still travel through URLs and log lines:
/// - rejects empty strings
/// - bounds the length
/// - restricts characters to ASCII alphanumerics, `.`, `-` and `_`
///
/// # Errors
///
/// Returns a `TrackerError::InvalidInput` if the identifier is invalid.
pub fn validate_patient_id(patient_id: &str) -> TrackerResult<()> {
    if patient_id.is_empty() {
        return Err(TrackerError::InvalidInput(
            "patient id cannot be empty".into(),
        ));
    }

    if patient_id.len() > MAX_PATIENT_ID_LEN {
        return Err(TrackerError::InvalidInput(format!(
            "patient id exceeds maximum length of {} characters",
            MAX_PATIENT_ID_LEN
        )));
    }

    let ok = patient_id
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'.' | b'-' | b'_'));

    if !ok {
        return Err(TrackerError::InvalidInput(
            "patient id contains invalid characters (only alphanumeric, '.', '-', '_' allowed)"
                .into(),
        ));
    }

    Ok(())
}
