//! Treatment identifiers.
//!
//! Treatments created by BioTrack get a *canonical* identifier: **32 lowercase hexadecimal
//! characters** (a v4 UUID without hyphens), e.g. `550e8400e29b41d4a716446655440000`.
//!
//! Records imported from elsewhere may carry any opaque id; they are rendered as-is. Ids that
//! arrive through mutating API calls must be canonical, which keeps lookups exact and stops
//! odd strings from reaching the store.

use crate::{TrackerError, TrackerResult};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Canonical treatment identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TreatmentId(Uuid);

impl TreatmentId {
    /// Allocates a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an identifier that must already be canonical.
    ///
    /// Hyphenated or uppercase forms are rejected rather than normalised.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidInput`] if `input` is not canonical.
    pub fn parse(input: &str) -> TrackerResult<Self> {
        if !Self::is_canonical(input) {
            return Err(TrackerError::InvalidInput(format!(
                "treatment id must be 32 lowercase hex characters without hyphens, got: '{}'",
                input
            )));
        }
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| TrackerError::InvalidInput(format!("invalid treatment id: {e}")))
    }

    /// Purely syntactic canonical-form check.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }
}

impl Default for TreatmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TreatmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for TreatmentId {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TreatmentId::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_canonical_and_distinct() {
        let a = TreatmentId::new().to_string();
        let b = TreatmentId::new().to_string();

        assert!(TreatmentId::is_canonical(&a));
        assert_ne!(a, b);
        assert_eq!(TreatmentId::parse(&a).unwrap().to_string(), a);
    }

    #[test]
    fn parse_rejects_non_canonical_forms() {
        for input in [
            "550e8400-e29b-41d4-a716-446655440000",
            "550E8400E29B41D4A716446655440000",
            "550e8400e29b41d4a71644665544000",
            "550e8400e29b41d4a7164466554400000",
            "550e8400e29b41d4a716446655440zzz",
            "",
        ] {
            match TreatmentId::parse(input) {
                Err(TrackerError::InvalidInput(msg)) => {
                    assert!(msg.contains("32 lowercase hex characters"))
                }
                other => panic!("expected InvalidInput for {input:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn from_str_matches_parse() {
        let parsed: TreatmentId = "00112233445566778899aabbccddeeff".parse().unwrap();
        assert_eq!(parsed.to_string(), "00112233445566778899aabbccddeeff");
        assert!("not-an-id".parse::<TreatmentId>().is_err());
    }
}
