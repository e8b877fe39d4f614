use crate::treatment::TreatmentPeriod;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// How antibiotic names are compared when grouping periods into tracks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TrackGrouping {
    /// Raw, case-sensitive name equality.
    #[default]
    Exact,
    /// Trimmed, lowercased names; the track shows its earliest member's name.
    Normalised,
}

impl TrackGrouping {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackGrouping::Exact => "exact",
            TrackGrouping::Normalised => "normalised",
        }
    }

    fn key<'a>(&self, name: &'a str) -> Cow<'a, str> {
        match self {
            TrackGrouping::Exact => Cow::Borrowed(name),
            TrackGrouping::Normalised => Cow::Owned(name.trim().to_lowercase()),
        }
    }
}

impl fmt::Display for TrackGrouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackGrouping {
    type Err = crate::TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(TrackGrouping::Exact),
            "normalised" | "normalized" => Ok(TrackGrouping::Normalised),
            other => Err(crate::TrackerError::InvalidInput(format!(
                "track grouping must be 'exact' or 'normalised'; got '{other}'"
            ))),
        }
    }
}

/// One horizontal lane of the timeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    pub antibiotic_name: String,
    /// Member periods ordered by start date.
    pub periods: Vec<TreatmentPeriod>,
}

/// Partitions `periods` into tracks, earliest-started antibiotic first.
///
/// Periods are never merged or deduplicated: repeated or overlapping courses of the same
/// antibiotic share a track.
pub fn group_tracks(periods: &[TreatmentPeriod], grouping: TrackGrouping) -> Vec<Track> {
    let mut ordered: Vec<&TreatmentPeriod> = periods.iter().collect();
    ordered.sort_by_key(|p| p.start_date);

    let mut tracks: Vec<Track> = Vec::new();
    let mut by_key: HashMap<Cow<'_, str>, usize> = HashMap::new();

    for period in ordered {
        let key = grouping.key(&period.antibiotic_name);
        match by_key.get(&key).copied() {
            Some(idx) => tracks[idx].periods.push(period.clone()),
            None => {
                by_key.insert(key, tracks.len());
                tracks.push(Track {
                    antibiotic_name: period.antibiotic_name.clone(),
                    periods: vec![period.clone()],
                });
            }
        }
    }

    tracks
}
