//! Treatment timeline model.
//!
//! Turns a snapshot of treatment records into render-ready projections:
//!
//! ```text
//! records ─validate─> periods ─> range ─┬─> tracks ─> summary
//!                                       ├─> axis markers
//!                                       ├─> events
//!                                       └─> bar positions
//! ```
//!
//! Everything here is a pure function of its input. Nothing is cached and input records are
//! never modified, so calling [`build_timeline`] twice with the same records yields the same
//! [`Timeline`].

mod axis;
mod events;
mod position;
mod range;
mod summary;
mod tracks;

pub use axis::{axis_markers, AxisMarker, ZoomLevel};
pub use events::{extract_events, EventKind, TimelineEvent};
pub use position::{position_of, BarPosition};
pub use range::{resolve_range, TimelineRange};
pub use summary::{summarise, TimelineSummary};
pub use tracks::{group_tracks, Track, TrackGrouping};

use crate::constants::NO_DATA_MESSAGE;
use crate::treatment::{TreatmentPeriod, TreatmentRecord};

/// Caller-selected rendering options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimelineOptions {
    pub zoom: ZoomLevel,
    pub grouping: TrackGrouping,
}

/// A record left out of the timeline, with the reason.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExcludedRecord {
    pub id: String,
    pub reason: String,
}

/// Bar placement for one treatment period.
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodPosition {
    pub treatment_id: String,
    pub bar: BarPosition,
}

/// Render data for a non-empty timeline.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineData {
    pub range: TimelineRange,
    pub zoom: ZoomLevel,
    pub tracks: Vec<Track>,
    pub axis_markers: Vec<AxisMarker>,
    pub events: Vec<TimelineEvent>,
    /// One entry per period, in track order.
    pub positions: Vec<PeriodPosition>,
    pub summary: TimelineSummary,
    pub excluded: Vec<ExcludedRecord>,
}

impl TimelineData {
    /// Places `period` on this timeline.
    pub fn position_of(&self, period: &TreatmentPeriod) -> BarPosition {
        position::position_of(&self.range, period)
    }

    /// Iterates over every period across all tracks.
    pub fn periods(&self) -> impl Iterator<Item = &TreatmentPeriod> {
        self.tracks.iter().flat_map(|t| t.periods.iter())
    }
}

/// Result of building a timeline.
///
/// `NoData` is distinct from an empty range: it means nothing could be drawn and clients
/// should show an empty state instead of a zero-width timeline.
#[derive(Clone, Debug, PartialEq)]
pub enum Timeline {
    NoData {
        message: String,
        excluded: Vec<ExcludedRecord>,
    },
    Ready(TimelineData),
}

impl Timeline {
    pub fn is_no_data(&self) -> bool {
        matches!(self, Timeline::NoData { .. })
    }

    pub fn data(&self) -> Option<&TimelineData> {
        match self {
            Timeline::Ready(data) => Some(data),
            Timeline::NoData { .. } => None,
        }
    }
}

/// Validates `records`, keeping the valid ones and reporting the rest.
///
/// Each excluded record is logged at `warn` level; processing always continues.
pub fn validate_records(
    records: &[TreatmentRecord],
) -> (Vec<TreatmentPeriod>, Vec<ExcludedRecord>) {
    let mut periods = Vec::with_capacity(records.len());
    let mut excluded = Vec::new();

    for record in records {
        match TreatmentPeriod::from_record(record) {
            Ok(period) => periods.push(period),
            Err(err) => {
                tracing::warn!(
                    treatment_id = %record.id,
                    error = %err,
                    "excluding treatment from timeline"
                );
                excluded.push(ExcludedRecord {
                    id: record.id.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    (periods, excluded)
}

/// Builds the full timeline bundle for a snapshot of treatment records.
pub fn build_timeline(records: &[TreatmentRecord], options: &TimelineOptions) -> Timeline {
    let (periods, excluded) = validate_records(records);

    let Some(range) = resolve_range(&periods) else {
        tracing::debug!(
            excluded = excluded.len(),
            "no valid treatments to place on the timeline"
        );
        return Timeline::NoData {
            message: NO_DATA_MESSAGE.to_string(),
            excluded,
        };
    };

    let tracks = group_tracks(&periods, options.grouping);
    let positions = tracks
        .iter()
        .flat_map(|t| t.periods.iter())
        .map(|p| PeriodPosition {
            treatment_id: p.id.clone(),
            bar: position::position_of(&range, p),
        })
        .collect();

    Timeline::Ready(TimelineData {
        range,
        zoom: options.zoom,
        axis_markers: axis_markers(&range, options.zoom),
        events: extract_events(&periods, &range),
        summary: summarise(&tracks),
        positions,
        tracks,
        excluded,
    })
}
