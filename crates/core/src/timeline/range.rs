use crate::treatment::TreatmentPeriod;
use chrono::NaiveDate;

/// Overall date span covered by a set of treatment periods.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimelineRange {
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    /// Inclusive day count between `min_date` and `max_date`.
    pub total_days: i64,
}

impl TimelineRange {
    /// Builds a range from its bounds.
    pub fn new(min_date: NaiveDate, max_date: NaiveDate) -> Self {
        Self {
            min_date,
            max_date,
            total_days: (max_date - min_date).num_days() + 1,
        }
    }

    /// Whole days between `min_date` and `date`.
    pub fn days_from_min(&self, date: NaiveDate) -> i64 {
        (date - self.min_date).num_days()
    }

    /// `days / total_days`, or `None` when the range is degenerate.
    pub fn fraction(&self, days: i64) -> Option<f64> {
        if self.total_days <= 0 {
            return None;
        }
        Some(days as f64 / self.total_days as f64)
    }

    /// Clamped fractional offset of `date` within the range.
    pub fn position_of_date(&self, date: NaiveDate) -> Option<f64> {
        self.fraction(self.days_from_min(date))
            .map(|f| f.clamp(0.0, 1.0))
    }
}

/// Resolves the span of `periods`, or `None` when there is nothing to span.
pub fn resolve_range(periods: &[TreatmentPeriod]) -> Option<TimelineRange> {
    let min_date = periods.iter().map(|p| p.start_date).min()?;
    let max_date = periods
        .iter()
        .map(|p| p.end_date.max(p.start_date))
        .max()?;

    Some(TimelineRange::new(min_date, max_date))
}
