use super::range::TimelineRange;
use crate::constants::MIN_BAR_WIDTH;
use crate::treatment::TreatmentPeriod;

/// Horizontal placement of a treatment bar, as fractions of the timeline width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarPosition {
    pub left: f64,
    pub width: f64,
    /// Filled fraction of the bar (`days_applied / programmed_days`).
    pub progress: f64,
    pub visible: bool,
}

impl BarPosition {
    /// Zero-width placement used whenever a bar cannot be positioned.
    pub fn hidden() -> Self {
        Self {
            left: 0.0,
            width: 0.0,
            progress: 0.0,
            visible: false,
        }
    }
}

/// Maps a period's inclusive `[start_date, end_date]` onto the range.
///
/// The bar spans the planned program; `progress` carries the administered fraction.
/// `left + width` never exceeds 1.
pub fn position_of(range: &TimelineRange, period: &TreatmentPeriod) -> BarPosition {
    if range.total_days <= 0 || period.end_date < period.start_date {
        return BarPosition::hidden();
    }

    let start = range.days_from_min(period.start_date);
    let duration = (period.end_date - period.start_date).num_days() + 1;
    let total = range.total_days as f64;

    let width = (duration as f64 / total).clamp(MIN_BAR_WIDTH, 1.0);
    // The width floor can push a bar at the far end past the edge; shift it back inside.
    let left = (start as f64 / total).min(1.0 - width).max(0.0);

    BarPosition {
        left,
        width,
        progress: period.progress(),
        visible: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::range::resolve_range;
    use crate::timeline::tests::period;

    #[test]
    fn bars_are_placed_by_day_offsets() {
        let periods = vec![
            period("a", "Amoxicillin", "2024-01-01", 5, 3, "active"),
            period("b", "Amoxicillin", "2024-01-10", 3, 3, "finished"),
        ];
        let range = resolve_range(&periods).unwrap();

        let first = position_of(&range, &periods[0]);
        assert_eq!(first.left, 0.0);
        assert!((first.width - 5.0 / 12.0).abs() < 1e-9);
        assert!((first.progress - 0.6).abs() < 1e-9);
        assert!(first.visible);

        let second = position_of(&range, &periods[1]);
        assert!((second.left - 9.0 / 12.0).abs() < 1e-9);
        assert!((second.width - 3.0 / 12.0).abs() < 1e-9);
        assert_eq!(second.progress, 1.0);
    }

    #[test]
    fn single_period_fills_the_whole_width() {
        let periods = vec![period("a", "Ceftriaxone", "2024-05-01", 10, 4, "active")];
        let range = resolve_range(&periods).unwrap();
        let bar = position_of(&range, &periods[0]);

        assert_eq!(bar.left, 0.0);
        assert_eq!(bar.width, 1.0);
    }

    #[test]
    fn degenerate_range_yields_hidden_bar() {
        let periods = vec![period("a", "Ceftriaxone", "2024-05-01", 10, 4, "active")];
        let mut range = resolve_range(&periods).unwrap();
        range.total_days = 0;

        let bar = position_of(&range, &periods[0]);
        assert_eq!(bar, BarPosition::hidden());
        assert!(!bar.left.is_nan() && !bar.width.is_nan());
    }

    #[test]
    fn width_never_drops_below_the_floor() {
        let short = period("a", "Gentamicin", "2024-01-01", 1, 0, "active");
        let range = TimelineRange::new(
            short.start_date,
            chrono::NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        );
        let bar = position_of(&range, &short);

        assert_eq!(bar.width, MIN_BAR_WIDTH);
        assert!(bar.visible);
    }

    #[test]
    fn floored_bar_at_the_end_of_a_long_range_stays_inside() {
        let periods = vec![
            period("long", "Vancomycin", "2020-01-01", 3650, 10, "active"),
            period("tail", "Cefazolin", "2029-12-28", 1, 0, "active"),
        ];
        let range = resolve_range(&periods).unwrap();
        assert_eq!(range.total_days, 3650);

        let tail = position_of(&range, &periods[1]);
        assert_eq!(tail.width, MIN_BAR_WIDTH);
        assert!(tail.left + tail.width <= 1.0 + 1e-12);
        assert!((tail.left - (1.0 - MIN_BAR_WIDTH)).abs() < 1e-12);
        assert!(tail.left < 3649.0 / 3650.0);
    }

    #[test]
    fn inverted_period_is_hidden() {
        let mut broken = period("a", "Gentamicin", "2024-01-05", 3, 0, "active");
        broken.end_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let range = TimelineRange::new(broken.end_date, broken.start_date);

        assert_eq!(position_of(&range, &broken), BarPosition::hidden());
    }
}
