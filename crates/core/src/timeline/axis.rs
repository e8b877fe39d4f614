use super::range::TimelineRange;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::fmt;
use std::str::FromStr;

/// Axis granularity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ZoomLevel {
    Day,
    #[default]
    Week,
    Month,
}

impl ZoomLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoomLevel::Day => "day",
            ZoomLevel::Week => "week",
            ZoomLevel::Month => "month",
        }
    }
}

impl fmt::Display for ZoomLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ZoomLevel {
    type Err = crate::TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(ZoomLevel::Day),
            "week" => Ok(ZoomLevel::Week),
            "month" => Ok(ZoomLevel::Month),
            other => Err(crate::TrackerError::InvalidInput(format!(
                "zoom level must be one of day, week, month; got '{other}'"
            ))),
        }
    }
}

/// A tick on the timeline axis.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisMarker {
    pub date: NaiveDate,
    pub position: f64,
    pub label: String,
    pub is_minor: bool,
}

/// Generates the axis ticks for `range` at `zoom`.
///
/// - `Day`: every day, Mondays major.
/// - `Week`: every Monday.
/// - `Month`: every first-of-month, starting with the month after `min_date`.
///
/// Returns no markers for a degenerate range.
pub fn axis_markers(range: &TimelineRange, zoom: ZoomLevel) -> Vec<AxisMarker> {
    if range.total_days <= 0 {
        return Vec::new();
    }

    let dates: Vec<NaiveDate> = match zoom {
        ZoomLevel::Day => range
            .min_date
            .iter_days()
            .take_while(|d| *d <= range.max_date)
            .collect(),
        ZoomLevel::Week => {
            let offset = (7 - range.min_date.weekday().num_days_from_monday()) % 7;
            std::iter::successors(
                range.min_date.checked_add_days(Days::new(u64::from(offset))),
                |d| d.checked_add_days(Days::new(7)),
            )
            .take_while(|d| *d <= range.max_date)
            .collect()
        }
        ZoomLevel::Month => std::iter::successors(first_of_next_month(range.min_date), |d| {
            first_of_next_month(*d)
        })
        .take_while(|d| *d <= range.max_date)
        .collect(),
    };

    dates
        .into_iter()
        .filter_map(|date| {
            let position = range.position_of_date(date)?;
            Some(AxisMarker {
                date,
                position,
                label: label_for(date, zoom),
                is_minor: zoom == ZoomLevel::Day && date.weekday() != Weekday::Mon,
            })
        })
        .collect()
}

fn label_for(date: NaiveDate, zoom: ZoomLevel) -> String {
    let pattern = match zoom {
        ZoomLevel::Day => "%d/%m",
        ZoomLevel::Week => "%d %b",
        ZoomLevel::Month => "%b %Y",
    };
    date.format(pattern).to_string()
}

fn first_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(from: &str, to: &str) -> TimelineRange {
        TimelineRange::new(from.parse().unwrap(), to.parse().unwrap())
    }

    #[test]
    fn day_zoom_marks_every_day_with_major_mondays() {
        // 2024-01-01 is a Monday.
        let markers = axis_markers(&range("2024-01-01", "2024-01-12"), ZoomLevel::Day);

        assert_eq!(markers.len(), 12);
        assert!(!markers[0].is_minor);
        assert!(markers[1..7].iter().all(|m| m.is_minor));
        assert!(!markers[7].is_minor);
        assert_eq!(markers[0].label, "01/01");
        assert_eq!(markers[0].position, 0.0);
        assert!((markers[11].position - 11.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn week_zoom_marks_mondays_only() {
        let markers = axis_markers(&range("2024-01-03", "2024-01-29"), ZoomLevel::Week);
        let dates: Vec<String> = markers.iter().map(|m| m.date.to_string()).collect();

        assert_eq!(
            dates,
            vec!["2024-01-08", "2024-01-15", "2024-01-22", "2024-01-29"]
        );
        assert!(markers.iter().all(|m| !m.is_minor));
        assert_eq!(markers[0].label, "08 Jan");
        assert!((markers[0].position - 5.0 / 27.0).abs() < 1e-9);
    }

    #[test]
    fn week_zoom_includes_min_date_when_it_is_a_monday() {
        let markers = axis_markers(&range("2024-01-01", "2024-01-07"), ZoomLevel::Week);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].position, 0.0);
    }

    #[test]
    fn month_zoom_starts_after_the_first_month() {
        let markers = axis_markers(&range("2024-01-01", "2024-04-10"), ZoomLevel::Month);
        let dates: Vec<String> = markers.iter().map(|m| m.date.to_string()).collect();

        assert_eq!(dates, vec!["2024-02-01", "2024-03-01", "2024-04-01"]);
        assert_eq!(markers[0].label, "Feb 2024");
    }

    #[test]
    fn month_zoom_crosses_year_boundaries() {
        let markers = axis_markers(&range("2023-11-20", "2024-01-15"), ZoomLevel::Month);
        let labels: Vec<&str> = markers.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Dec 2023", "Jan 2024"]);
    }

    #[test]
    fn short_range_may_have_no_month_markers() {
        assert!(axis_markers(&range("2024-01-03", "2024-01-20"), ZoomLevel::Month).is_empty());
    }

    #[test]
    fn generation_is_idempotent() {
        for zoom in [ZoomLevel::Day, ZoomLevel::Week, ZoomLevel::Month] {
            let r = range("2023-10-17", "2024-02-03");
            assert_eq!(axis_markers(&r, zoom), axis_markers(&r, zoom));
        }
    }

    #[test]
    fn positions_stay_within_unit_interval() {
        for zoom in [ZoomLevel::Day, ZoomLevel::Week, ZoomLevel::Month] {
            let markers = axis_markers(&range("2023-12-30", "2024-03-02"), zoom);
            assert!(markers
                .iter()
                .all(|m| (0.0..=1.0).contains(&m.position)));
            assert!(markers.windows(2).all(|w| w[0].date < w[1].date));
        }
    }

    #[test]
    fn degenerate_range_has_no_markers() {
        let mut r = range("2024-01-01", "2024-01-31");
        r.total_days = 0;
        assert!(axis_markers(&r, ZoomLevel::Day).is_empty());
    }

    #[test]
    fn zoom_level_parses_case_insensitively() {
        assert_eq!("Month".parse::<ZoomLevel>().unwrap(), ZoomLevel::Month);
        assert_eq!(" day ".parse::<ZoomLevel>().unwrap(), ZoomLevel::Day);
        assert!("year".parse::<ZoomLevel>().is_err());
        assert_eq!(ZoomLevel::default(), ZoomLevel::Week);
    }
}
