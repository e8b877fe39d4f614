use super::tracks::Track;
use crate::treatment::{AntibioticType, TreatmentStatus};

/// Aggregate figures shown next to the timeline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimelineSummary {
    pub total_treatments: usize,
    pub active: usize,
    pub suspended: usize,
    pub extended: usize,
    pub finished: usize,
    pub antibiotics: usize,
    pub corticoids: usize,
    pub total_programmed_days: u64,
    pub total_days_applied: u64,
    /// `total_days_applied / total_programmed_days`, clamped to `[0, 1]`.
    pub overall_progress: f64,
    /// Names of tracks holding at least one active or extended program, in track order.
    pub ongoing_antibiotics: Vec<String>,
}

pub fn summarise(tracks: &[Track]) -> TimelineSummary {
    let mut summary = TimelineSummary::default();

    for track in tracks {
        let mut ongoing = false;
        for period in &track.periods {
            summary.total_treatments += 1;
            match period.status {
                TreatmentStatus::Active => summary.active += 1,
                TreatmentStatus::Suspended => summary.suspended += 1,
                TreatmentStatus::Extended => summary.extended += 1,
                TreatmentStatus::Finished => summary.finished += 1,
            }
            match period.antibiotic_type {
                AntibioticType::Antibiotic => summary.antibiotics += 1,
                AntibioticType::Corticoide => summary.corticoids += 1,
            }
            summary.total_programmed_days += u64::from(period.programmed_days);
            summary.total_days_applied += u64::from(period.days_applied);
            ongoing |= period.status.accepts_doses();
        }
        if ongoing {
            summary.ongoing_antibiotics.push(track.antibiotic_name.clone());
        }
    }

    if summary.total_programmed_days > 0 {
        summary.overall_progress = (summary.total_days_applied as f64
            / summary.total_programmed_days as f64)
            .clamp(0.0, 1.0);
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::tests::period;
    use crate::timeline::tracks::{group_tracks, TrackGrouping};

    #[test]
    fn counts_statuses_types_and_days() {
        let mut steroid = period("d", "Dexamethasone", "2024-01-02", 4, 1, "suspended");
        steroid.antibiotic_type = AntibioticType::Corticoide;
        let periods = vec![
            period("a", "Amoxicillin", "2024-01-01", 5, 3, "active"),
            period("b", "Amoxicillin", "2024-01-10", 3, 3, "finished"),
            steroid,
        ];
        let summary = summarise(&group_tracks(&periods, TrackGrouping::Exact));

        assert_eq!(summary.total_treatments, 3);
        assert_eq!(summary.active, 1);
        assert_eq!(summary.finished, 1);
        assert_eq!(summary.suspended, 1);
        assert_eq!(summary.corticoids, 1);
        assert_eq!(summary.antibiotics, 2);
        assert_eq!(summary.total_programmed_days, 12);
        assert_eq!(summary.total_days_applied, 7);
        assert!((summary.overall_progress - 7.0 / 12.0).abs() < 1e-9);
        assert_eq!(summary.ongoing_antibiotics, vec!["Amoxicillin"]);
    }

    #[test]
    fn nothing_programmed_means_no_progress() {
        let periods = vec![period("z", "Azithromycin", "2024-01-01", 0, 2, "active")];
        let summary = summarise(&group_tracks(&periods, TrackGrouping::Exact));
        assert_eq!(summary.overall_progress, 0.0);
    }

    #[test]
    fn over_applied_programs_clamp_overall_progress() {
        let periods = vec![period("z", "Azithromycin", "2024-01-01", 3, 9, "extended")];
        let summary = summarise(&group_tracks(&periods, TrackGrouping::Exact));
        assert_eq!(summary.overall_progress, 1.0);
    }
}
