use super::range::TimelineRange;
use crate::treatment::{TreatmentPeriod, TreatmentStatus};
use chrono::NaiveDate;

/// Lifecycle event kinds shown on the timeline.
///
/// `Resume` is never derived from treatment data: a suspended program does not return to
/// `active`. It exists so activity feeds can share the same vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Start,
    Pause,
    Resume,
    Finish,
    Extend,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimelineEvent {
    pub date: NaiveDate,
    pub position: f64,
    pub kind: EventKind,
    pub antibiotic_name: String,
    pub treatment_id: String,
    pub description: String,
}

/// Derives lifecycle events for every period, ordered by position.
///
/// Start events sit at the beginning of the start day; terminal events sit at the end of
/// the planned end day. Ordering is stable, so events at the same position keep input
/// order (and a period's start precedes its own terminal event).
pub fn extract_events(periods: &[TreatmentPeriod], range: &TimelineRange) -> Vec<TimelineEvent> {
    if range.total_days <= 0 {
        return Vec::new();
    }

    let mut events = Vec::with_capacity(periods.len() * 2);

    for period in periods {
        if let Some(position) = range.fraction(range.days_from_min(period.start_date)) {
            events.push(TimelineEvent {
                date: period.start_date,
                position: position.clamp(0.0, 1.0),
                kind: EventKind::Start,
                antibiotic_name: period.antibiotic_name.clone(),
                treatment_id: period.id.clone(),
                description: format!(
                    "{} started ({} days programmed)",
                    period.antibiotic_name, period.programmed_days
                ),
            });
        }

        let Some((kind, description)) = terminal_event(period) else {
            continue;
        };
        if let Some(position) = range.fraction(range.days_from_min(period.end_date) + 1) {
            events.push(TimelineEvent {
                date: period.end_date,
                position: position.clamp(0.0, 1.0),
                kind,
                antibiotic_name: period.antibiotic_name.clone(),
                treatment_id: period.id.clone(),
                description,
            });
        }
    }

    events.sort_by(|a, b| a.position.total_cmp(&b.position));
    events
}

fn terminal_event(period: &TreatmentPeriod) -> Option<(EventKind, String)> {
    let name = &period.antibiotic_name;
    match period.status {
        TreatmentStatus::Active => None,
        TreatmentStatus::Finished => Some((
            EventKind::Finish,
            format!(
                "{name} finished after {} of {} days",
                period.days_applied, period.programmed_days
            ),
        )),
        TreatmentStatus::Suspended => Some((
            EventKind::Pause,
            format!(
                "{name} suspended after {} of {} days",
                period.days_applied, period.programmed_days
            ),
        )),
        TreatmentStatus::Extended => Some((
            EventKind::Extend,
            format!("{name} extended to {} days", period.programmed_days),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::range::resolve_range;
    use crate::timeline::tests::period;

    #[test]
    fn finished_period_gets_start_and_finish() {
        let periods = vec![
            period("a", "Amoxicillin", "2024-01-01", 5, 3, "active"),
            period("b", "Amoxicillin", "2024-01-10", 3, 3, "finished"),
        ];
        let range = resolve_range(&periods).unwrap();
        let events = extract_events(&periods, &range);

        let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![EventKind::Start, EventKind::Start, EventKind::Finish]
        );

        let finish = &events[2];
        assert_eq!(finish.treatment_id, "b");
        assert_eq!(finish.date.to_string(), "2024-01-12");
        // Finish sits at the end of day index 11, clamped to the right edge.
        assert_eq!(finish.position, 1.0);

        let second_start = &events[1];
        assert!((second_start.position - 9.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn each_status_maps_to_one_terminal_kind() {
        let periods = vec![
            period("a", "A", "2024-01-01", 10, 2, "active"),
            period("s", "S", "2024-01-01", 4, 2, "suspended"),
            period("e", "E", "2024-01-01", 6, 5, "extended"),
            period("f", "F", "2024-01-01", 2, 2, "finished"),
        ];
        let range = resolve_range(&periods).unwrap();
        let events = extract_events(&periods, &range);

        let terminal = |id: &str| -> Vec<EventKind> {
            events
                .iter()
                .filter(|e| e.treatment_id == id && e.kind != EventKind::Start)
                .map(|e| e.kind)
                .collect()
        };
        assert!(terminal("a").is_empty());
        assert_eq!(terminal("s"), vec![EventKind::Pause]);
        assert_eq!(terminal("e"), vec![EventKind::Extend]);
        assert_eq!(terminal("f"), vec![EventKind::Finish]);
        assert!(events.iter().all(|e| e.kind != EventKind::Resume));
    }

    #[test]
    fn terminal_position_uses_end_of_day() {
        let periods = vec![
            period("long", "Vancomycin", "2024-01-01", 10, 0, "active"),
            period("short", "Cefazolin", "2024-01-03", 2, 2, "finished"),
        ];
        let range = resolve_range(&periods).unwrap();
        let finish = extract_events(&periods, &range)
            .into_iter()
            .find(|e| e.kind == EventKind::Finish)
            .unwrap();

        // Ends 2024-01-04, day index 3, so (3 + 1) / 10.
        assert!((finish.position - 0.4).abs() < 1e-9);
    }

    #[test]
    fn ties_keep_input_order() {
        let periods = vec![
            period("first", "Zosyn", "2024-01-01", 3, 0, "active"),
            period("second", "Amikacin", "2024-01-01", 3, 0, "active"),
        ];
        let range = resolve_range(&periods).unwrap();
        let ids: Vec<String> = extract_events(&periods, &range)
            .into_iter()
            .map(|e| e.treatment_id)
            .collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn events_are_sorted_by_position() {
        let periods = vec![
            period("late", "Zosyn", "2024-02-01", 3, 3, "finished"),
            period("early", "Amikacin", "2024-01-01", 40, 0, "suspended"),
        ];
        let range = resolve_range(&periods).unwrap();
        let events = extract_events(&periods, &range);

        assert!(events.windows(2).all(|w| w[0].position <= w[1].position));
        assert_eq!(events[0].treatment_id, "early");
    }

    #[test]
    fn degenerate_range_yields_no_events() {
        let periods = vec![period("a", "A", "2024-01-01", 3, 0, "finished")];
        let mut range = resolve_range(&periods).unwrap();
        range.total_days = 0;
        assert!(extract_events(&periods, &range).is_empty());
    }
}
