//! Change detection between attendance snapshots.
//!
//! Compares the freshly scraped records against the previously stored
//! ones and classifies each per-subject change into an [`AbsenceEvent`].
//! Subjects are matched by exact name; a renamed subject looks like a
//! removal plus an addition and produces no event.

use std::collections::HashMap;

use crate::snapshot::{AbsenceEvent, AbsenceKind, DiffOutcome, SubjectRecord};

/// Compare current records against the previous run's records.
///
/// `previous` is `None` on the very first run, which yields
/// [`DiffOutcome::FirstRun`] rather than an empty event list.
///
/// For each subject present in both snapshots:
/// 1. present dropped → `CorrectedAbsent`, missed = old present − new present
/// 2. held grew while present stayed equal → `MissedClass`,
///    missed = new held − old held
/// 3. anything else → no event
///
/// Subjects present in only one snapshot produce no event. Output order
/// follows the current snapshot.
pub fn diff_snapshots(
    current: &[SubjectRecord],
    previous: Option<&[SubjectRecord]>,
) -> DiffOutcome {
    let Some(previous) = previous else {
        return DiffOutcome::FirstRun;
    };

    let by_subject: HashMap<&str, &SubjectRecord> = previous
        .iter()
        .map(|record| (record.subject.as_str(), record))
        .collect();

    let mut events = Vec::new();

    for now in current {
        let Some(before) = by_subject.get(now.subject.as_str()) else {
            continue;
        };

        let event = if now.present < before.present {
            Some((AbsenceKind::CorrectedAbsent, before.present - now.present))
        } else if now.held > before.held && now.present == before.present {
            Some((AbsenceKind::MissedClass, now.held - before.held))
        } else {
            None
        };

        if let Some((kind, classes_missed)) = event {
            events.push(AbsenceEvent {
                subject: now.subject.clone(),
                before_present: before.present,
                before_held: before.held,
                now_present: now.present,
                now_held: now.held,
                classes_missed,
                kind,
            });
        }
    }

    DiffOutcome::Compared(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(subject: &str, held: u32, present: u32) -> SubjectRecord {
        SubjectRecord {
            serial: String::new(),
            subject: subject.to_string(),
            held,
            present,
            percentage: String::new(),
        }
    }

    #[test]
    fn test_first_run_without_previous() {
        let current = vec![record("Maths", 10, 9)];
        assert_eq!(diff_snapshots(&current, None), DiffOutcome::FirstRun);
    }

    #[test]
    fn test_identical_snapshots_yield_no_events() {
        let records = vec![record("Maths", 10, 9), record("Physics", 12, 11)];
        let outcome = diff_snapshots(&records, Some(&records));
        assert_eq!(outcome, DiffOutcome::Compared(Vec::new()));
    }

    #[test]
    fn test_corrected_absent_when_present_drops() {
        let previous = vec![record("Maths", 10, 5)];
        let current = vec![record("Maths", 10, 3)];

        let outcome = diff_snapshots(&current, Some(&previous));
        let events = outcome.events().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, AbsenceKind::CorrectedAbsent);
        assert_eq!(events[0].classes_missed, 2);
        assert_eq!(events[0].before_present, 5);
        assert_eq!(events[0].now_present, 3);
    }

    #[test]
    fn test_missed_class_when_held_grows_and_present_stays() {
        let previous = vec![record("Physics", 10, 8)];
        let current = vec![record("Physics", 11, 8)];

        let outcome = diff_snapshots(&current, Some(&previous));
        let events = outcome.events().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, AbsenceKind::MissedClass);
        assert_eq!(events[0].classes_missed, 1);
        assert_eq!(events[0].before_held, 10);
        assert_eq!(events[0].now_held, 11);
    }

    #[test]
    fn test_attended_new_class_is_not_an_event() {
        // Held and present both grew: the student attended.
        let previous = vec![record("Chemistry", 10, 8)];
        let current = vec![record("Chemistry", 11, 9)];

        let outcome = diff_snapshots(&current, Some(&previous));
        assert_eq!(outcome, DiffOutcome::Compared(Vec::new()));
    }

    #[test]
    fn test_corrected_absent_wins_over_missed_class() {
        // Present dropped AND held grew: classified by the present drop.
        let previous = vec![record("Maths", 10, 8)];
        let current = vec![record("Maths", 12, 6)];

        let events_outcome = diff_snapshots(&current, Some(&previous));
        let events = events_outcome.events().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, AbsenceKind::CorrectedAbsent);
        assert_eq!(events[0].classes_missed, 2);
    }

    #[test]
    fn test_added_and_removed_subjects_are_silent() {
        let previous = vec![record("Dropped Elective", 10, 8)];
        let current = vec![record("New Elective", 2, 2)];

        let outcome = diff_snapshots(&current, Some(&previous));
        assert_eq!(outcome, DiffOutcome::Compared(Vec::new()));
    }

    #[test]
    fn test_event_order_follows_current_snapshot() {
        let previous = vec![
            record("Alpha", 10, 8),
            record("Beta", 10, 8),
            record("Gamma", 10, 8),
        ];
        let current = vec![
            record("Gamma", 11, 8),
            record("Alpha", 10, 7),
            record("Beta", 10, 8),
        ];

        let events_outcome = diff_snapshots(&current, Some(&previous));
        let events = events_outcome.events().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].subject, "Gamma");
        assert_eq!(events[1].subject, "Alpha");
    }

    #[test]
    fn test_multiple_missed_classes_counted() {
        let previous = vec![record("Labs", 20, 18)];
        let current = vec![record("Labs", 23, 18)];

        let events_outcome = diff_snapshots(&current, Some(&previous));
        let events = events_outcome.events().unwrap();
        assert_eq!(events[0].classes_missed, 3);
    }
}
