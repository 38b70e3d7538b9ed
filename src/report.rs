//! Markdown report assembly for the Telegram notification.
//!
//! One message per run: a header with the capture time, roll number and
//! overall percentage, a subject-wise section, and a footer that is
//! either the detected absences, an all-clear, or the first-run notice.

use crate::snapshot::{AbsenceEvent, AbsenceKind, DiffOutcome, Snapshot};

/// Attendance at or above this reads as safe.
const SAFE_PERCENT: f32 = 75.0;

/// Attendance at or above this (but below safe) reads as borderline.
const WARN_PERCENT: f32 = 65.0;

/// Section separator used throughout the message.
fn separator() -> String {
    "=".repeat(50)
}

/// Numeric value of a portal percentage string, 0.0 when unparseable.
fn percent_value(percentage: &str) -> f32 {
    percentage
        .trim()
        .trim_end_matches('%')
        .trim()
        .parse()
        .unwrap_or(0.0)
}

/// Status icon for a subject's percentage.
pub fn status_icon(percentage: &str) -> &'static str {
    let value = percent_value(percentage);
    if value >= SAFE_PERCENT {
        "✅"
    } else if value >= WARN_PERCENT {
        "⚠️"
    } else {
        "🔴"
    }
}

/// Build the full Markdown report for one run.
pub fn build_report(snapshot: &Snapshot, outcome: &DiffOutcome, roll: &str) -> String {
    let mut message = format!(
        "📊 *ATTENDANCE REPORT*\n🕐 {}\n👤 Roll: `{}`\n📈 Overall: *{}*\n{}\n\n",
        snapshot.timestamp,
        roll,
        snapshot.overall_percentage,
        separator()
    );

    message.push_str("📋 *SUBJECT-WISE:*\n\n");
    for subject in &snapshot.subjects {
        message.push_str(&format!(
            "{} *{}*\n  `{}/{}` | {}\n\n",
            status_icon(&subject.percentage),
            subject.subject,
            subject.present,
            subject.held,
            subject.percentage
        ));
    }
    message.push_str(&format!("{}\n\n", separator()));

    match outcome {
        DiffOutcome::FirstRun => {
            message.push_str("ℹ️ *FIRST RUN* - Data saved for tomorrow\n");
        }
        DiffOutcome::Compared(events) if events.is_empty() => {
            message.push_str("✅ *NO ABSENCES* - All good!\n");
        }
        DiffOutcome::Compared(events) => {
            message.push_str("🚨 *ABSENCES DETECTED:*\n\n");
            for event in events {
                message.push_str(&absence_block(event));
            }
        }
    }

    message
}

fn absence_block(event: &AbsenceEvent) -> String {
    let emoji = match event.kind {
        AbsenceKind::CorrectedAbsent => "🔴",
        AbsenceKind::MissedClass => "⚠️",
    };
    format!(
        "{} *{}*\n   Before: `{}/{}`\n   Now: `{}/{}`\n   *MISSED: {} class(es)*\n\n",
        emoji,
        event.subject,
        event.before_present,
        event.before_held,
        event.now_present,
        event.now_held,
        event.classes_missed
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SubjectRecord;

    fn snapshot() -> Snapshot {
        Snapshot {
            subjects: vec![
                SubjectRecord {
                    serial: "1".to_string(),
                    subject: "Compiler Design".to_string(),
                    held: 20,
                    present: 18,
                    percentage: "90%".to_string(),
                },
                SubjectRecord {
                    serial: "2".to_string(),
                    subject: "Computer Networks".to_string(),
                    held: 18,
                    present: 12,
                    percentage: "66.67%".to_string(),
                },
            ],
            overall_percentage: "87.5%".to_string(),
            timestamp: "01/08/2026 07:30".to_string(),
        }
    }

    #[test]
    fn test_status_icon_thresholds() {
        assert_eq!(status_icon("90%"), "✅");
        assert_eq!(status_icon("75%"), "✅");
        assert_eq!(status_icon("74.9%"), "⚠️");
        assert_eq!(status_icon("65%"), "⚠️");
        assert_eq!(status_icon("64.9%"), "🔴");
        assert_eq!(status_icon("0%"), "🔴");
    }

    #[test]
    fn test_status_icon_handles_junk_percentage() {
        assert_eq!(status_icon("n/a"), "🔴");
        assert_eq!(status_icon(""), "🔴");
    }

    #[test]
    fn test_report_header_and_subjects() {
        let message = build_report(&snapshot(), &DiffOutcome::Compared(Vec::new()), "21X01A0001");

        assert!(message.starts_with("📊 *ATTENDANCE REPORT*"));
        assert!(message.contains("🕐 01/08/2026 07:30"));
        assert!(message.contains("👤 Roll: `21X01A0001`"));
        assert!(message.contains("📈 Overall: *87.5%*"));
        assert!(message.contains("✅ *Compiler Design*\n  `18/20` | 90%"));
        assert!(message.contains("⚠️ *Computer Networks*\n  `12/18` | 66.67%"));
    }

    #[test]
    fn test_report_no_absences_footer() {
        let message = build_report(&snapshot(), &DiffOutcome::Compared(Vec::new()), "r");
        assert!(message.contains("✅ *NO ABSENCES* - All good!"));
        assert!(!message.contains("ABSENCES DETECTED"));
        assert!(!message.contains("FIRST RUN"));
    }

    #[test]
    fn test_report_first_run_footer() {
        let message = build_report(&snapshot(), &DiffOutcome::FirstRun, "r");
        assert!(message.contains("ℹ️ *FIRST RUN* - Data saved for tomorrow"));
        assert!(!message.contains("NO ABSENCES"));
    }

    #[test]
    fn test_report_absence_blocks() {
        let events = vec![
            AbsenceEvent {
                subject: "Compiler Design".to_string(),
                before_present: 18,
                before_held: 20,
                now_present: 16,
                now_held: 20,
                classes_missed: 2,
                kind: AbsenceKind::CorrectedAbsent,
            },
            AbsenceEvent {
                subject: "Computer Networks".to_string(),
                before_present: 12,
                before_held: 17,
                now_present: 12,
                now_held: 18,
                classes_missed: 1,
                kind: AbsenceKind::MissedClass,
            },
        ];

        let message = build_report(&snapshot(), &DiffOutcome::Compared(events), "r");
        assert!(message.contains("🚨 *ABSENCES DETECTED:*"));
        assert!(message.contains("🔴 *Compiler Design*\n   Before: `18/20`\n   Now: `16/20`"));
        assert!(message.contains("*MISSED: 2 class(es)*"));
        assert!(message.contains("⚠️ *Computer Networks*\n   Before: `12/17`\n   Now: `12/18`"));
        assert!(message.contains("*MISSED: 1 class(es)*"));
    }
}
