//! Attendance snapshot types and change detection.
//!
//! A [`Snapshot`] is the full attendance state captured in one run. It is
//! immutable once created, persisted wholesale, and replaced wholesale on
//! the next run — no history is kept beyond the single previous snapshot.

pub mod diff;
pub mod store;

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Timestamp format used in persisted snapshots and report headers.
const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

/// One row of the portal's attendance table.
///
/// Subject names are unique within a snapshot; `percentage` is the
/// portal-reported formatted string (e.g. "87.5%"), never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub serial: String,
    pub subject: String,
    pub held: u32,
    pub present: u32,
    pub percentage: String,
}

/// The full attendance state captured in one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub subjects: Vec<SubjectRecord>,
    pub overall_percentage: String,
    pub timestamp: String,
}

impl Snapshot {
    /// Create a snapshot from parsed records, stamped with the local time.
    pub fn capture(subjects: Vec<SubjectRecord>, overall_percentage: String) -> Self {
        Self {
            subjects,
            overall_percentage,
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// How an absence was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceKind {
    /// A previously-counted present was retroactively corrected to absent.
    CorrectedAbsent,
    /// A new class was held and the student was not marked present.
    MissedClass,
}

/// A detected discrepancy between two snapshots for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceEvent {
    pub subject: String,
    pub before_present: u32,
    pub before_held: u32,
    pub now_present: u32,
    pub now_held: u32,
    /// Number of classes newly counted against the student. Always > 0.
    pub classes_missed: u32,
    pub kind: AbsenceKind,
}

/// Result of comparing the current snapshot against the stored one.
///
/// `FirstRun` and `Compared(vec![])` are semantically distinct: the first
/// means there was nothing to compare against, the second means nothing
/// changed. Callers must never infer one from the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOutcome {
    /// No previous snapshot existed; nothing was compared.
    FirstRun,
    /// A previous snapshot existed; these are the detected absences.
    Compared(Vec<AbsenceEvent>),
}

impl DiffOutcome {
    /// The detected events, if a comparison actually happened.
    pub fn events(&self) -> Option<&[AbsenceEvent]> {
        match self {
            DiffOutcome::FirstRun => None,
            DiffOutcome::Compared(events) => Some(events),
        }
    }
}
