//! Diff two snapshot files from the command line.
//!
//! Takes the older and newer snapshot JSON (the same shape the store
//! persists) and prints the absence events the run would have reported.

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::output;
use crate::snapshot::diff::diff_snapshots;
use crate::snapshot::{AbsenceKind, DiffOutcome, Snapshot};

/// Compare two snapshot files and print the detected absences.
pub async fn run(before: &Path, after: &Path) -> Result<()> {
    let previous = load_snapshot(before)?;
    let current = load_snapshot(after)?;

    let outcome = diff_snapshots(&current.subjects, Some(&previous.subjects));
    let DiffOutcome::Compared(events) = outcome else {
        unreachable!("a previous snapshot was supplied");
    };

    if output::is_json() {
        output::print_json(&serde_json::json!({ "events": events }));
        return Ok(());
    }

    if events.is_empty() {
        println!("  No absences between the two snapshots.");
        return Ok(());
    }

    for event in &events {
        let kind = match event.kind {
            AbsenceKind::CorrectedAbsent => "corrected absent",
            AbsenceKind::MissedClass => "missed class",
        };
        println!(
            "  {:<40} {}  {}/{} -> {}/{}  missed {}",
            event.subject,
            kind,
            event.before_present,
            event.before_held,
            event.now_present,
            event.now_held,
            event.classes_missed
        );
    }
    println!("\n  {} event(s)", events.len());

    Ok(())
}

fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("decoding {}", path.display()))
}
