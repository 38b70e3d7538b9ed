//! Parse a saved attendance page without touching the portal.
//!
//! Useful for debugging selector drift: dump the page from a browser,
//! then run `rollcall parse page.html`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::output;
use crate::scrape::parse_attendance_table;

/// Parse an HTML file and print the extracted records.
pub async fn run(file: &Path) -> Result<()> {
    let html = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;

    let (subjects, overall_percentage) = parse_attendance_table(&html);

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "overall_percentage": overall_percentage,
            "subjects": subjects,
        }));
        return Ok(());
    }

    println!("  Overall: {overall_percentage}");
    if subjects.is_empty() {
        println!("  No subject rows found.");
        return Ok(());
    }

    println!();
    for record in &subjects {
        println!(
            "  {:<40} {:>3}/{:<3} {}",
            record.subject, record.present, record.held, record.percentage
        );
    }
    println!("\n  {} subject(s)", subjects.len());

    Ok(())
}
