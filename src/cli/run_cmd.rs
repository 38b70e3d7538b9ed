//! The full monitoring run.
//!
//! Sequential, single attempt: log in, scrape, parse, diff against the
//! stored snapshot, report over Telegram, persist the new snapshot. Any
//! failure inside the run is truncated and sent as an error notice; the
//! browser is released on every path.

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::cli::output;
use crate::config::Config;
use crate::notify::TelegramNotifier;
use crate::portal::ChromiumPortal;
use crate::report::build_report;
use crate::scrape::parse_attendance_table;
use crate::snapshot::diff::diff_snapshots;
use crate::snapshot::store::{SaveTarget, SnapshotStore};
use crate::snapshot::{DiffOutcome, Snapshot};

/// Execute one monitoring run.
pub async fn run(wait_budget_ms: u64) -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    let notifier = TelegramNotifier::new(&config.bot_token, &config.chat_id);
    let store = SnapshotStore::from_config(&config);

    // The notified section starts after the browser is up; a launch
    // failure surfaces on the exit code only.
    let portal = ChromiumPortal::launch(wait_budget_ms)
        .await
        .context("setting up the browser")?;

    let outcome = run_inner(&config, &portal, &store, &notifier).await;

    if let Err(e) = portal.close().await {
        warn!("browser did not shut down cleanly: {e:#}");
    }

    if let Err(e) = outcome {
        error!("run failed: {e:#}");
        notifier.send_error(&format!("{e:#}")).await;
        return Err(e);
    }

    if !output::is_quiet() && !output::is_json() {
        println!("  Run complete.");
    }
    Ok(())
}

async fn run_inner(
    config: &Config,
    portal: &ChromiumPortal,
    store: &SnapshotStore,
    notifier: &TelegramNotifier,
) -> Result<()> {
    info!("logging into the portal");
    portal
        .login(
            &config.login_url,
            &config.portal_username,
            &config.portal_password,
        )
        .await?;

    info!("fetching the attendance view");
    let html = portal.fetch_attendance_html(&config.history_url).await?;

    let (subjects, overall_percentage) = parse_attendance_table(&html);
    info!(
        "parsed {} subjects, overall {}",
        subjects.len(),
        overall_percentage
    );

    let stored = store.load().await?;
    let snapshot = Snapshot::capture(subjects, overall_percentage);

    let outcome = diff_snapshots(
        &snapshot.subjects,
        stored.as_ref().map(|s| s.snapshot.subjects.as_slice()),
    );
    match &outcome {
        DiffOutcome::FirstRun => info!("first run, nothing to compare"),
        DiffOutcome::Compared(events) => info!("detected {} absence event(s)", events.len()),
    }

    let report = build_report(&snapshot, &outcome, &config.portal_username);
    notifier.send_report(&report).await?;
    info!("report delivered");

    let revision = stored.as_ref().map(|s| s.revision.as_str());
    match store.save(&snapshot, revision).await? {
        SaveTarget::Remote => info!("snapshot saved to the remote store"),
        SaveTarget::LocalFallback(path) => {
            warn!("snapshot kept locally at {}", path.display());
        }
    }

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "subjects": snapshot.subjects.len(),
            "overall_percentage": snapshot.overall_percentage,
            "first_run": outcome == DiffOutcome::FirstRun,
            "absences": outcome.events().map(|e| e.len()).unwrap_or(0),
        }));
    }

    Ok(())
}

fn init_tracing() {
    let level = if output::is_verbose() { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("rollcall={level}").parse().unwrap()),
        )
        .try_init();
}
