// Copyright 2026 Rollcall Contributors
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use rollcall::cli;

#[derive(Parser)]
#[command(
    name = "rollcall",
    about = "Rollcall — attendance watcher for the college ERP",
    version,
    after_help = "Run 'rollcall <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the portal, diff against the stored snapshot, and report
    Run {
        /// Budget in milliseconds for each page-condition wait
        #[arg(long, default_value = "20000")]
        wait_timeout: u64,
    },
    /// Parse a saved attendance page and print the extracted records
    Parse {
        /// Path to an HTML file dumped from the portal
        file: PathBuf,
    },
    /// Diff two snapshot JSON files and print the absence events
    Diff {
        /// The older snapshot
        before: PathBuf,
        /// The newer snapshot
        after: PathBuf,
    },
    /// Check environment and diagnose issues
    Doctor,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var("ROLLCALL_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("ROLLCALL_QUIET", "1");
    }
    if cli.verbose {
        std::env::set_var("ROLLCALL_VERBOSE", "1");
    }

    let result = match cli.command {
        Commands::Run { wait_timeout } => cli::run_cmd::run(wait_timeout).await,
        Commands::Parse { file } => cli::parse_cmd::run(&file).await,
        Commands::Diff { before, after } => cli::diff_cmd::run(&before, &after).await,
        Commands::Doctor => cli::doctor::run().await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "rollcall", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if !cli::output::is_quiet() && !cli::output::is_json() {
            eprintln!("  Error: {e:#}");
        }
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        }
        std::process::exit(1);
    }

    result
}
