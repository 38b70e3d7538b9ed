//! CLI subcommand implementations for the rollcall binary.

pub mod diff_cmd;
pub mod doctor;
pub mod output;
pub mod parse_cmd;
pub mod run_cmd;
