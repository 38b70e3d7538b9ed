//! Environment-sourced configuration.
//!
//! All credentials and endpoints are read once at process start.
//! Credentials are validated for presence only — a failure names every
//! variable that is missing, so one failed run is enough to fix the
//! environment. URL overrides must at least parse as URLs.

use std::path::PathBuf;

use anyhow::{bail, Result};

/// Portal login page.
const DEFAULT_LOGIN_URL: &str = "https://erp.lbrce.ac.in/Login/";

/// Portal page carrying the attendance history view.
const DEFAULT_HISTORY_URL: &str = "https://erp.lbrce.ac.in/Discipline/StudentHistory.aspx";

/// Path of the snapshot file within the remote store.
const DEFAULT_SNAPSHOT_PATH: &str = "stored_attendance.json";

/// Runtime configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Portal login — doubles as the roll number in the report header.
    pub portal_username: String,
    pub portal_password: String,
    /// Telegram bot token and recipient chat.
    pub bot_token: String,
    pub chat_id: String,
    /// Remote file-store access token and repository ("owner/name").
    pub store_token: String,
    pub store_repo: String,
    pub login_url: String,
    pub history_url: String,
    pub snapshot_path: String,
    /// Where the snapshot lands when the remote store write fails.
    pub local_fallback: PathBuf,
}

impl Config {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through a lookup function (tests inject maps).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut missing = Vec::new();
        let mut required = |name: &'static str| {
            let value = lookup(name).filter(|v| !v.trim().is_empty());
            if value.is_none() {
                missing.push(name);
            }
            value.unwrap_or_default()
        };

        let portal_username = required("ERP_USERNAME");
        let portal_password = required("ERP_PASSWORD");
        let bot_token = required("BOT_TOKEN");
        let chat_id = required("CHAT_ID");
        let store_token = required("GH_TOKEN");
        let store_repo = required("GITHUB_REPOSITORY");

        if !missing.is_empty() {
            bail!("missing environment variables: {}", missing.join(", "));
        }

        let login_url =
            lookup("ROLLCALL_LOGIN_URL").unwrap_or_else(|| DEFAULT_LOGIN_URL.to_string());
        let history_url =
            lookup("ROLLCALL_HISTORY_URL").unwrap_or_else(|| DEFAULT_HISTORY_URL.to_string());
        for (name, value) in [
            ("ROLLCALL_LOGIN_URL", &login_url),
            ("ROLLCALL_HISTORY_URL", &history_url),
        ] {
            if url::Url::parse(value).is_err() {
                bail!("{name} is not a valid URL: {value}");
            }
        }

        Ok(Self {
            portal_username,
            portal_password,
            bot_token,
            chat_id,
            store_token,
            store_repo,
            login_url,
            history_url,
            snapshot_path: DEFAULT_SNAPSHOT_PATH.to_string(),
            local_fallback: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
        })
    }
}
