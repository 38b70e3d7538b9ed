//! Telegram notification client.
//!
//! Sends the attendance report and error notices to a fixed chat via the
//! Bot API. The primary report send is status-checked; error notices are
//! best effort so a broken notifier cannot mask the original failure.

use anyhow::{bail, Context, Result};
use tracing::warn;

use crate::notify::{truncate_chars, ERROR_TEXT_LIMIT};

/// Default Bot API endpoint.
const TELEGRAM_API: &str = "https://api.telegram.org";

/// Client for one bot token and one recipient chat.
pub struct TelegramNotifier {
    api_base: String,
    token: String,
    chat_id: String,
    client: reqwest::Client,
}

impl TelegramNotifier {
    /// Create a notifier against the real Bot API.
    pub fn new(token: &str, chat_id: &str) -> Self {
        Self::with_api_base(TELEGRAM_API, token, chat_id)
    }

    /// Create a notifier against a custom endpoint (used by tests).
    pub fn with_api_base(api_base: &str, token: &str, chat_id: &str) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
            chat_id: chat_id.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Send the attendance report. Fails on any non-2xx response.
    pub async fn send_report(&self, text: &str) -> Result<()> {
        let resp = self
            .send_message(text)
            .await
            .context("sending attendance report")?;

        if !resp.status().is_success() {
            bail!(
                "telegram rejected report: {} {}",
                resp.status(),
                resp.text().await.unwrap_or_default()
            );
        }

        Ok(())
    }

    /// Send an error notice, truncated to 1000 characters. Best effort:
    /// a failure here is logged and swallowed.
    pub async fn send_error(&self, error_text: &str) {
        let text = format!(
            "❌ *Bot Error*\n`{}`",
            truncate_chars(error_text, ERROR_TEXT_LIMIT)
        );

        match self.send_message(&text).await {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => warn!("error notice rejected by telegram: {}", resp.status()),
            Err(e) => warn!("error notice could not be sent: {e}"),
        }
    }

    async fn send_message(&self, text: &str) -> Result<reqwest::Response, reqwest::Error> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        self.client
            .post(&url)
            .form(&[
                ("chat_id", self.chat_id.as_str()),
                ("text", text),
                ("parse_mode", "Markdown"),
            ])
            .send()
            .await
    }
}
