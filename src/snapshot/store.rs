//! Snapshot persistence in a remote file-store.
//!
//! The previous run's snapshot lives as one JSON file in a hosted
//! contents API (GitHub-style: GET returns a base64 body plus a revision
//! sha, PUT replaces the file when given the current sha). The remote is
//! the single source of previous state; on a remote write failure the
//! snapshot is parked in a local file so the run still succeeds, but that
//! file is never read back.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::config::Config;
use crate::snapshot::Snapshot;

/// Default contents-API endpoint.
const STORE_API: &str = "https://api.github.com";

/// Commit message recorded with each snapshot update.
const UPDATE_MESSAGE: &str = "Update attendance snapshot";

/// A snapshot loaded from the store, with the revision needed to replace it.
#[derive(Debug, Clone)]
pub struct StoredSnapshot {
    pub snapshot: Snapshot,
    pub revision: String,
}

/// Where a snapshot ended up after [`SnapshotStore::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    Remote,
    LocalFallback(PathBuf),
}

/// Remote snapshot store with a local-disk write fallback.
pub struct SnapshotStore {
    api_base: String,
    token: String,
    repo: String,
    path: String,
    local_fallback: PathBuf,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
}

impl SnapshotStore {
    /// Create a store against the real contents API.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            STORE_API,
            &config.store_token,
            &config.store_repo,
            &config.snapshot_path,
            config.local_fallback.clone(),
        )
    }

    /// Create a store against a custom endpoint (used by tests).
    pub fn new(
        api_base: &str,
        token: &str,
        repo: &str,
        path: &str,
        local_fallback: PathBuf,
    ) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
            repo: repo.to_string(),
            path: path.to_string(),
            local_fallback,
            client: reqwest::Client::new(),
        }
    }

    fn contents_url(&self) -> String {
        format!("{}/repos/{}/contents/{}", self.api_base, self.repo, self.path)
    }

    /// Load the previously stored snapshot. `None` means first run.
    pub async fn load(&self) -> Result<Option<StoredSnapshot>> {
        let resp = self
            .client
            .get(self.contents_url())
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "rollcall")
            .send()
            .await
            .context("fetching stored snapshot")?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            bail!("snapshot fetch failed: {}", resp.status());
        }

        let contents: ContentsResponse =
            resp.json().await.context("decoding store response")?;

        // The API wraps base64 bodies across lines.
        let packed: String = contents.content.split_whitespace().collect();
        let raw = BASE64
            .decode(packed)
            .context("stored snapshot is not valid base64")?;
        let snapshot: Snapshot =
            serde_json::from_slice(&raw).context("stored snapshot is not valid JSON")?;

        Ok(Some(StoredSnapshot {
            snapshot,
            revision: contents.sha,
        }))
    }

    /// Persist the snapshot, replacing the previous one wholesale.
    ///
    /// A remote failure is downgraded to a local fallback write; only a
    /// failure of both paths errors.
    pub async fn save(&self, snapshot: &Snapshot, revision: Option<&str>) -> Result<SaveTarget> {
        let body = serde_json::to_vec_pretty(snapshot).context("encoding snapshot")?;

        match self.push_remote(&body, revision).await {
            Ok(()) => Ok(SaveTarget::Remote),
            Err(e) => {
                warn!("remote snapshot write failed: {e:#}");
                self.write_local(&body)?;
                Ok(SaveTarget::LocalFallback(self.local_fallback.clone()))
            }
        }
    }

    async fn push_remote(&self, body: &[u8], revision: Option<&str>) -> Result<()> {
        let mut payload = json!({
            "message": UPDATE_MESSAGE,
            "content": BASE64.encode(body),
        });
        if let Some(sha) = revision {
            payload["sha"] = json!(sha);
        }

        let resp = self
            .client
            .put(self.contents_url())
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "rollcall")
            .json(&payload)
            .send()
            .await
            .context("pushing snapshot to store")?;

        if !resp.status().is_success() {
            bail!(
                "store rejected snapshot: {} {}",
                resp.status(),
                resp.text().await.unwrap_or_default()
            );
        }

        Ok(())
    }

    fn write_local(&self, body: &[u8]) -> Result<()> {
        if let Some(parent) = self.local_fallback.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        std::fs::write(&self.local_fallback, body).with_context(|| {
            format!(
                "fallback snapshot write failed: {}",
                self.local_fallback.display()
            )
        })
    }
}
