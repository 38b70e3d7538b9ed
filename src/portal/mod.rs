//! Browser-driven portal session.
//!
//! The ERP renders its attendance view through ASP.NET postbacks, so the
//! session runs in a real headless browser. Instead of the fixed sleeps
//! a scripted client would use, every step waits on an explicit page
//! condition with a timeout and bounded polling.

pub mod chromium;

pub use chromium::ChromiumPortal;

/// Errors raised while driving the portal.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("chromium not found — set ROLLCALL_CHROMIUM_PATH or install google-chrome")]
    ChromiumNotFound,

    #[error("timed out after {timeout_ms}ms waiting for {condition}")]
    WaitTimeout { condition: String, timeout_ms: u64 },

    #[error("navigation to {url} timed out")]
    NavigationTimeout { url: String },

    #[error("portal element not found: {0}")]
    ElementNotFound(String),
}
