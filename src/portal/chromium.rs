//! Chromium-driven portal session using chromiumoxide.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tracing::debug;

use super::PortalError;

/// Interval between page-condition polls.
const POLL_INTERVAL_MS: u64 = 250;

/// Navigation timeout per page load.
const NAVIGATION_TIMEOUT_MS: u64 = 30_000;

/// Login form field and button selectors on the portal.
const USERNAME_FIELD: &str = r#"input[name="txtusername"]"#;
const PASSWORD_FIELD: &str = r#"input[name="txtpassword"]"#;
const LOGIN_BUTTON: &str = r#"button.btn.blue.pull-right[onclick*="login()"]"#;

/// The postback button that renders the attendance table.
const ATTENDANCE_BUTTON: &str = r#"[name="ctl00$ContentPlaceHolder1$btnAtt"]"#;

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. ROLLCALL_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("ROLLCALL_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.rollcall/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".rollcall/chromium/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".rollcall/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".rollcall/chromium/chrome-linux64/chrome"),
                home.join(".rollcall/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// A logged-in-capable headless browser session against the portal.
pub struct ChromiumPortal {
    browser: Browser,
    page: Page,
    wait_budget_ms: u64,
}

impl ChromiumPortal {
    /// Launch a headless Chromium instance with one blank page.
    ///
    /// `wait_budget_ms` bounds every page-condition wait.
    pub async fn launch(wait_budget_ms: u64) -> Result<Self> {
        let chrome_path = find_chromium().ok_or(PortalError::ChromiumNotFound)?;

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--window-size=1920,1080")
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Drain CDP events for the lifetime of the browser.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("failed to open a page")?;

        Ok(Self {
            browser,
            page,
            wait_budget_ms,
        })
    }

    /// Log into the portal and wait until the session leaves the login page.
    pub async fn login(&self, login_url: &str, username: &str, password: &str) -> Result<()> {
        self.navigate(login_url).await?;
        self.wait_until(
            "the login form",
            &element_present(USERNAME_FIELD),
        )
        .await?;

        self.fill(USERNAME_FIELD, username).await?;
        self.fill(PASSWORD_FIELD, password).await?;
        self.click(LOGIN_BUTTON).await?;

        self.wait_until(
            "login to complete",
            r#"!window.location.href.includes("/Login")"#,
        )
        .await
    }

    /// Open the attendance view and return the rendered page HTML.
    pub async fn fetch_attendance_html(&self, history_url: &str) -> Result<String> {
        self.navigate(history_url).await?;
        self.wait_until(
            "the attendance button",
            &element_present(ATTENDANCE_BUTTON),
        )
        .await?;

        self.click(ATTENDANCE_BUTTON).await?;
        self.wait_until(
            "the attendance table",
            r#"document.querySelectorAll("table tr").length > 1"#,
        )
        .await?;

        let result = self
            .page
            .evaluate("document.documentElement.outerHTML")
            .await
            .context("failed to read page HTML")?;

        result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert HTML result: {e:?}"))
    }

    /// Close the page and the browser. Must run on every exit path.
    pub async fn close(mut self) -> Result<()> {
        let _ = self.page.close().await;
        self.browser.close().await.context("closing browser")?;
        Ok(())
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        let result = tokio::time::timeout(
            Duration::from_millis(NAVIGATION_TIMEOUT_MS),
            self.page.goto(url),
        )
        .await;

        match result {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(anyhow::anyhow!("navigation to {url} failed: {e}")),
            Err(_) => Err(PortalError::NavigationTimeout {
                url: url.to_string(),
            }
            .into()),
        }
    }

    /// Poll a JS predicate until it holds or the wait budget runs out.
    ///
    /// This is the replacement for fixed post-action sleeps: the page is
    /// asked directly whether the condition holds, at a bounded interval,
    /// and a timeout names the condition that never arrived.
    async fn wait_until(&self, condition: &str, predicate_js: &str) -> Result<()> {
        let deadline = Instant::now() + Duration::from_millis(self.wait_budget_ms);

        loop {
            let holds = self
                .page
                .evaluate(predicate_js)
                .await
                .ok()
                .and_then(|v| v.into_value::<bool>().ok())
                .unwrap_or(false);

            if holds {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(PortalError::WaitTimeout {
                    condition: condition.to_string(),
                    timeout_ms: self.wait_budget_ms,
                }
                .into());
            }

            debug!("waiting for {condition}");
            tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
        }
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| PortalError::ElementNotFound(selector.to_string()))?;
        element
            .click()
            .await
            .with_context(|| format!("focusing {selector}"))?;
        element
            .type_str(value)
            .await
            .with_context(|| format!("typing into {selector}"))?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| PortalError::ElementNotFound(selector.to_string()))?;
        element
            .click()
            .await
            .with_context(|| format!("clicking {selector}"))?;
        Ok(())
    }
}

/// JS predicate: the selector matches at least one element.
fn element_present(selector: &str) -> String {
    format!("document.querySelector('{selector}') !== null")
}
