//! Best-effort helpers that stabilize a live page before reading it.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::app::{Result, TiktideError};
use crate::scraper::PageDriver;

/// Clicks the first consent button it can find. Returns whether it clicked.
const CONSENT_SCRIPT: &str = r#"
(() => {
  const btn = document.querySelector('[data-e2e="cookie-banner-accept-button"]') ||
              Array.from(document.querySelectorAll('button, div[role="button"]'))
                   .find(b => /accept all|同意|允许|同意所有/i.test(b.textContent || ''));
  if (btn) { btn.click(); return true; }
  return false;
})()
"#;

/// True once any of the three embedded data markers is present.
const DATA_MARKER_SCRIPT: &str = r#"
(() => !!((window.SIGI_STATE && window.SIGI_STATE.ItemModule) ||
          document.querySelector('#__NEXT_DATA__') ||
          document.querySelector('#__UNIVERSAL_DATA_FOR_REHYDRATION__') ||
          document.querySelector('script[type="application/ld+json"]')))()
"#;

/// Navigate and wait for the load event, bounded by `timeout`.
pub async fn navigate(page: &dyn PageDriver, url: &str, timeout: Duration) -> Result<()> {
    debug!("Navigating to {}", url);
    match tokio::time::timeout(timeout, page.goto(url)).await {
        Ok(result) => result,
        Err(_) => Err(TiktideError::NavigationTimeout {
            url: url.to_string(),
            secs: timeout.as_secs(),
        }),
    }
}

/// Accept a cookie/consent banner if one is showing. Never fails.
pub async fn dismiss_consent_banner(page: &dyn PageDriver) {
    match page.evaluate(CONSENT_SCRIPT).await {
        Ok(serde_json::Value::Bool(true)) => debug!("Dismissed consent banner"),
        Ok(_) => {}
        Err(e) => debug!("Consent banner check failed: {}", e),
    }
}

/// Poll until one of the known data markers appears or `timeout` elapses.
///
/// The return value is informational only; callers proceed either way.
pub async fn await_initial_data(page: &dyn PageDriver, timeout: Duration, poll: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if let Ok(serde_json::Value::Bool(true)) = page.evaluate(DATA_MARKER_SCRIPT).await {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            debug!("No data marker after {:?}, continuing anyway", timeout);
            return false;
        }
        tokio::time::sleep(poll.min(deadline - now)).await;
    }
}

/// Scroll down in `rounds` steps to trigger lazy-loaded content.
pub async fn gentle_scroll(page: &dyn PageDriver, rounds: u32, pixels: u32, pause: Duration) {
    for round in 0..rounds {
        if let Err(e) = page.scroll_by(pixels).await {
            debug!("Scroll round {} failed: {}", round + 1, e);
        }
        tokio::time::sleep(pause).await;
    }
}
