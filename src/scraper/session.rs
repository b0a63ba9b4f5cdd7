use tracing::{debug, warn};

use crate::scraper::PageDriver;

/// A browser page owned by exactly one operation.
///
/// Call [`ScopedPage::release`] on the normal path; if the guard is dropped
/// instead (early return, panic) the driver's own `Drop` tears down the
/// browser process.
pub struct ScopedPage {
    driver: Box<dyn PageDriver>,
    released: bool,
}

impl ScopedPage {
    pub fn new(driver: impl PageDriver + 'static) -> Self {
        Self {
            driver: Box::new(driver),
            released: false,
        }
    }

    pub fn page(&self) -> &dyn PageDriver {
        self.driver.as_ref()
    }

    /// Close the page and everything behind it.
    pub async fn release(mut self) {
        if let Err(e) = self.driver.close().await {
            warn!("Failed to release browser session cleanly: {}", e);
        }
        self.released = true;
        debug!("Browser session released");
    }
}

impl Drop for ScopedPage {
    fn drop(&mut self) {
        if !self.released {
            debug!("Browser session dropped without explicit release");
        }
    }
}
