//! Scripted stand-ins for a browser, used by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::app::{Result, TiktideError};
use crate::scraper::{PageDriver, ScopedPage, ScraperConfig, SessionProvider};

/// Scraper settings with every pause cut to (almost) nothing.
pub fn quick_config() -> ScraperConfig {
    ScraperConfig {
        listing_settle_ms: 0,
        item_settle_ms: 0,
        data_wait_ms: 20,
        poll_interval_ms: 1,
        scroll_rounds: 1,
        scroll_pause_ms: 0,
        ..ScraperConfig::default()
    }
}

#[derive(Debug, Clone, Default)]
struct FakePageSpec {
    html: String,
    state: Option<Value>,
    hang: bool,
    broken: bool,
}

/// A fixed set of pages keyed by URL.
#[derive(Debug, Clone)]
pub struct FakeSite {
    pages: HashMap<String, FakePageSpec>,
    markers: bool,
    failing_scripts: bool,
}

impl FakeSite {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            markers: true,
            failing_scripts: false,
        }
    }

    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            FakePageSpec {
                html: html.to_string(),
                ..Default::default()
            },
        );
        self
    }

    pub fn page_with_state(mut self, url: &str, html: &str, state: Value) -> Self {
        self.pages.insert(
            url.to_string(),
            FakePageSpec {
                html: html.to_string(),
                state: Some(state),
                ..Default::default()
            },
        );
        self
    }

    /// Navigation to `url` never completes.
    pub fn hanging_page(mut self, url: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            FakePageSpec {
                hang: true,
                ..Default::default()
            },
        );
        self
    }

    /// Navigation succeeds but reading the DOM fails.
    pub fn broken_page(mut self, url: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            FakePageSpec {
                broken: true,
                ..Default::default()
            },
        );
        self
    }

    pub fn without_markers(mut self) -> Self {
        self.markers = false;
        self
    }

    pub fn failing_scripts(mut self) -> Self {
        self.failing_scripts = true;
        self
    }
}

pub struct FakePage {
    site: FakeSite,
    current: Mutex<String>,
    visited: Arc<Mutex<Vec<String>>>,
    scrolls: AtomicUsize,
    closed: Arc<AtomicUsize>,
}

impl FakePage {
    pub fn new(site: FakeSite) -> Self {
        Self::with_shared_logs(site, Arc::default(), Arc::default())
    }

    fn with_shared_logs(
        site: FakeSite,
        visited: Arc<Mutex<Vec<String>>>,
        closed: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            site,
            current: Mutex::new(String::new()),
            visited,
            scrolls: AtomicUsize::new(0),
            closed,
        }
    }

    pub fn scroll_count(&self) -> usize {
        self.scrolls.load(Ordering::SeqCst)
    }

    fn current_spec(&self) -> Option<FakePageSpec> {
        let current = self.current.lock().unwrap().clone();
        self.site.pages.get(&current).cloned()
    }
}

#[async_trait]
impl PageDriver for FakePage {
    async fn goto(&self, url: &str) -> Result<()> {
        self.visited.lock().unwrap().push(url.to_string());
        let spec = self
            .site
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| TiktideError::Other(format!("net::ERR_NAME_NOT_RESOLVED at {}", url)))?;
        if spec.hang {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        *self.current.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn evaluate(&self, _script: &str) -> Result<Value> {
        if self.site.failing_scripts {
            return Err(TiktideError::Other("Execution context was destroyed".into()));
        }
        Ok(Value::Bool(self.site.markers))
    }

    async fn content(&self) -> Result<String> {
        match self.current_spec() {
            Some(spec) if spec.broken => Err(TiktideError::Other("Target closed".into())),
            Some(spec) => Ok(spec.html),
            None => Ok(String::new()),
        }
    }

    async fn current_url(&self) -> Result<Option<String>> {
        let current = self.current.lock().unwrap().clone();
        Ok((!current.is_empty()).then_some(current))
    }

    async fn read_global(&self, _name: &str) -> Result<Option<Value>> {
        if self.site.failing_scripts {
            return Err(TiktideError::Other("Execution context was destroyed".into()));
        }
        Ok(self.current_spec().and_then(|spec| spec.state))
    }

    async fn scroll_by(&self, _pixels: u32) -> Result<()> {
        self.scrolls.fetch_add(1, Ordering::SeqCst);
        if self.site.failing_scripts {
            return Err(TiktideError::Other("Execution context was destroyed".into()));
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out [`FakePage`]s over one shared site and counts releases.
pub struct FakeSessions {
    site: FakeSite,
    fail_launch: bool,
    acquired: AtomicUsize,
    released: Arc<AtomicUsize>,
    visited: Arc<Mutex<Vec<String>>>,
}

impl FakeSessions {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site,
            fail_launch: false,
            acquired: AtomicUsize::new(0),
            released: Arc::new(AtomicUsize::new(0)),
            visited: Arc::default(),
        }
    }

    pub fn failing_launch() -> Self {
        Self {
            fail_launch: true,
            ..Self::new(FakeSite::new())
        }
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Every URL navigated to, across all pages handed out.
    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionProvider for FakeSessions {
    async fn acquire(&self, _headless: bool) -> Result<ScopedPage> {
        if self.fail_launch {
            return Err(TiktideError::SessionLaunch("chromium not found".into()));
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(ScopedPage::new(FakePage::with_shared_logs(
            self.site.clone(),
            self.visited.clone(),
            self.released.clone(),
        )))
    }
}
