//! Browser-driven harvesting of video metadata.
//!
//! # Architecture
//!
//! ```text
//! SessionProvider → ScopedPage → listing page → VideoLinks
//!                                  ↓ (per link, sequential)
//!                              video page → PageDocument → MetadataExtractor → VideoMetadata
//! ```
//!
//! Everything that touches the live browser goes through [`PageDriver`];
//! extraction itself runs on a captured [`PageDocument`] and never talks to
//! the browser.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tiktide::scraper::{ChromeSessionProvider, Harvester, ScraperConfig};
//!
//! let config = ScraperConfig::default();
//! let sessions = Arc::new(ChromeSessionProvider::new(config.clone()));
//! let harvester = Harvester::new(sessions, config);
//!
//! let batch = harvester.collect_explore_items(10, true).await?;
//! let urls = harvester.search_videos_by_keywords("cats").await?;
//! ```

mod chrome;
mod collector;
mod config;
mod document;
mod extractor;
mod interaction;
mod item;
mod linked_data;
mod search;
mod session;
mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use chrome::{ChromePage, ChromeSessionProvider};
pub use collector::{discover_links, Harvester};
pub use config::{ScraperConfig, DEFAULT_USER_AGENT};
pub use document::{PageDocument, GLOBAL_STATE_NAME};
pub use extractor::{Extraction, MetadataExtractor, Strategy};
pub use interaction::{await_initial_data, dismiss_consent_banner, gentle_scroll, navigate};
pub use search::search_url;
pub use session::ScopedPage;
pub use state::{evaluate_in_sandbox, parse_state_script};

use crate::app::Result;
use async_trait::async_trait;
use serde_json::Value;

/// A single live browser tab.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate and wait for the load event
    async fn goto(&self, url: &str) -> Result<()>;

    /// Evaluate a script expression and return its JSON value
    /// (`Null` for `undefined` or non-serializable results)
    async fn evaluate(&self, script: &str) -> Result<Value>;

    /// Serialized live DOM
    async fn content(&self) -> Result<String>;

    async fn current_url(&self) -> Result<Option<String>>;

    /// Read a `window` global as JSON; `None` when absent or not serializable
    async fn read_global(&self, name: &str) -> Result<Option<Value>> {
        let script = format!(
            "(() => {{ try {{ const v = window[{}]; \
             return v === undefined ? null : JSON.parse(JSON.stringify(v)); \
             }} catch (e) {{ return null; }} }})()",
            serde_json::to_string(name)?
        );
        let value = self.evaluate(&script).await?;
        Ok((!value.is_null()).then_some(value))
    }

    /// Scroll the viewport down by `pixels`
    async fn scroll_by(&self, pixels: u32) -> Result<()> {
        self.evaluate(&format!("window.scrollBy(0, {})", pixels))
            .await
            .map(|_| ())
    }

    /// Release the tab and everything behind it
    async fn close(&mut self) -> Result<()>;
}

/// Hands out browser sessions, one per operation.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Launch and configure a page. A failure here is fatal for the operation.
    async fn acquire(&self, headless: bool) -> Result<ScopedPage>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Answers every script with a fixed value and records what it ran
    struct ScriptedPage {
        answer: Value,
        scripts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PageDriver for ScriptedPage {
        async fn goto(&self, _url: &str) -> Result<()> {
            Ok(())
        }

        async fn evaluate(&self, script: &str) -> Result<Value> {
            self.scripts.lock().unwrap().push(script.to_string());
            Ok(self.answer.clone())
        }

        async fn content(&self) -> Result<String> {
            Ok(String::new())
        }

        async fn current_url(&self) -> Result<Option<String>> {
            Ok(None)
        }

        async fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn scripted(answer: Value) -> ScriptedPage {
        ScriptedPage {
            answer,
            scripts: Mutex::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn test_read_global_default() {
        let page = scripted(serde_json::json!({ "ItemModule": {} }));
        let state = page.read_global(GLOBAL_STATE_NAME).await.unwrap();
        assert!(state.is_some());
        assert!(page.scripts.lock().unwrap()[0].contains(r#"window["SIGI_STATE"]"#));

        let missing = scripted(Value::Null);
        assert!(missing.read_global(GLOBAL_STATE_NAME).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scroll_by_default() {
        let page = scripted(Value::Null);
        page.scroll_by(1200).await.unwrap();
        assert_eq!(page.scripts.lock().unwrap()[0], "window.scrollBy(0, 1200)");
    }
}
