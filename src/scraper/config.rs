use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Desktop Chrome user agent presented to the target site
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0 Safari/537.36";

/// Configuration for the browser-driven scraper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// Listing page used for explore collection
    pub explore_url: String,

    /// Search results page; keywords are appended as `?q=`
    pub search_url: String,

    /// Per-navigation timeout in seconds (default: 60)
    pub navigation_timeout_secs: u64,

    /// Settle time after the listing page loads, in milliseconds (default: 6000)
    pub listing_settle_ms: u64,

    /// Settle time after each video page loads, in milliseconds (default: 3000)
    pub item_settle_ms: u64,

    /// Upper bound for waiting on embedded data markers, in milliseconds (default: 9000)
    pub data_wait_ms: u64,

    /// How often data markers are polled, in milliseconds (default: 250)
    pub poll_interval_ms: u64,

    /// Number of lazy-load scroll rounds on listing pages (default: 3)
    pub scroll_rounds: u32,

    /// Pixels scrolled per round (default: 1200)
    pub scroll_pixels: u32,

    /// Pause between scroll rounds, in milliseconds (default: 1500)
    pub scroll_pause_ms: u64,

    /// User agent string to use
    pub user_agent: String,

    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Browser locale (default: zh-CN)
    pub locale: String,

    /// IANA timezone emulated by the page (default: Asia/Shanghai)
    pub timezone: String,

    /// Value sent as the Accept-Language header
    pub accept_language: String,

    /// Explicit Chrome/Chromium binary; autodetected when unset
    pub chrome_executable: Option<PathBuf>,

    /// Extra command-line flags passed to the browser
    pub chrome_args: Vec<String>,

    /// Where to dump the listing HTML when no video links are found
    pub debug_html_path: Option<PathBuf>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headless: true,
            explore_url: "https://www.tiktok.com/explore?lang=cn".to_string(),
            search_url: "https://www.tiktok.com/search/video".to_string(),
            navigation_timeout_secs: 60,
            listing_settle_ms: 6000,
            item_settle_ms: 3000,
            data_wait_ms: 9000,
            poll_interval_ms: 250,
            scroll_rounds: 3,
            scroll_pixels: 1200,
            scroll_pause_ms: 1500,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            viewport_width: 1920,
            viewport_height: 1080,
            locale: "zh-CN".to_string(),
            timezone: "Asia/Shanghai".to_string(),
            accept_language: "zh-CN,zh;q=0.9,en;q=0.8".to_string(),
            chrome_executable: None,
            chrome_args: Vec::new(),
            debug_html_path: None,
        }
    }
}

impl ScraperConfig {
    /// Get the navigation timeout as a Duration
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn listing_settle(&self) -> Duration {
        Duration::from_millis(self.listing_settle_ms)
    }

    pub fn item_settle(&self) -> Duration {
        Duration::from_millis(self.item_settle_ms)
    }

    pub fn data_wait(&self) -> Duration {
        Duration::from_millis(self.data_wait_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_ms)
    }

    /// Create a config with shorter waits (less reliable against slow pages)
    pub fn fast() -> Self {
        Self::default().with_fast_timings()
    }

    /// Keep identity and URLs, shorten every wait
    pub fn with_fast_timings(self) -> Self {
        Self {
            navigation_timeout_secs: 30,
            listing_settle_ms: 2000,
            item_settle_ms: 1000,
            data_wait_ms: 4000,
            scroll_rounds: 2,
            scroll_pause_ms: 800,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = ScraperConfig::default();
        assert!(config.headless);
        assert_eq!(config.navigation_timeout_secs, 60);
        assert_eq!(config.scroll_rounds, 3);
        assert_eq!(config.viewport_width, 1920);
        assert_eq!(config.viewport_height, 1080);
        assert_eq!(config.locale, "zh-CN");
        assert_eq!(config.timezone, "Asia/Shanghai");
        assert!(config.accept_language.starts_with("zh-CN"));
        assert!(config.user_agent.contains("Chrome"));
        assert!(config.explore_url.contains("/explore"));
        assert!(config.debug_html_path.is_none());
    }

    #[test]
    fn test_fast_config() {
        let config = ScraperConfig::fast();
        assert_eq!(config.navigation_timeout_secs, 30);
        assert_eq!(config.listing_settle_ms, 2000);
        assert_eq!(config.scroll_rounds, 2);
        // Inherits defaults for the rest
        assert_eq!(config.locale, "zh-CN");
    }

    #[test]
    fn test_fast_timings_keep_identity() {
        let config = ScraperConfig {
            locale: "en-US".to_string(),
            headless: false,
            ..Default::default()
        }
        .with_fast_timings();
        assert_eq!(config.item_settle_ms, 1000);
        assert_eq!(config.locale, "en-US");
        assert!(!config.headless);
    }

    #[test]
    fn test_durations() {
        let config = ScraperConfig::default();
        assert_eq!(config.navigation_timeout(), Duration::from_secs(60));
        assert_eq!(config.data_wait(), Duration::from_millis(9000));
        assert_eq!(config.item_settle(), Duration::from_millis(3000));
        assert_eq!(config.scroll_pause(), Duration::from_millis(1500));
    }

    #[test]
    fn test_poll_interval_never_zero() {
        let config = ScraperConfig {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
    }
}
