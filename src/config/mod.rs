//! Configuration management for tiktide.
//!
//! Configuration is read from `~/.config/tiktide/config.toml` at startup
//! (or the path given with `--config`). If the file doesn't exist, a default
//! configuration with comments is created.

use crate::scraper::ScraperConfig;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub scraper: ScraperConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Items returned when a request omits `number`
    pub default_number: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            default_number: 10,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, creating a commented default there
    /// when nothing exists yet.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::create_default_config(path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/tiktide/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("tiktide").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# tiktide configuration

[server]
# Address the HTTP API listens on
host = "0.0.0.0"
port = 3000

# Items returned when a request omits ?number=
default_number = 10

[scraper]
# Run the browser without a visible window
headless = true

# Listing page for explore collection
explore_url = "https://www.tiktok.com/explore?lang=cn"

# Search results page; keywords are appended as ?q=
search_url = "https://www.tiktok.com/search/video"

# Per-navigation timeout in seconds
navigation_timeout_secs = 60

# Pauses (milliseconds) that let pages finish rendering
listing_settle_ms = 6000
item_settle_ms = 3000

# Upper bound for waiting on embedded data, and how often to check
data_wait_ms = 9000
poll_interval_ms = 250

# Lazy-load scrolling on listing pages
scroll_rounds = 3
scroll_pixels = 1200
scroll_pause_ms = 1500

# Browser identity
viewport_width = 1920
viewport_height = 1080
locale = "zh-CN"
timezone = "Asia/Shanghai"
accept_language = "zh-CN,zh;q=0.9,en;q=0.8"

# Extra flags passed to Chrome
chrome_args = []

# Uncomment to use a specific Chrome/Chromium binary
# chrome_executable = "/usr/bin/chromium"

# Uncomment to save the listing HTML when no video links are found
# debug_html_path = "tiktok_explore_debug.html"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
