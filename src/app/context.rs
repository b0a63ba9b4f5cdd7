use std::path::Path;
use std::sync::Arc;

use crate::app::error::{Result, TiktideError};
use crate::config::Config;
use crate::scraper::{ChromeSessionProvider, Harvester, SessionProvider};

/// Everything a command or request handler needs, built once at startup.
#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub harvester: Harvester,
}

impl AppContext {
    /// Wire a Chrome-backed harvester from `config`.
    pub fn new(config: Config) -> Self {
        let sessions: Arc<dyn SessionProvider> =
            Arc::new(ChromeSessionProvider::new(config.scraper.clone()));
        Self::with_sessions(config, sessions)
    }

    pub fn with_sessions(config: Config, sessions: Arc<dyn SessionProvider>) -> Self {
        let harvester = Harvester::new(sessions, config.scraper.clone());
        Self { config, harvester }
    }

    /// Read the configuration file at `path`, or the default location.
    pub fn load_config(path: Option<&Path>) -> Result<Config> {
        let loaded = match path {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        };
        loaded.map_err(|e| TiktideError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 4000\n").unwrap();

        let config = AppContext::load_config(Some(&path)).unwrap();
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_load_config_error_is_config_variant() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();

        let err = AppContext::load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, TiktideError::Config(_)));
    }

    #[test]
    fn test_harvester_uses_scraper_config() {
        let mut config = Config::default();
        config.scraper.scroll_rounds = 7;
        let ctx = AppContext::new(config);
        assert_eq!(ctx.harvester.config().scroll_rounds, 7);
    }
}
