use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetLocaleOverrideParams, SetTimezoneOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::app::{Result, TiktideError};
use crate::scraper::config::ScraperConfig;
use crate::scraper::{PageDriver, ScopedPage, SessionProvider};

/// Flags that hide the most obvious automation signals
const STEALTH_ARGS: [&str; 4] = [
    "--disable-blink-features=AutomationControlled",
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
];

/// Runs before any page script on every new document.
const WEBDRIVER_MASK: &str = r#"
Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
window.chrome = window.chrome || { runtime: {} };
"#;

/// Launches a fresh Chromium for every acquired session
#[derive(Debug, Clone)]
pub struct ChromeSessionProvider {
    config: ScraperConfig,
}

impl ChromeSessionProvider {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionProvider for ChromeSessionProvider {
    async fn acquire(&self, headless: bool) -> Result<ScopedPage> {
        let page = ChromePage::launch(&self.config, headless).await?;
        Ok(ScopedPage::new(page))
    }
}

/// One browser process with a single configured tab.
pub struct ChromePage {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromePage {
    pub async fn launch(config: &ScraperConfig, headless: bool) -> Result<Self> {
        info!("Launching browser (headless={})", headless);

        let mut builder = BrowserConfig::builder()
            .window_size(config.viewport_width, config.viewport_height)
            .viewport(Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
                ..Viewport::default()
            })
            .request_timeout(config.navigation_timeout());

        for arg in STEALTH_ARGS {
            builder = builder.arg(arg);
        }
        for arg in &config.chrome_args {
            builder = builder.arg(arg.as_str());
        }
        if let Some(ref path) = config.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        if !headless {
            builder = builder.with_head();
        }

        let browser_config = builder.build().map_err(|e| {
            TiktideError::SessionLaunch(format!("Failed to build browser config: {}", e))
        })?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            TiktideError::SessionLaunch(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let mut browser = browser;
                let _ = browser.close().await;
                let _ = browser.wait().await;
                handler.abort();
                return Err(TiktideError::SessionLaunch(format!("Failed to open page: {}", e)));
            }
        };

        let mut session = Self {
            browser,
            page,
            handler,
        };
        if let Err(e) = session.configure(config).await {
            let _ = session.close().await;
            return Err(TiktideError::SessionLaunch(format!(
                "Failed to configure page: {}",
                e
            )));
        }

        Ok(session)
    }

    /// Identity and locale emulation for the tab
    async fn configure(&self, config: &ScraperConfig) -> Result<()> {
        let mut user_agent = SetUserAgentOverrideParams::new(config.user_agent.clone());
        user_agent.accept_language = Some(config.accept_language.clone());
        self.page.execute(user_agent).await?;

        self.page
            .execute(SetTimezoneOverrideParams::new(config.timezone.clone()))
            .await?;
        self.page
            .execute(SetLocaleOverrideParams {
                locale: Some(config.locale.clone()),
            })
            .await?;
        self.page
            .execute(AddScriptToEvaluateOnNewDocumentParams::new(WEBDRIVER_MASK))
            .await?;

        debug!(
            "Page configured: locale={}, timezone={}",
            config.locale, config.timezone
        );
        Ok(())
    }
}

#[async_trait]
impl PageDriver for ChromePage {
    async fn goto(&self, url: &str) -> Result<()> {
        self.page.goto(url).await?.wait_for_navigation().await?;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value> {
        let result = self.page.evaluate(script.to_string()).await?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn content(&self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    async fn current_url(&self) -> Result<Option<String>> {
        Ok(self.page.url().await?)
    }

    async fn close(&mut self) -> Result<()> {
        if let Err(e) = self.page.clone().close().await {
            debug!("Failed to close page: {}", e);
        }
        let closed = self.browser.close().await;
        let _ = self.browser.wait().await;
        self.handler.abort();
        closed?;
        Ok(())
    }
}

impl Drop for ChromePage {
    fn drop(&mut self) {
        self.handler.abort();
    }
}
