//! Explore collection: discover video links on a listing page, then visit
//! each one and extract its metadata.

use std::collections::HashSet;
use std::sync::Arc;

use scraper::{Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use crate::app::Result;
use crate::domain::{ExploreBatch, VideoLink, VideoMetadata};
use crate::scraper::document::PageDocument;
use crate::scraper::extractor::MetadataExtractor;
use crate::scraper::interaction::{await_initial_data, dismiss_consent_banner, gentle_scroll, navigate};
use crate::scraper::{PageDriver, ScraperConfig, SessionProvider};

const VIDEO_LINK_SELECTOR: &str = r#"a[href*="/video/"]"#;
const LINK_TITLE_SELECTOR: &str = r#"[data-e2e="video-title"], strong, span"#;
const NO_TITLE: &str = "No title";

/// Find every video link in a listing page's HTML.
///
/// Relative hrefs are resolved against `base_url`. Links are de-duplicated by
/// exact URL and keep first-seen order.
pub fn discover_links(html: &str, base_url: &str) -> Vec<VideoLink> {
    let (Ok(anchors), Ok(titles)) = (
        Selector::parse(VIDEO_LINK_SELECTOR),
        Selector::parse(LINK_TITLE_SELECTOR),
    ) else {
        return Vec::new();
    };
    let base = Url::parse(base_url).ok();
    let dom = Html::parse_document(html);

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for anchor in dom.select(&anchors) {
        let Some(href) = anchor.value().attr("href").map(str::trim) else {
            continue;
        };
        let Some(url) = resolve(base.as_ref(), href) else {
            continue;
        };
        if !seen.insert(url.clone()) {
            continue;
        }

        let title = anchor
            .select(&titles)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NO_TITLE.to_string());
        links.push(VideoLink::new(url, title));
    }
    links
}

fn resolve(base: Option<&Url>, href: &str) -> Option<String> {
    if href.is_empty() {
        return None;
    }
    let url = match base {
        Some(base) => base.join(href).ok()?,
        None => Url::parse(href).ok()?,
    };
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

/// Drives browser sessions through the explore and search flows.
///
/// Each operation acquires its own session and releases it before
/// returning, so a `Harvester` can be cloned and shared across requests.
#[derive(Clone)]
pub struct Harvester {
    sessions: Arc<dyn SessionProvider>,
    config: ScraperConfig,
    extractor: MetadataExtractor,
}

impl Harvester {
    pub fn new(sessions: Arc<dyn SessionProvider>, config: ScraperConfig) -> Self {
        Self {
            sessions,
            config,
            extractor: MetadataExtractor::new(),
        }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Collect metadata for up to `count` videos from the explore page.
    ///
    /// Fails only when no session can be launched or the listing page itself
    /// cannot be loaded. A video page that fails is kept in the batch as a
    /// URL-only record.
    pub async fn collect_explore_items(&self, count: usize, headless: bool) -> Result<ExploreBatch> {
        let session = self.sessions.acquire(headless).await?;
        let result = self.collect_with(session.page(), count).await;
        session.release().await;
        result
    }

    /// Discover explore links without visiting them.
    pub async fn explore_links(&self, headless: bool) -> Result<Vec<VideoLink>> {
        let session = self.sessions.acquire(headless).await?;
        let result = self.discover(session.page(), &self.config.explore_url).await;
        session.release().await;
        result
    }

    pub(crate) fn sessions(&self) -> &dyn SessionProvider {
        self.sessions.as_ref()
    }

    async fn collect_with(&self, page: &dyn PageDriver, count: usize) -> Result<ExploreBatch> {
        let mut links = self.discover(page, &self.config.explore_url).await?;
        links.truncate(count);
        info!("Visiting {} video pages", links.len());

        let mut batch = Vec::with_capacity(links.len());
        for link in &links {
            batch.push(self.visit(page, &link.url).await);
        }

        let failed = batch.iter().filter(|m| m.is_sentinel()).count();
        info!(
            "Collected {} items ({} without metadata)",
            batch.len(),
            failed
        );
        Ok(batch)
    }

    /// Load a listing page, let it settle, and read its video links.
    pub(crate) async fn discover(&self, page: &dyn PageDriver, url: &str) -> Result<Vec<VideoLink>> {
        navigate(page, url, self.config.navigation_timeout()).await?;
        dismiss_consent_banner(page).await;
        tokio::time::sleep(self.config.listing_settle()).await;
        gentle_scroll(
            page,
            self.config.scroll_rounds,
            self.config.scroll_pixels,
            self.config.scroll_pause(),
        )
        .await;

        let base = match page.current_url().await {
            Ok(Some(current)) => current,
            _ => url.to_string(),
        };
        let html = page.content().await?;
        let links = discover_links(&html, &base);
        debug!("Discovered {} video links on {}", links.len(), base);

        if links.is_empty() {
            self.dump_listing(&html).await;
        }
        Ok(links)
    }

    async fn visit(&self, page: &dyn PageDriver, url: &str) -> VideoMetadata {
        match self.try_visit(page, url).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Failed to extract {}: {}", url, e);
                VideoMetadata::sentinel(url)
            }
        }
    }

    async fn try_visit(&self, page: &dyn PageDriver, url: &str) -> Result<VideoMetadata> {
        navigate(page, url, self.config.navigation_timeout()).await?;
        dismiss_consent_banner(page).await;
        await_initial_data(page, self.config.data_wait(), self.config.poll_interval()).await;
        tokio::time::sleep(self.config.item_settle()).await;

        let doc = PageDocument::capture(page, url).await?;
        Ok(self.extractor.extract(&doc).with_fallback_url(url))
    }

    async fn dump_listing(&self, html: &str) {
        let Some(path) = &self.config.debug_html_path else {
            return;
        };
        match tokio::fs::write(path, html).await {
            Ok(()) => info!("No video links found; listing HTML saved to {}", path.display()),
            Err(e) => warn!("Failed to save listing HTML to {}: {}", path.display(), e),
        }
    }
}
