use tracing::info;
use url::Url;

use crate::app::{Result, TiktideError};
use crate::scraper::collector::Harvester;

/// Search results URL for `keywords`
pub fn search_url(base: &str, keywords: &str) -> Result<String> {
    let mut url = Url::parse(base)?;
    url.query_pairs_mut().append_pair("q", keywords);
    Ok(url.to_string())
}

impl Harvester {
    /// Video URLs from the search results page for `keywords`, de-duplicated
    /// and in page order.
    pub async fn search_videos_by_keywords(&self, keywords: &str) -> Result<Vec<String>> {
        let keywords = keywords.trim();
        if keywords.is_empty() {
            return Err(TiktideError::Validation("keywords must not be empty".into()));
        }
        let url = search_url(&self.config().search_url, keywords)?;

        let session = self.sessions().acquire(self.config().headless).await?;
        let result = self.discover(session.page(), &url).await;
        session.release().await;

        let links = result?;
        info!("Search for {:?} found {} videos", keywords, links.len());
        Ok(links.into_iter().map(|link| link.url).collect())
    }
}
