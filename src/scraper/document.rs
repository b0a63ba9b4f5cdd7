use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use crate::app::Result;
use crate::scraper::PageDriver;

/// Name of the client-side state global the target site publishes.
pub const GLOBAL_STATE_NAME: &str = "SIGI_STATE";

/// Everything the extraction engine needs from a loaded page, captured once.
#[derive(Debug, Clone, Default)]
pub struct PageDocument {
    /// Page URL after redirects
    pub url: String,
    /// Serialized live DOM
    pub html: String,
    /// The site's global state object, when it exists and is serializable
    pub global_state: Option<Value>,
}

impl PageDocument {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            global_state: None,
        }
    }

    pub fn with_global_state(mut self, state: Value) -> Self {
        self.global_state = Some(state);
        self
    }

    /// Snapshot the page. Only a failure to read the DOM is an error; the
    /// URL and global state degrade to the requested URL and `None`.
    pub async fn capture(page: &dyn PageDriver, requested_url: &str) -> Result<Self> {
        let url = match page.current_url().await {
            Ok(Some(url)) if !url.is_empty() && url != "about:blank" => url,
            Ok(_) => requested_url.to_string(),
            Err(e) => {
                debug!("Could not read page URL: {}", e);
                requested_url.to_string()
            }
        };

        let html = page.content().await?;

        let global_state = match page.read_global(GLOBAL_STATE_NAME).await {
            Ok(state) => state.filter(|s| !s.is_null()),
            Err(e) => {
                debug!("Could not read {}: {}", GLOBAL_STATE_NAME, e);
                None
            }
        };

        Ok(Self {
            url,
            html,
            global_state,
        })
    }

    pub(crate) fn parse(&self) -> ParsedPage<'_> {
        ParsedPage {
            doc: self,
            dom: Html::parse_document(&self.html),
        }
    }
}

/// A [`PageDocument`] with its DOM parsed, shared by all strategies.
pub(crate) struct ParsedPage<'a> {
    pub doc: &'a PageDocument,
    pub dom: Html,
}

impl ParsedPage<'_> {
    /// Text of every element matching `selector`, in document order
    pub fn texts(&self, selector: &str) -> Vec<String> {
        let Ok(selector) = Selector::parse(selector) else {
            return Vec::new();
        };
        self.dom
            .select(&selector)
            .map(|el| el.text().collect::<String>())
            .collect()
    }

    /// Text of the first element matching any of `selectors`, tried in order
    pub fn first_text(&self, selectors: &[&str]) -> Option<String> {
        selectors
            .iter()
            .find_map(|s| self.texts(s).into_iter().find(|t| !t.trim().is_empty()))
    }

    /// `attr` of the first element matching `selector` that has a non-empty value
    pub fn attr(&self, selector: &str, attr: &str) -> Option<String> {
        let selector = Selector::parse(selector).ok()?;
        self.dom
            .select(&selector)
            .filter_map(|el| el.value().attr(attr))
            .map(str::trim)
            .find(|v| !v.is_empty())
            .map(String::from)
    }

    pub fn meta_property(&self, property: &str) -> Option<String> {
        self.attr(&format!(r#"meta[property="{}"]"#, property), "content")
    }

    pub fn meta_name(&self, name: &str) -> Option<String> {
        self.attr(&format!(r#"meta[name="{}"]"#, name), "content")
    }

    /// `src` of the first `<video>` element, if any
    pub fn video_src(&self) -> Option<String> {
        self.attr("video", "src")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::testing::{FakePage, FakeSite};

    #[tokio::test]
    async fn test_capture_reads_url_html_and_state() {
        let site = FakeSite::new().page_with_state(
            "https://www.tiktok.com/@a/video/1",
            "<html><body>hi</body></html>",
            serde_json::json!({ "ItemModule": {} }),
        );
        let page = FakePage::new(site);
        page.goto("https://www.tiktok.com/@a/video/1").await.unwrap();

        let doc = PageDocument::capture(&page, "https://requested").await.unwrap();
        assert_eq!(doc.url, "https://www.tiktok.com/@a/video/1");
        assert!(doc.html.contains("hi"));
        assert!(doc.global_state.is_some());
    }

    #[tokio::test]
    async fn test_capture_falls_back_to_requested_url() {
        let page = FakePage::new(FakeSite::new());
        let doc = PageDocument::capture(&page, "https://requested").await.unwrap();
        assert_eq!(doc.url, "https://requested");
        assert!(doc.global_state.is_none());
    }

    #[test]
    fn test_parsed_page_helpers() {
        let doc = PageDocument::new(
            "https://x",
            r#"<html><head>
                <meta property="og:title" content="Title">
                <meta name="description" content="  ">
                <script id="data">{"a":1}</script>
              </head><body><video src="https://cdn/v.mp4"></video></body></html>"#,
        );
        let parsed = doc.parse();
        assert_eq!(parsed.meta_property("og:title").as_deref(), Some("Title"));
        assert_eq!(parsed.meta_name("description"), None);
        assert_eq!(parsed.first_text(&["#missing", "#data"]).as_deref(), Some(r#"{"a":1}"#));
        assert_eq!(parsed.video_src().as_deref(), Some("https://cdn/v.mp4"));
        assert!(parsed.texts("[[bad").is_empty());
    }
}
