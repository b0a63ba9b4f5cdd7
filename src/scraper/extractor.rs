use serde_json::Value;
use tracing::debug;

use crate::domain::VideoMetadata;
use crate::scraper::document::{PageDocument, ParsedPage};
use crate::scraper::item::metadata_from_item;
use crate::scraper::linked_data::from_linked_data;
use crate::scraper::state::{first_item, parse_state_script, user_registry};

const STATE_SCRIPT_SELECTORS: [&str; 2] = ["#SIGI_STATE", r#"script[id*="SIGI"]"#];
const NEXT_DATA_SELECTOR: &str = "#__NEXT_DATA__";
const UNIVERSAL_DATA_SELECTOR: &str = "#__UNIVERSAL_DATA_FOR_REHYDRATION__";

/// One way of reading video metadata off a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Client-side global state object, or its inline script
    GlobalState,
    /// Framework hydration payload
    Hydration,
    /// `application/ld+json` structured data
    LinkedData,
    /// Open-graph and description meta tags
    OpenGraph,
}

impl Strategy {
    /// Priority order; the first strategy that yields a record wins.
    pub const CASCADE: [Strategy; 4] = [
        Strategy::GlobalState,
        Strategy::Hydration,
        Strategy::LinkedData,
        Strategy::OpenGraph,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::GlobalState => "global-state",
            Strategy::Hydration => "hydration",
            Strategy::LinkedData => "linked-data",
            Strategy::OpenGraph => "open-graph",
        }
    }

    fn apply(self, page: &ParsedPage<'_>) -> Option<VideoMetadata> {
        match self {
            Strategy::GlobalState => from_global_state(page),
            Strategy::Hydration => from_hydration(page),
            Strategy::LinkedData => from_linked_data(page),
            Strategy::OpenGraph => from_open_graph(page),
        }
    }
}

/// The record produced for a page and the strategy that produced it.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub metadata: VideoMetadata,
    /// `None` when every strategy came up empty
    pub strategy: Option<Strategy>,
}

/// Metadata extraction engine for video pages
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    strategies: Vec<Strategy>,
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self {
            strategies: Strategy::CASCADE.to_vec(),
        }
    }
}

impl MetadataExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict or reorder the strategies tried
    pub fn with_strategies(strategies: impl IntoIterator<Item = Strategy>) -> Self {
        Self {
            strategies: strategies.into_iter().collect(),
        }
    }

    /// Extract one record from a captured page.
    ///
    /// Never fails: a page nothing can be read from yields an empty record,
    /// and callers stamp the requested URL onto it.
    pub fn extract(&self, doc: &PageDocument) -> VideoMetadata {
        self.run(doc).metadata
    }

    pub fn run(&self, doc: &PageDocument) -> Extraction {
        let page = doc.parse();
        for strategy in &self.strategies {
            if let Some(metadata) = strategy.apply(&page) {
                debug!("Extracted {} via {}", doc.url, strategy.name());
                return Extraction {
                    metadata,
                    strategy: Some(*strategy),
                };
            }
        }

        debug!("No extraction strategy matched {}", doc.url);
        Extraction {
            metadata: VideoMetadata::default(),
            strategy: None,
        }
    }
}

fn from_global_state(page: &ParsedPage<'_>) -> Option<VideoMetadata> {
    let parsed;
    let state = match page.doc.global_state.as_ref() {
        Some(state) => state,
        None => {
            parsed = page
                .first_text(&STATE_SCRIPT_SELECTORS)
                .and_then(|text| parse_state_script(&text))?;
            &parsed
        }
    };

    let item = first_item(state)?;
    Some(metadata_from_item(item, user_registry(state), page))
}

fn from_hydration(page: &ParsedPage<'_>) -> Option<VideoMetadata> {
    let item = next_data_item(page).or_else(|| universal_data_item(page))?;
    Some(metadata_from_item(&item, None, page))
}

fn script_json(page: &ParsedPage<'_>, selector: &str) -> Option<Value> {
    let text = page.first_text(&[selector])?;
    serde_json::from_str(text.trim()).ok()
}

fn next_data_item(page: &ParsedPage<'_>) -> Option<Value> {
    let next = script_json(page, NEXT_DATA_SELECTOR)?;
    let props = next.pointer("/props/pageProps")?;
    props
        .pointer("/itemInfo/itemStruct")
        .filter(|item| item.is_object())
        .or_else(|| props.pointer("/videoData/itemInfos"))
        .filter(|item| item.is_object())
        .cloned()
}

fn universal_data_item(page: &ParsedPage<'_>) -> Option<Value> {
    let data = script_json(page, UNIVERSAL_DATA_SELECTOR)?;
    data.pointer("/__DEFAULT_SCOPE__/webapp.video-detail/itemInfo/itemStruct")
        .filter(|item| item.is_object())
        .cloned()
}

/// Last resort: populates only `text` and `downloadUrl`.
fn from_open_graph(page: &ParsedPage<'_>) -> Option<VideoMetadata> {
    let title = page.meta_property("og:title");
    let description = page.meta_name("description");
    let video = page
        .meta_property("og:video")
        .or_else(|| page.meta_property("og:video:secure_url"));

    if title.is_none() && description.is_none() && video.is_none() {
        return None;
    }

    Some(VideoMetadata {
        web_video_url: page.doc.url.clone(),
        text: Some(description.or(title).unwrap_or_default()),
        download_url: Some(video.unwrap_or_default()),
        ..VideoMetadata::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const URL: &str = "https://www.tiktok.com/@creator/video/7301";

    const OG_TAGS: &str = r#"
        <meta property="og:title" content="og title">
        <meta name="description" content="og description">
        <meta property="og:video" content="https://cdn/og.mp4">"#;

    fn page(head: &str) -> PageDocument {
        PageDocument::new(URL, format!("<html><head>{}</head><body></body></html>", head))
    }

    fn state() -> Value {
        json!({
            "ItemModule": {
                "7301": { "desc": "state caption", "author": "creator", "stats": { "playCount": 5 } }
            },
            "UserModule": { "users": { "creator": { "avatarThumb": "https://cdn/a.jpg" } } }
        })
    }

    #[test]
    fn test_global_state_beats_open_graph() {
        let doc = page(OG_TAGS).with_global_state(state());
        let extraction = MetadataExtractor::new().run(&doc);

        assert_eq!(extraction.strategy, Some(Strategy::GlobalState));
        assert_eq!(extraction.metadata.text.as_deref(), Some("state caption"));
        assert_eq!(extraction.metadata.play_count, Some(5));
        assert_eq!(extraction.metadata.author_avatar.as_deref(), Some("https://cdn/a.jpg"));
    }

    #[test]
    fn test_state_script_with_assignment_prefix() {
        let script = format!(
            r#"<script id="SIGI_STATE">window['SIGI_STATE'] = {};</script>{}"#,
            state(),
            OG_TAGS
        );
        let extraction = MetadataExtractor::new().run(&page(&script));
        assert_eq!(extraction.strategy, Some(Strategy::GlobalState));
        assert_eq!(extraction.metadata.text.as_deref(), Some("state caption"));
    }

    #[test]
    fn test_state_without_items_falls_through() {
        let doc = page(OG_TAGS).with_global_state(json!({ "AppContext": {} }));
        let extraction = MetadataExtractor::new().run(&doc);
        assert_eq!(extraction.strategy, Some(Strategy::OpenGraph));
    }

    #[test]
    fn test_next_data_item_struct() {
        let next = json!({ "props": { "pageProps": { "itemInfo": { "itemStruct": { "desc": "next caption" } } } } });
        let head = format!(r#"<script id="__NEXT_DATA__" type="application/json">{}</script>"#, next);
        let extraction = MetadataExtractor::new().run(&page(&head));
        assert_eq!(extraction.strategy, Some(Strategy::Hydration));
        assert_eq!(extraction.metadata.text.as_deref(), Some("next caption"));
        assert_eq!(extraction.metadata.web_video_url, URL);
    }

    #[test]
    fn test_next_data_legacy_path() {
        let next = json!({ "props": { "pageProps": { "videoData": { "itemInfos": { "title": "legacy" } } } } });
        let head = format!(r#"<script id="__NEXT_DATA__" type="application/json">{}</script>"#, next);
        let meta = MetadataExtractor::new().extract(&page(&head));
        assert_eq!(meta.text.as_deref(), Some("legacy"));
    }

    #[test]
    fn test_universal_rehydration_data() {
        let data = json!({
            "__DEFAULT_SCOPE__": {
                "webapp.video-detail": { "itemInfo": { "itemStruct": { "desc": "universal caption" } } }
            }
        });
        let head = format!(
            r#"<script id="__UNIVERSAL_DATA_FOR_REHYDRATION__" type="application/json">{}</script>"#,
            data
        );
        let extraction = MetadataExtractor::new().run(&page(&head));
        assert_eq!(extraction.strategy, Some(Strategy::Hydration));
        assert_eq!(extraction.metadata.text.as_deref(), Some("universal caption"));
    }

    #[test]
    fn test_broken_hydration_falls_through_to_linked_data() {
        let head = r#"
            <script id="__NEXT_DATA__">{ broken</script>
            <script type="application/ld+json">{ "@type": "VideoObject", "name": "ld name" }</script>"#;
        let extraction = MetadataExtractor::new().run(&page(head));
        assert_eq!(extraction.strategy, Some(Strategy::LinkedData));
        assert_eq!(extraction.metadata.text.as_deref(), Some("ld name"));
    }

    #[test]
    fn test_open_graph_fallback() {
        let extraction = MetadataExtractor::new().run(&page(OG_TAGS));
        assert_eq!(extraction.strategy, Some(Strategy::OpenGraph));
        let meta = extraction.metadata;
        assert_eq!(meta.text.as_deref(), Some("og description"));
        assert_eq!(meta.download_url.as_deref(), Some("https://cdn/og.mp4"));
        assert_eq!(meta.digg_count, None);
        assert_eq!(meta.author_name, None);
    }

    #[test]
    fn test_open_graph_secure_video_and_title() {
        let head = r#"
            <meta property="og:title" content="only title">
            <meta property="og:video:secure_url" content="https://cdn/secure.mp4">"#;
        let meta = MetadataExtractor::new().extract(&page(head));
        assert_eq!(meta.text.as_deref(), Some("only title"));
        assert_eq!(meta.download_url.as_deref(), Some("https://cdn/secure.mp4"));
    }

    #[test]
    fn test_empty_page_yields_empty_record() {
        let extraction = MetadataExtractor::new().run(&page(""));
        assert_eq!(extraction.strategy, None);
        assert_eq!(extraction.metadata, VideoMetadata::default());
        assert_eq!(
            extraction.metadata.with_fallback_url(URL),
            VideoMetadata::sentinel(URL)
        );
    }

    #[test]
    fn test_restricted_strategies() {
        let doc = page(OG_TAGS).with_global_state(state());
        let extractor = MetadataExtractor::with_strategies([Strategy::OpenGraph]);
        assert_eq!(extractor.run(&doc).strategy, Some(Strategy::OpenGraph));
    }
}
