use serde::{Deserialize, Serialize};

/// A candidate video found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoLink {
    pub url: String,
    pub title: String,
}

impl VideoLink {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

/// Normalized metadata for a single video page.
///
/// Every field except `web_video_url` is optional and omitted from the JSON
/// output when unknown, so a record carrying only the URL serializes to
/// `{"webVideoUrl": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub web_video_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub digg_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collect_count: Option<u64>,

    #[serde(rename = "videoMeta.duration", skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    #[serde(rename = "musicMeta.musicName", skip_serializing_if = "Option::is_none")]
    pub music_name: Option<String>,
    #[serde(rename = "musicMeta.musicAuthor", skip_serializing_if = "Option::is_none")]
    pub music_author: Option<String>,
    #[serde(rename = "musicMeta.musicOriginal", skip_serializing_if = "Option::is_none")]
    pub music_original: Option<bool>,

    #[serde(rename = "authorMeta.name", skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(rename = "authorMeta.avatar", skip_serializing_if = "Option::is_none")]
    pub author_avatar: Option<String>,

    #[serde(rename = "createTimeISO", skip_serializing_if = "Option::is_none")]
    pub create_time_iso: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl VideoMetadata {
    /// The "extraction failed, link preserved" record.
    pub fn sentinel(url: impl Into<String>) -> Self {
        Self {
            web_video_url: url.into(),
            ..Default::default()
        }
    }

    /// True when nothing but (at most) the URL is known.
    pub fn is_sentinel(&self) -> bool {
        *self == Self::sentinel(self.web_video_url.clone())
    }

    /// Stamp the requested URL onto records that lack one
    pub fn with_fallback_url(mut self, url: &str) -> Self {
        if self.web_video_url.is_empty() {
            self.web_video_url = url.to_string();
        }
        self
    }
}

/// Ordered result of one explore collection run.
pub type ExploreBatch = Vec<VideoMetadata>;
