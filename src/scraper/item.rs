//! Turning a raw item record (from global state or hydration data) into a
//! [`VideoMetadata`].
//!
//! Item records change shape without notice; every lookup here is optional
//! and falls back to a default.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::domain::VideoMetadata;
use crate::scraper::document::ParsedPage;

/// Largest magnitude a JavaScript `Date` accepts, in milliseconds
const MAX_DATE_MILLIS: f64 = 8.64e15;

pub(crate) fn metadata_from_item(
    item: &Value,
    users: Option<&Value>,
    page: &ParsedPage<'_>,
) -> VideoMetadata {
    let stats = item.get("stats");
    let stats_v2 = item.get("statsV2");
    let video = item.get("video");
    let music = item.get("music");
    let author_name = author_name(item);

    VideoMetadata {
        web_video_url: page.doc.url.clone(),
        text: Some(first_str(Some(item), &["desc", "title"]).unwrap_or_default().to_string()),
        digg_count: Some(counter(stats, stats_v2, "diggCount")),
        share_count: Some(counter(stats, stats_v2, "shareCount")),
        play_count: Some(counter(stats, stats_v2, "playCount")),
        comment_count: Some(counter(stats, stats_v2, "commentCount")),
        collect_count: Some(counter(stats, stats_v2, "collectCount")),
        duration: video_duration(video),
        music_name: Some(first_str(music, &["title", "musicName"]).unwrap_or_default().to_string()),
        music_author: Some(
            first_str(music, &["authorName", "musicAuthor"])
                .unwrap_or_default()
                .to_string(),
        ),
        music_original: Some(music_original(music)),
        author_avatar: Some(author_avatar(item, users, &author_name)),
        author_name: Some(author_name),
        create_time_iso: item.get("createTime").and_then(iso_from_unix_seconds),
        download_url: Some(
            download_url(video)
                .or_else(|| page.video_src())
                .unwrap_or_default(),
        ),
    }
}

pub(crate) fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value?.as_str().filter(|s| !s.is_empty())
}

/// First non-empty string among `keys` of `obj`
pub(crate) fn first_str<'a>(obj: Option<&'a Value>, keys: &[&str]) -> Option<&'a str> {
    let obj = obj?;
    keys.iter().find_map(|key| non_empty_str(obj.get(*key)))
}

/// Numeric value of a JSON number or numeric string
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

pub(crate) fn as_count(value: &Value) -> Option<u64> {
    as_number(value)
        .filter(|n| *n >= 0.0)
        .map(|n| n.trunc() as u64)
}

/// JavaScript truthiness
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn counter(stats: Option<&Value>, stats_v2: Option<&Value>, key: &str) -> u64 {
    [stats, stats_v2]
        .into_iter()
        .flatten()
        .filter_map(|s| s.get(key))
        .filter_map(as_count)
        .find(|n| *n > 0)
        .unwrap_or(0)
}

fn video_duration(video: Option<&Value>) -> Option<f64> {
    let video = video?;
    [
        video.get("duration"),
        video.get("videoMeta").and_then(|m| m.get("duration")),
    ]
    .into_iter()
    .flatten()
    .filter_map(as_number)
    .find(|d| *d > 0.0)
}

fn music_original(music: Option<&Value>) -> bool {
    let Some(music) = music else {
        return false;
    };
    music
        .get("original")
        .filter(|v| !v.is_null())
        .or_else(|| music.get("musicOriginal"))
        .is_some_and(is_truthy)
}

fn author_name(item: &Value) -> String {
    match item.get("author") {
        Some(Value::String(name)) if !name.is_empty() => name.clone(),
        Some(author @ Value::Object(_)) => first_str(Some(author), &["uniqueId", "nickname"])
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

/// Best-effort avatar lookup.
///
/// Tries the registry entry keyed by the author name, then the item's own
/// author object, then whichever registry entry comes first. The last step
/// can attribute another user's avatar.
fn author_avatar(item: &Value, users: Option<&Value>, name: &str) -> String {
    let by_name = users
        .filter(|_| !name.is_empty())
        .and_then(|u| u.get(name))
        .filter(|u| u.is_object());
    let own = item.get("author").filter(|a| a.is_object());
    let any = users
        .and_then(Value::as_object)
        .and_then(|registry| registry.values().find(|u| u.is_object()));

    by_name
        .or(own)
        .or(any)
        .and_then(|user| first_str(Some(user), &["avatarLarger", "avatarThumb", "avatarMedium"]))
        .unwrap_or_default()
        .to_string()
}

/// Unix seconds to millisecond-precision ISO-8601 UTC.
///
/// Falsy, non-numeric or out-of-range inputs yield `None`.
pub(crate) fn iso_from_unix_seconds(value: &Value) -> Option<String> {
    if !is_truthy(value) {
        return None;
    }
    let millis = as_number(value)? * 1000.0;
    if !millis.is_finite() || millis.abs() > MAX_DATE_MILLIS {
        return None;
    }
    let created = DateTime::<Utc>::from_timestamp_millis(millis.trunc() as i64)?;
    Some(created.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Direct download address, then play address, then the first bitrate variant
fn download_url(video: Option<&Value>) -> Option<String> {
    let video = video?;
    let first_variant = video
        .get("bitrateInfo")
        .and_then(Value::as_array)
        .and_then(|variants| variants.first());

    [
        video.get("downloadAddr"),
        video.get("playAddr"),
        first_variant.and_then(|v| v.get("PlayAddr")),
        first_variant.and_then(|v| v.get("playAddr")),
    ]
    .into_iter()
    .flatten()
    .find_map(pick_url)
}

/// A URL from a plain string, a list, or an object holding a URL list
fn pick_url(value: &Value) -> Option<String> {
    let url = match value {
        Value::String(s) => Some(s.as_str()),
        Value::Array(list) => list.first().and_then(Value::as_str),
        Value::Object(obj) => ["UrlList", "url_list"]
            .iter()
            .filter_map(|key| obj.get(*key))
            .filter_map(Value::as_array)
            .find_map(|list| list.first().and_then(Value::as_str).filter(|s| !s.is_empty())),
        _ => None,
    };
    url.filter(|s| !s.is_empty()).map(String::from)
}
