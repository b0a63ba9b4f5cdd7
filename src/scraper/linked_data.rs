//! `application/ld+json` structured data.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use serde_json::Value;

use crate::domain::VideoMetadata;
use crate::scraper::document::ParsedPage;
use crate::scraper::item::{as_count, as_number, first_str};

const LD_JSON_SELECTOR: &str = r#"script[type="application/ld+json"]"#;

fn iso_duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^P(?:(\d+(?:\.\d+)?)D)?(?:T(?:(\d+(?:\.\d+)?)H)?(?:(\d+(?:\.\d+)?)M)?(?:(\d+(?:\.\d+)?)S)?)?$",
        )
        .expect("valid duration regex")
    })
}

/// Build a record from the first structured-data object typed as a video.
pub(crate) fn from_linked_data(page: &ParsedPage<'_>) -> Option<VideoMetadata> {
    let mut nodes = Vec::new();
    for script in page.texts(LD_JSON_SELECTOR) {
        if let Ok(value) = serde_json::from_str::<Value>(script.trim()) {
            collect_nodes(value, &mut nodes);
        }
    }
    let video = nodes.iter().find(|node| is_video_node(node))?;

    let mut meta = VideoMetadata {
        web_video_url: page.doc.url.clone(),
        text: Some(
            first_str(Some(video), &["description", "name"])
                .unwrap_or_default()
                .to_string(),
        ),
        duration: video.get("duration").and_then(duration_seconds),
        create_time_iso: video
            .get("uploadDate")
            .and_then(Value::as_str)
            .and_then(parse_upload_date),
        author_name: Some(author_name(video.get("author"))),
        download_url: Some(
            first_str(Some(video), &["contentUrl", "embedUrl"])
                .unwrap_or_default()
                .to_string(),
        ),
        ..VideoMetadata::default()
    };

    if let Some(stats) = video.get("interactionStatistic").and_then(Value::as_array) {
        for stat in stats {
            apply_interaction(stat, &mut meta);
        }
    }

    Some(meta)
}

/// Flatten top-level arrays and `@graph` containers into candidate nodes
fn collect_nodes(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_nodes(item, out);
            }
        }
        Value::Object(mut obj) => {
            let graph = obj.remove("@graph");
            out.push(Value::Object(obj));
            if let Some(graph) = graph {
                collect_nodes(graph, out);
            }
        }
        _ => {}
    }
}

fn is_video_node(node: &Value) -> bool {
    let label = match node.get("@type") {
        None | Some(Value::Null) => return false,
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(types)) => types
            .iter()
            .map(|t| t.as_str().map(String::from).unwrap_or_else(|| t.to_string()))
            .collect::<Vec<_>>()
            .join(","),
        Some(other) => other.to_string(),
    };
    label.to_lowercase().contains("video")
}

fn interaction_label(stat: &Value) -> String {
    match stat.get("interactionType") {
        Some(Value::String(s)) => s.clone(),
        Some(kind @ Value::Object(_)) => first_str(Some(kind), &["@type", "name"])
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

fn apply_interaction(stat: &Value, meta: &mut VideoMetadata) {
    let label = interaction_label(stat).to_lowercase();
    if label.is_empty() {
        return;
    }
    let count = stat
        .get("userInteractionCount")
        .and_then(as_count)
        .unwrap_or(0);

    if label.contains("like") {
        meta.digg_count = Some(count);
    }
    if label.contains("comment") {
        meta.comment_count = Some(count);
    }
    if label.contains("share") {
        meta.share_count = Some(count);
    }
    if label.contains("play") || label.contains("view") {
        meta.play_count = Some(count);
    }
}

/// Seconds from a number, a numeric string, or an ISO-8601 duration
fn duration_seconds(value: &Value) -> Option<f64> {
    let seconds = match value {
        Value::String(s) => parse_iso_duration(s).or_else(|| as_number(value)),
        other => as_number(other),
    }?;
    (seconds > 0.0).then_some(seconds)
}

pub(crate) fn parse_iso_duration(raw: &str) -> Option<f64> {
    let caps = iso_duration_regex().captures(raw.trim())?;
    let part = |i: usize| {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(0.0)
    };
    Some(part(1) * 86_400.0 + part(2) * 3_600.0 + part(3) * 60.0 + part(4))
}

/// Normalise an upload date to millisecond ISO-8601 UTC.
///
/// Accepts `+hh:mm` and `+hhmm` offsets and a `T` or space separator.
/// Zone-less timestamps and bare dates are read as UTC.
pub(crate) fn parse_upload_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let parsed = DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|n| n.and_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|n| n.and_utc())
        })?;
    Some(parsed.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn author_name(author: Option<&Value>) -> String {
    match author {
        Some(Value::String(name)) => name.clone(),
        Some(obj @ Value::Object(_)) => first_str(Some(obj), &["name"])
            .unwrap_or_default()
            .to_string(),
        Some(Value::Array(list)) => author_name(list.first()),
        _ => String::new(),
    }
}
