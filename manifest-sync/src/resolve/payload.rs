//! Entry payloads: locating and decoding scenario / content pack descriptors.

use serde_json::Value;
use thiserror::Error;

use crate::fetch::FetchError;
use crate::ini::{self, ParseError};
use crate::mode::ManifestKind;

/// Why an entry's payload could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("payload is not UTF-8: {url}")]
    NotUtf8 { url: String },

    #[error("malformed INI payload {url}: {source}")]
    Ini { url: String, source: ParseError },

    #[error("malformed JSON payload {url}: {reason}")]
    Json { url: String, reason: String },

    #[error("payload {url} has no sections")]
    Empty { url: String },
}

/// URL of the descriptor for an entry location.
///
/// A location whose last path segment ends in `.ini` or `.json`, or that
/// carries a query, names the payload directly. Anything else is a
/// directory, dotted names included, and gets the kind's descriptor file
/// appended.
///
/// # Example
///
/// ```
/// use manifest_sync::resolve::payload_url;
/// use manifest_sync::ManifestKind;
///
/// assert_eq!(
///     payload_url("https://example.com/quests/Q1/", ManifestKind::Scenarios),
///     "https://example.com/quests/Q1/scenario.ini"
/// );
/// assert_eq!(
///     payload_url("http://example/s1.json", ManifestKind::Scenarios),
///     "http://example/s1.json"
/// );
/// ```
pub fn payload_url(location: &str, kind: ManifestKind) -> String {
    let location = location.trim();
    let (path, query) = match location.split_once(['?', '#']) {
        Some((path, _)) => (path, true),
        None => (location, false),
    };
    let after_scheme = path.split_once("://").map(|(_, rest)| rest).unwrap_or(path);
    let last_segment = after_scheme
        .split_once('/')
        .map(|(_, p)| p.rsplit('/').next().unwrap_or(""))
        .unwrap_or("");

    if query || is_payload_file(last_segment) {
        location.to_string()
    } else {
        format!("{}/{}", location.trim_end_matches('/'), kind.payload_file())
    }
}

/// Decode a fetched payload into ordered fields.
pub fn decode_payload(
    url: &str,
    body: &[u8],
    kind: ManifestKind,
) -> Result<Vec<(String, String)>, PayloadError> {
    let text = std::str::from_utf8(body).map_err(|_| PayloadError::NotUtf8 {
        url: url.to_string(),
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    if is_json(url) {
        decode_json(url, text, kind)
    } else {
        decode_ini(url, text, kind)
    }
}

fn is_payload_file(segment: &str) -> bool {
    let segment = segment.to_ascii_lowercase();
    segment.ends_with(".ini") || segment.ends_with(".json")
}

fn is_json(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.to_ascii_lowercase().ends_with(".json")
}

fn decode_ini(url: &str, text: &str, kind: ManifestKind) -> Result<Vec<(String, String)>, PayloadError> {
    let doc = ini::parse(text).map_err(|source| PayloadError::Ini {
        url: url.to_string(),
        source,
    })?;

    let section = doc
        .section(kind.payload_section())
        .or_else(|| doc.sections().next())
        .ok_or_else(|| PayloadError::Empty {
            url: url.to_string(),
        })?;

    Ok(section
        .entries()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect())
}

fn decode_json(url: &str, text: &str, kind: ManifestKind) -> Result<Vec<(String, String)>, PayloadError> {
    let value: Value = serde_json::from_str(text).map_err(|e| PayloadError::Json {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let Value::Object(mut object) = value else {
        return Err(PayloadError::Json {
            url: url.to_string(),
            reason: "top-level value is not an object".into(),
        });
    };

    // `{"Quest": {...}}` mirrors the INI layout
    if let Some(Value::Object(inner)) = object.remove(kind.payload_section()) {
        object = inner;
    }

    Ok(object
        .into_iter()
        .filter(|(key, _)| is_writable_key(key))
        .map(|(key, value)| {
            let text = match value {
                Value::Null => String::new(),
                Value::String(s) => s,
                other => other.to_string(),
            };
            (key, normalize_value(&text))
        })
        .collect())
}

/// Whether a key survives an INI write/read cycle unchanged.
pub(crate) fn is_writable_key(key: &str) -> bool {
    !key.is_empty()
        && key.trim() == key
        && !key.contains(['=', ':', '\n', '\r'])
        && !key.starts_with(['[', '#', ';'])
}

/// Trim every line and drop blank ones so the value serializes cleanly.
pub(crate) fn normalize_value(value: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for line in value.lines().map(str::trim).filter(|line| !line.is_empty()) {
        match lines.last_mut() {
            // A continuation line starting with a comment marker would be
            // dropped on read
            Some(previous) if line.starts_with(['#', ';']) => {
                previous.push(' ');
                previous.push_str(line);
            }
            _ => lines.push(line.to_string()),
        }
    }
    lines.join("\n")
}
