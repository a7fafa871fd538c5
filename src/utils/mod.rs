use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

pub const WATCH_URL_BASE: &str = "https://www.youtube.com/watch?v=";

/// Canonical watch-page URL for a video id.
pub fn watch_url(video_id: &str) -> String {
    format!("{}{}", WATCH_URL_BASE, video_id)
}

pub fn sanitize_filename(filename: &str) -> String {
    // Remove or replace characters that are invalid in filenames
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' => '_',
            '/' | '\\' => '-',
            c if c.is_control() || c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}

/// Finds the first JSON object assigned to `marker` in a page, e.g.
/// `var ytInitialData = {...};` or `"ytInitialPlayerResponse":{...}`.
///
/// The object is read with a streaming deserializer, so whatever follows the
/// closing brace is never looked at.
pub fn extract_json_after(html: &str, marker: &str) -> Option<Value> {
    html.match_indices(marker).find_map(|(at, _)| {
        let rest = html[at + marker.len()..].trim_start_matches(|c: char| {
            c == '"' || c == '\'' || c == ']' || c == '=' || c == ':' || c.is_whitespace()
        });
        if !rest.starts_with('{') {
            return None;
        }
        match serde_json::Deserializer::from_str(rest).into_iter::<Value>().next()? {
            Ok(value) if value.is_object() => Some(value),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("Skipping malformed {} candidate: {}", marker, e);
                None
            }
        }
    })
}

/// Reads a YouTube text node, either `{"simpleText": ..}` or `{"runs": [{"text": ..}]}`.
pub fn text_of(value: &Value) -> Option<String> {
    if let Some(text) = value.get("simpleText").and_then(|v| v.as_str()) {
        return Some(text.to_string());
    }
    if let Some(text) = value.get("content").and_then(|v| v.as_str()) {
        return Some(text.to_string());
    }
    let runs = value.get("runs")?.as_array()?;
    let joined: String = runs
        .iter()
        .filter_map(|run| run.get("text").and_then(|v| v.as_str()))
        .collect();
    (!joined.is_empty()).then_some(joined)
}

/// Depth-first search for the first value stored under `key`.
pub fn find_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map
            .get(key)
            .or_else(|| map.values().find_map(|v| find_key(v, key))),
        Value::Array(items) => items.iter().find_map(|v| find_key(v, key)),
        _ => None,
    }
}

fn count_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d[\d,.]*)\s*([KkMmBb])?\b").expect("count regex is valid"))
}

/// Parses a human-readable count such as `1,234`, `1.2K`, `3M` or
/// `12 comments`.
pub fn parse_count(text: &str) -> Option<u64> {
    let captures = count_regex().captures(text)?;
    let number = captures.get(1)?.as_str().trim_end_matches(['.', ',']);
    let multiplier = match captures.get(2).map(|m| m.as_str()) {
        Some("K") | Some("k") => 1_000.0,
        Some("M") | Some("m") => 1_000_000.0,
        Some("B") | Some("b") => 1_000_000_000.0,
        _ => {
            let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
            return digits.parse().ok();
        }
    };
    let value: f64 = number.replace(',', "").parse().ok()?;
    Some((value * multiplier).round() as u64)
}

/// Formats an integer with `,` thousands separators.
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
