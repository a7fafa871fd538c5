use crate::utils::watch_url;
use serde::{Deserialize, Serialize, Serializer};

pub const UNKNOWN_YEAR: &str = "Unknown";

/// Column order of the output table.
pub const CSV_HEADERS: [&str; 8] = [
    "video_id",
    "video_title",
    "views",
    "year",
    "link",
    "comments",
    "comment_count",
    "language_detected",
];

/// Per-video metadata as reported by an extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDetails {
    pub title: Option<String>,
    pub view_count: Option<u64>,
    /// `YYYYMMDD`
    pub upload_date: Option<String>,
    pub comment_count: Option<u64>,
}

/// One successfully fetched video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub video_id: String,
    pub video_title: Option<String>,
    pub views: Option<u64>,
    pub year: String,
    pub link: String,
    pub comments: bool,
    pub comment_count: u64,
}

impl VideoRecord {
    pub fn new(video_id: &str, details: VideoDetails) -> Self {
        let comment_count = details.comment_count.unwrap_or(0);
        Self {
            video_id: video_id.to_string(),
            video_title: details.title,
            views: details.view_count,
            year: upload_year(details.upload_date.as_deref()),
            link: watch_url(video_id),
            comments: comment_count > 0,
            comment_count,
        }
    }
}

/// First four characters of the upload date, or `Unknown`.
pub fn upload_year(upload_date: Option<&str>) -> String {
    match upload_date.map(str::trim) {
        Some(date) if !date.is_empty() => date.chars().take(4).collect(),
        _ => UNKNOWN_YEAR.to_string(),
    }
}

/// Normalizes `2021-03-05`, `2021-03-05T10:00:00-07:00` or `20210305` to `YYYYMMDD`.
pub fn normalize_upload_date(raw: &str) -> Option<String> {
    let digits: String = raw
        .chars()
        .take_while(|c| *c != 'T' && *c != ' ')
        .filter(|c| c.is_ascii_digit())
        .collect();
    (digits.len() == 8).then_some(digits)
}

/// A record annotated with its title language; the shape written to CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoRow {
    pub video_id: String,
    pub video_title: Option<String>,
    pub views: Option<u64>,
    pub year: String,
    pub link: String,
    #[serde(serialize_with = "serialize_flag")]
    pub comments: bool,
    pub comment_count: u64,
    pub language_detected: String,
}

impl VideoRow {
    pub fn new(record: VideoRecord, language: &str) -> Self {
        Self {
            video_id: record.video_id,
            video_title: record.video_title,
            views: record.views,
            year: record.year,
            link: record.link,
            comments: record.comments,
            comment_count: record.comment_count,
            language_detected: language.to_string(),
        }
    }
}

// Spreadsheet tools read `True`/`False` as booleans.
fn serialize_flag<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *flag { "True" } else { "False" })
}
