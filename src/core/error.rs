use std::time::Duration;
use thiserror::Error;

/// Why a single video could not be fetched. These never abort a run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),

    #[error("video unavailable: {0}")]
    Unavailable(String),

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yt-dlp failed: {0}")]
    Process(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
