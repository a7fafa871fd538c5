// yt-dlp backend - delegates listing and extraction to the `yt-dlp` binary.
//
// Slower than the native extractor (one process per video) but follows
// YouTube's page changes as soon as yt-dlp does.

use crate::config::Config;
use crate::core::metadata::normalize_upload_date;
use crate::core::{ChannelRef, Extractor, FetchError, VideoDetails};
use crate::extractors::youtube::YOUTUBE_BASE_URL;
use crate::utils::watch_url;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tracing::debug;

pub struct YtDlpExtractor {
    binary: String,
    socket_timeout: u64,
}

impl YtDlpExtractor {
    pub fn new(config: &Config) -> Self {
        Self {
            binary: config.ytdlp_path.clone(),
            socket_timeout: config.timeout_secs,
        }
    }

    fn base_args(&self) -> Vec<String> {
        vec![
            "-J".to_string(),
            "--skip-download".to_string(),
            "--no-warnings".to_string(),
            "--quiet".to_string(),
            "--socket-timeout".to_string(),
            self.socket_timeout.to_string(),
        ]
    }

    async fn run_json(&self, args: Vec<String>) -> Result<Value, FetchError> {
        debug!("Running {} {}", self.binary, args.join(" "));

        let output = Command::new(&self.binary)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FetchError::Process(format!(
                "{} ({})",
                stderr.trim(),
                output.status
            )));
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }

    /// Ids from `--flat-playlist` output. A channel root lists its tabs as
    /// nested playlists, which are walked in order.
    pub fn parse_flat_listing(listing: &Value) -> Vec<String> {
        let mut ids = Vec::new();
        collect_entries(listing, &mut ids);
        ids
    }

    pub fn parse_video(info: &Value) -> VideoDetails {
        VideoDetails {
            title: info.get("title").and_then(|v| v.as_str()).map(|s| s.to_string()),
            view_count: info.get("view_count").and_then(|v| v.as_u64()),
            upload_date: info
                .get("upload_date")
                .and_then(|v| v.as_str())
                .and_then(normalize_upload_date),
            comment_count: info.get("comment_count").and_then(|v| v.as_u64()),
        }
    }
}

fn collect_entries(playlist: &Value, ids: &mut Vec<String>) {
    let Some(entries) = playlist.get("entries").and_then(|v| v.as_array()) else {
        return;
    };
    for entry in entries {
        if entry.get("entries").is_some() {
            collect_entries(entry, ids);
        } else if let Some(id) = entry.get("id").and_then(|v| v.as_str()) {
            ids.push(id.to_string());
        }
    }
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn list_channel(&self, channel: &ChannelRef) -> Result<Vec<String>> {
        let mut args = self.base_args();
        args.push("--flat-playlist".to_string());
        args.push(channel.videos_url(YOUTUBE_BASE_URL));

        let listing = self
            .run_json(args)
            .await
            .with_context(|| format!("yt-dlp could not list {}", channel))?;
        Ok(Self::parse_flat_listing(&listing))
    }

    async fn fetch_video(&self, video_id: &str) -> Result<VideoDetails, FetchError> {
        let mut args = self.base_args();
        args.push("--no-playlist".to_string());
        args.push(watch_url(video_id));

        let info = self.run_json(args).await?;
        Ok(Self::parse_video(&info))
    }
}
