use crate::core::{ChannelRef, Throttle};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CHANNEL: &str = "https://www.youtube.com/@MrBeast/videos";

/// Where video metadata comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// Scrape youtube.com directly
    #[default]
    Native,
    /// Shell out to the yt-dlp binary
    YtDlp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub channel: String,
    pub worker_count: usize,
    /// Defaults to `data/raw/videos_<channel>.csv`.
    pub output_path: Option<PathBuf>,
    pub timeout_secs: u64,
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    pub backend: Backend,
    pub ytdlp_path: String,
    pub user_agent: String,
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channel: DEFAULT_CHANNEL.to_string(),
            worker_count: 10,
            output_path: None,
            timeout_secs: 60,
            delay_min_ms: 1500,
            delay_max_ms: 3500,
            backend: Backend::Native,
            ytdlp_path: "yt-dlp".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            show_progress: true,
        }
    }
}

impl Config {
    /// Defaults, overlaid with the TOML file at `path` if one is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.worker_count == 0 {
            anyhow::bail!("worker_count must be at least 1");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be at least 1");
        }
        if self.delay_min_ms > self.delay_max_ms {
            anyhow::bail!(
                "delay_min_ms ({}) is greater than delay_max_ms ({})",
                self.delay_min_ms,
                self.delay_max_ms
            );
        }
        self.channel_ref()?;
        Ok(())
    }

    pub fn channel_ref(&self) -> anyhow::Result<ChannelRef> {
        ChannelRef::parse(&self.channel)
    }

    pub fn output_path_for(&self, channel: &ChannelRef) -> PathBuf {
        self.output_path.clone().unwrap_or_else(|| {
            PathBuf::from("data")
                .join("raw")
                .join(format!("videos_{}.csv", channel.slug()))
        })
    }

    pub fn throttle(&self) -> Throttle {
        Throttle::new(
            Duration::from_millis(self.delay_min_ms),
            Duration::from_millis(self.delay_max_ms),
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
