use crate::core::Extractor;
use crate::utils::sanitize_filename;
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::info;
use url::Url;

fn ucid_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^UC(?-u:[\w-]){22}$").expect("UCID regex is valid"))
}

fn handle_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\w.-]{3,30}$").expect("handle regex is valid"))
}

/// A YouTube channel, as named on the command line or in the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    /// `@handle`, stored without the `@`.
    Handle(String),
    /// `UC...` channel id.
    Id(String),
    /// Legacy `/c/<name>` URL.
    Custom(String),
    /// Legacy `/user/<name>` URL.
    User(String),
}

impl ChannelRef {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            anyhow::bail!("Channel reference is empty");
        }

        if input.starts_with("http://") || input.starts_with("https://") {
            return Self::from_url(&Url::parse(input)?);
        }

        if let Some(handle) = input.strip_prefix('@') {
            if handle_regex().is_match(handle) {
                return Ok(Self::Handle(handle.to_string()));
            }
        } else if ucid_regex().is_match(input) {
            return Ok(Self::Id(input.to_string()));
        } else if handle_regex().is_match(input) {
            return Ok(Self::Handle(input.to_string()));
        }

        anyhow::bail!("Not a channel URL, @handle or channel id: {}", input)
    }

    fn from_url(url: &Url) -> Result<Self> {
        let host = url.host_str().unwrap_or_default();
        if host != "youtube.com" && !host.ends_with(".youtube.com") {
            anyhow::bail!("Not a YouTube channel URL: {}", url);
        }

        let segments: Vec<String> = url
            .path_segments()
            .map(|segments| {
                segments
                    .filter(|s| !s.is_empty())
                    .map(|s| {
                        urlencoding::decode(s)
                            .map(|decoded| decoded.into_owned())
                            .unwrap_or_else(|_| s.to_string())
                    })
                    .collect()
            })
            .unwrap_or_default();

        let name = segments.get(1).cloned();
        match (segments.first().map(String::as_str), name) {
            (Some(first), _) if first.starts_with('@') && first.len() > 1 => {
                Ok(Self::Handle(first[1..].to_string()))
            }
            (Some("channel"), Some(id)) => Ok(Self::Id(id)),
            (Some("c"), Some(name)) => Ok(Self::Custom(name)),
            (Some("user"), Some(name)) => Ok(Self::User(name)),
            _ => anyhow::bail!("Could not find a channel in URL: {}", url),
        }
    }

    /// Path of the channel page relative to the site root, e.g. `/@MrBeast`.
    pub fn path(&self) -> String {
        match self {
            Self::Handle(handle) => format!("/@{}", handle),
            Self::Id(id) => format!("/channel/{}", id),
            Self::Custom(name) => format!("/c/{}", name),
            Self::User(name) => format!("/user/{}", name),
        }
    }

    /// The channel's videos tab under `base` (no trailing slash).
    pub fn videos_url(&self, base: &str) -> String {
        format!("{}{}/videos", base.trim_end_matches('/'), self.path())
    }

    /// Lowercase file-name-safe name used for the default output file.
    pub fn slug(&self) -> String {
        let raw = match self {
            Self::Handle(name) | Self::Id(name) | Self::Custom(name) | Self::User(name) => name,
        };
        sanitize_filename(&raw.to_lowercase())
    }
}

impl FromStr for ChannelRef {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handle(handle) => write!(f, "@{}", handle),
            _ => write!(f, "{}", self.path()),
        }
    }
}

/// Flat listing of a channel's videos. Any failure here is fatal for the run.
pub async fn list_videos(extractor: &dyn Extractor, channel: &ChannelRef) -> Result<Vec<String>> {
    info!("Listing videos of {} via {}", channel, extractor.name());

    let ids = extractor
        .list_channel(channel)
        .await
        .with_context(|| format!("Failed to list videos of channel {}", channel))?;

    let mut seen = HashSet::new();
    let ids: Vec<String> = ids
        .into_iter()
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .collect();

    info!("Found {} videos", ids.len());
    Ok(ids)
}
