use crate::core::{ChannelRef, FetchError, VideoDetails};
use anyhow::Result;
use async_trait::async_trait;

/// A source of channel listings and per-video metadata.
///
/// Implementations are shared across concurrent fetches, so both operations
/// take `&self`.
#[async_trait]
pub trait Extractor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Video ids of a channel in listing order, without per-video detail.
    async fn list_channel(&self, channel: &ChannelRef) -> Result<Vec<String>>;

    /// Full metadata for one video.
    async fn fetch_video(&self, video_id: &str) -> Result<VideoDetails, FetchError>;
}
