pub mod youtube;
pub mod ytdlp;

pub use youtube::YouTubeExtractor;
pub use ytdlp::YtDlpExtractor;

use crate::config::{Backend, Config};
use crate::core::Extractor;
use anyhow::Result;
use std::sync::Arc;

/// The extractor selected by `config.backend`.
pub fn build_extractor(config: &Config) -> Result<Arc<dyn Extractor>> {
    let extractor: Arc<dyn Extractor> = match config.backend {
        Backend::Native => Arc::new(YouTubeExtractor::new(config)?),
        Backend::YtDlp => Arc::new(YtDlpExtractor::new(config)),
    };
    Ok(extractor)
}
