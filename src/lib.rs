pub mod cli;
pub mod config;
pub mod core;
pub mod extractors;
pub mod utils;

pub use crate::config::{Backend, Config};
pub use crate::core::{Extractor, FetchError, Summary, VideoDetails, VideoRecord, VideoRow};
pub use crate::extractors::{YouTubeExtractor, YtDlpExtractor};
