pub mod aggregate;
pub mod channel;
pub mod error;
pub mod executor;
pub mod extractor;
pub mod fetcher;
pub mod language;
pub mod metadata;
pub mod pipeline;
pub mod report;

pub use aggregate::{aggregate, compare_records, to_csv_bytes, write_csv};
pub use channel::{list_videos, ChannelRef};
pub use error::FetchError;
pub use executor::{Executor, Harvest};
pub use extractor::Extractor;
pub use fetcher::{FetchFailure, FetchOutcome, Fetcher, Throttle};
pub use language::detect_language;
pub use metadata::{VideoDetails, VideoRecord, VideoRow, CSV_HEADERS, UNKNOWN_YEAR};
pub use pipeline::{run, RunReport};
pub use report::Summary;
