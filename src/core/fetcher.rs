use crate::core::{Extractor, FetchError, VideoRecord};
use crate::utils::watch_url;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Random pause applied after each successful fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    pub min: Duration,
    pub max: Duration,
}

impl Throttle {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Uniform in `[min, max]`.
    pub fn next_delay(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..=self.max)
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500), Duration::from_millis(3500))
    }
}

#[derive(Debug)]
pub struct FetchFailure {
    pub video_id: String,
    pub url: String,
    pub reason: FetchError,
}

#[derive(Debug)]
pub enum FetchOutcome {
    Fetched(VideoRecord),
    Failed(FetchFailure),
}

/// Fetches one video at a time through a shared extractor.
pub struct Fetcher {
    extractor: Arc<dyn Extractor>,
    throttle: Throttle,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(extractor: Arc<dyn Extractor>, throttle: Throttle, timeout: Duration) -> Self {
        Self {
            extractor,
            throttle,
            timeout,
        }
    }

    pub async fn fetch(&self, video_id: &str) -> FetchOutcome {
        let url = watch_url(video_id);

        let result = match tokio::time::timeout(self.timeout, self.extractor.fetch_video(video_id)).await
        {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        };

        match result {
            Ok(details) => {
                let record = VideoRecord::new(video_id, details);
                let delay = self.throttle.next_delay();
                if !delay.is_zero() {
                    debug!("Fetched {}, sleeping {:?}", video_id, delay);
                    tokio::time::sleep(delay).await;
                }
                FetchOutcome::Fetched(record)
            }
            Err(reason) => {
                error!("Error processing {}: {}", url, reason);
                FetchOutcome::Failed(FetchFailure {
                    video_id: video_id.to_string(),
                    url,
                    reason,
                })
            }
        }
    }
}
