use crate::core::{FetchFailure, FetchOutcome, Fetcher, VideoRecord};
use futures::stream::{self, StreamExt};
use std::io::Write;
use tracing::info;

/// Everything a fan-out produced, in completion order.
#[derive(Debug, Default)]
pub struct Harvest {
    pub records: Vec<VideoRecord>,
    pub failures: Vec<FetchFailure>,
}

impl Harvest {
    pub fn total(&self) -> usize {
        self.records.len() + self.failures.len()
    }
}

/// Runs the fetcher over a list of ids with bounded concurrency.
pub struct Executor {
    pub worker_count: usize,
    pub show_progress: bool,
}

impl Executor {
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count: worker_count.max(1),
            show_progress: true,
        }
    }

    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub async fn run(&self, fetcher: &Fetcher, video_ids: &[String]) -> Harvest {
        let total = video_ids.len();
        info!(
            "Processing {} videos with {} workers",
            total, self.worker_count
        );

        let mut outcomes = stream::iter(video_ids)
            .map(|id| fetcher.fetch(id))
            .buffer_unordered(self.worker_count);

        let mut harvest = Harvest::default();
        let mut completed = 0;
        while let Some(outcome) = outcomes.next().await {
            completed += 1;
            match outcome {
                FetchOutcome::Fetched(record) => harvest.records.push(record),
                FetchOutcome::Failed(failure) => harvest.failures.push(failure),
            }

            if self.show_progress {
                print!("\rProcessing videos: {}/{}", completed, total);
                let _ = std::io::stdout().flush();
            }
        }

        if self.show_progress && total > 0 {
            println!(); // New line after progress
        }

        info!(
            "Fetched {} videos, dropped {}",
            harvest.records.len(),
            harvest.failures.len()
        );
        harvest
    }
}
