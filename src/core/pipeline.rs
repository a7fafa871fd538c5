use crate::config::Config;
use crate::core::{aggregate, list_videos, write_csv, Executor, Extractor, FetchFailure, Fetcher, Summary};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Result of a completed run.
#[derive(Debug)]
pub struct RunReport {
    pub summary: Summary,
    pub failures: Vec<FetchFailure>,
}

/// List, fetch, sort, annotate and write. Only listing and writing errors
/// abort the run; per-video failures are reported in [`RunReport::failures`].
pub async fn run(config: &Config, extractor: Arc<dyn Extractor>) -> Result<RunReport> {
    let channel = config.channel_ref()?;
    let output_path = config.output_path_for(&channel);

    let video_ids = list_videos(extractor.as_ref(), &channel).await?;
    println!("Found {} videos.", video_ids.len());

    let fetcher = Fetcher::new(extractor, config.throttle(), config.timeout());
    let mut executor = Executor::new(config.worker_count);
    if !config.show_progress {
        executor = executor.quiet();
    }
    let harvest = executor.run(&fetcher, &video_ids).await;

    let rows = aggregate(harvest.records);
    write_csv(&output_path, &rows).await?;
    info!("Collection finished for {}", channel);

    Ok(RunReport {
        summary: Summary::new(&rows, &output_path, harvest.failures.len()),
        failures: harvest.failures,
    })
}
