use crate::config::{Backend, Config};
use crate::core::run;
use crate::extractors::build_extractor;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "yt-channel-stats")]
#[command(about = "Collect per-video statistics of a YouTube channel into a CSV file")]
#[command(version)]
pub struct Cli {
    /// Channel URL, @handle or channel id
    #[arg(value_name = "CHANNEL")]
    pub channel: Option<String>,

    /// TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output CSV path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of videos fetched concurrently
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Per-video timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Metadata backend
    #[arg(short, long, value_enum)]
    pub backend: Option<Backend>,

    /// Path to the yt-dlp binary
    #[arg(long)]
    pub ytdlp_path: Option<String>,

    /// Skip the random pause after each video
    #[arg(long)]
    pub no_delay: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Config file values with command-line flags applied on top.
    pub fn config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;

        if let Some(channel) = &self.channel {
            config.channel = channel.clone();
        }
        if let Some(output) = &self.output {
            config.output_path = Some(output.clone());
        }
        if let Some(workers) = self.workers {
            config.worker_count = workers;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(path) = &self.ytdlp_path {
            config.ytdlp_path = path.clone();
        }
        if self.no_delay {
            config.delay_min_ms = 0;
            config.delay_max_ms = 0;
        }

        config.validate()?;
        Ok(config)
    }

    pub async fn run(&self) -> Result<()> {
        let config = self.config()?;

        println!("Starting search for videos...");
        println!("Channel: {}", config.channel);
        println!("Workers: {}", config.worker_count);

        let extractor = build_extractor(&config)?;
        let report = run(&config, extractor).await?;

        println!("\nFull videos download completed.");
        println!("\n{}", report.summary);

        Ok(())
    }
}
