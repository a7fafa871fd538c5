use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use yt_channel_stats::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting yt-channel-stats v{}", env!("CARGO_PKG_VERSION"));

    cli.run().await?;

    Ok(())
}
