use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iptv_scraper::{config::Config, services::ScrapeJob};

#[derive(Parser)]
#[command(name = "iptv-scraper")]
#[command(version)]
#[command(about = "Scrapes a live channel directory into numbered M3U and JSON playlists")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Maximum concurrent player page fetches (overrides config file)
    #[arg(short = 'j', long, value_name = "N")]
    concurrency: Option<usize>,

    /// Directory for the channel map and playlists (overrides config file)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("iptv_scraper={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting scraper job v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(concurrency) = cli.concurrency {
        config.resolution.concurrency_limit = concurrency;
    }
    if let Some(dir) = cli.output_dir {
        config.storage.relocate(&dir);
    }

    let job = ScrapeJob::new(config)?;
    let summary = job.run().await?;

    info!(
        "Playlist files created: json={}, m3u={}",
        summary.artifacts.json_written, summary.artifacts.m3u_written
    );
    Ok(())
}
