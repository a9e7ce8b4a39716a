use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use epg_merge::{config::Config, config::defaults::DEFAULT_CONFIG_FILE, runner};

#[derive(Parser)]
#[command(name = "epg-merge")]
#[command(version)]
#[command(about = "Merge several XMLTV EPG sources into one prefixed guide")]
#[command(long_about = None)]
struct Cli {
    /// Sources file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Output file (overrides output.path in the sources file)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("epg_merge={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting EPG Merger v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)
        .with_context(|| format!("Unable to load sources from {}", cli.config.display()))?;

    if let Some(output) = cli.output {
        config.output.path = output;
    }

    let stats = runner::run(&config).await?;
    info!(
        "Finished: {} channels and {} programmes from {}/{} source(s)",
        stats.total_channels,
        stats.total_programmes,
        stats.sources_succeeded,
        stats.total_sources()
    );

    Ok(())
}
