//! One complete merge run: fetch every source, merge, write the guide

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::errors::AppResult;
use crate::merge::{EpgMerger, MergeObserver, MergeStats, TracingObserver};
use crate::output::save_document;
use crate::utils::{DocumentFetcher, StandardHttpClient};

/// Run with the reqwest client and progress logged through `tracing`
pub async fn run(config: &Config) -> AppResult<MergeStats> {
    let fetcher: Arc<dyn DocumentFetcher> = Arc::new(StandardHttpClient::new(&config.http)?);
    run_with(config, fetcher, Arc::new(TracingObserver)).await
}

/// Run against an explicit fetcher and observer.
///
/// Source failures only show up in the returned stats; an error here means the
/// guide could not be written.
pub async fn run_with(
    config: &Config,
    fetcher: Arc<dyn DocumentFetcher>,
    observer: Arc<dyn MergeObserver>,
) -> AppResult<MergeStats> {
    let merger = EpgMerger::from_config(fetcher, config).with_observer(observer);
    let outcome = merger.merge(&config.sources).await;

    if outcome.stats.all_failed() {
        warn!("No source could be processed, writing an empty guide");
    }

    let root = outcome.document.into_element();
    save_document(&root, &config.output.path).await?;
    info!("EPG saved to: {}", config.output.path.display());

    Ok(outcome.stats)
}
