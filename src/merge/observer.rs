//! Progress reporting for merge runs

use chrono::Utc;
use tracing::{error, info, warn};

use crate::merge::{FilteredSource, MergeStats, SourceOutcome, SourceReport};
use crate::models::EpgSourceConfig;
use crate::utils::url::UrlUtils;

/// Receives merge progress events; every method defaults to doing nothing
pub trait MergeObserver: Send + Sync {
    fn run_started(&self, _total_sources: usize) {}

    /// `index` is 1-based
    fn source_started(&self, _index: usize, _total: usize, _source: &EpgSourceConfig) {}

    fn source_filtered(
        &self,
        _index: usize,
        _source: &EpgSourceConfig,
        _filtered: &FilteredSource,
    ) {
    }

    fn source_completed(&self, _report: &SourceReport) {}

    fn source_failed(&self, _report: &SourceReport) {}

    fn run_completed(&self, _stats: &MergeStats) {}
}

/// Observer that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl MergeObserver for NoopObserver {}

/// Writes human-readable progress lines through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl MergeObserver for TracingObserver {
    fn run_started(&self, total_sources: usize) {
        info!("Starting EPG merge of {} source(s)", total_sources);
        info!("Time: {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
    }

    fn source_started(&self, index: usize, total: usize, source: &EpgSourceConfig) {
        info!("[{}/{}] Processing: {}", index, total, source.name);
        info!(
            "URL: {} (format: {}, prefix: '{}')",
            UrlUtils::obfuscate_credentials(&source.url),
            source.format,
            source.prefix
        );
    }

    fn source_filtered(&self, _index: usize, source: &EpgSourceConfig, filtered: &FilteredSource) {
        if filtered.wildcard {
            info!(
                "Loaded {} channels (all available)",
                filtered.channel_count()
            );
        } else {
            info!(
                "Found {} channels: [{}]",
                filtered.channel_count(),
                filtered.found_channel_ids.join(", ")
            );
            if let Some(listed) = source.channels.listed_count() {
                let missing = listed.saturating_sub(filtered.channel_count());
                if missing > 0 {
                    warn!(
                        "{} of {} requested channel(s) not present in '{}'",
                        missing, listed, source.name
                    );
                }
            }
        }
        info!("Added {} programmes", filtered.programme_count());
    }

    fn source_completed(&self, report: &SourceReport) {
        info!(
            "Completed '{}' in {:.2?}: {} channels, {} programmes",
            report.name,
            report.elapsed,
            report.channels(),
            report.programmes()
        );
    }

    fn source_failed(&self, report: &SourceReport) {
        if let SourceOutcome::Failed { stage, error } = &report.outcome {
            error!(
                "[{}] Failed to process '{}' during {}: {}",
                report.index, report.name, stage, error
            );
        }
    }

    fn run_completed(&self, stats: &MergeStats) {
        info!("Merge complete");
        info!("Total channels: {}", stats.total_channels);
        info!("Total programmes: {}", stats.total_programmes);
        info!(
            "Sources: {} succeeded, {} failed",
            stats.sources_succeeded, stats.sources_failed
        );
        if stats.all_failed() {
            warn!("Every EPG source failed, the merged guide will be empty");
        }
    }
}
