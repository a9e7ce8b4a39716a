//! Source orchestration
//!
//! Runs every configured source through fetch, decompress, parse and filter, then
//! folds the results into one [`MergedDocument`] in configured order. A source that
//! fails at any stage is reported and skipped; it never aborts the run.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::config::Config;
use crate::config::defaults::{DEFAULT_GENERATOR_NAME, DEFAULT_GENERATOR_URL};
use crate::errors::SourceResult;
use crate::merge::{
    ChannelFilter, FilteredSource, MergeObserver, MergeOutcome, MergeStats, MergedDocument,
    NoopObserver, SourceReport,
};
use crate::models::EpgSourceConfig;
use crate::utils::{CompressionFormat, DecompressionService, DocumentFetcher};
use crate::xmltv::parse_document;

pub struct EpgMerger {
    fetcher: Arc<dyn DocumentFetcher>,
    observer: Arc<dyn MergeObserver>,
    generator_name: String,
    generator_url: String,
}

impl EpgMerger {
    /// Merger with default generator metadata and no progress output
    pub fn new(fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self {
            fetcher,
            observer: Arc::new(NoopObserver),
            generator_name: DEFAULT_GENERATOR_NAME.to_string(),
            generator_url: DEFAULT_GENERATOR_URL.to_string(),
        }
    }

    /// Merger using the generator metadata from the `output` section of a configuration
    pub fn from_config(fetcher: Arc<dyn DocumentFetcher>, config: &Config) -> Self {
        Self::new(fetcher)
            .with_generator(&config.output.generator_name, &config.output.generator_url)
    }

    pub fn with_observer(mut self, observer: Arc<dyn MergeObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_generator<N: Into<String>, U: Into<String>>(mut self, name: N, url: U) -> Self {
        self.generator_name = name.into();
        self.generator_url = url.into();
        self
    }

    /// Process every source in configured order and merge the survivors.
    ///
    /// Each source is fully processed before the next one is fetched.
    pub async fn merge(&self, sources: &[EpgSourceConfig]) -> MergeOutcome {
        let total = sources.len();
        self.observer.run_started(total);

        let mut document = MergedDocument::new(&self.generator_name, &self.generator_url);
        let mut reports = Vec::with_capacity(total);

        for (idx, source) in sources.iter().enumerate() {
            let index = idx + 1;
            self.observer.source_started(index, total, source);
            let started = Instant::now();

            let report = match self.process_source(source).await {
                Ok(filtered) => {
                    self.observer.source_filtered(index, source, &filtered);
                    let (channels, programmes) = document.append(filtered);
                    let report = SourceReport::succeeded(
                        index,
                        &source.name,
                        channels,
                        programmes,
                        started.elapsed(),
                    );
                    self.observer.source_completed(&report);
                    report
                }
                Err(error) => {
                    let report =
                        SourceReport::failed(index, &source.name, &error, started.elapsed());
                    self.observer.source_failed(&report);
                    report
                }
            };
            reports.push(report);
        }

        let stats = MergeStats::from_reports(reports);
        self.observer.run_completed(&stats);

        MergeOutcome { document, stats }
    }

    /// Fetch, decompress, parse and filter a single source
    pub async fn process_source(&self, source: &EpgSourceConfig) -> SourceResult<FilteredSource> {
        let payload = self.fetcher.fetch_bytes(&source.url).await?;

        let payload = if source.is_compressed() {
            debug!("Decompressing gzip payload of '{}'", source.name);
            DecompressionService::decompress_gzip(payload)?
        } else {
            let (payload, format) = DecompressionService::decompress_if_needed(payload)?;
            if format == CompressionFormat::Gzip {
                warn!(
                    "Source '{}' is declared raw but served gzip data, decompressed it anyway",
                    source.name
                );
            }
            payload
        };

        let document = parse_document(&payload)?;
        debug!(
            "Parsed '{}' ({} bytes, {} top-level elements)",
            source.name,
            payload.len(),
            document.child_elements().count()
        );

        ChannelFilter::new(&source.channels, &source.prefix).apply(document)
    }
}
