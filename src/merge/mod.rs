//! EPG merging
//!
//! [`filter`] narrows one parsed source to the selected channels and namespaces their
//! ids, [`orchestrator`] drives every configured source through fetch, decompress,
//! parse and filter, and [`observer`] reports progress. The types here hold the
//! accumulated guide and the run statistics.

use std::time::Duration;

use crate::errors::SourceError;
use crate::xmltv::{Element, Node, TV};

pub mod filter;
pub mod observer;
pub mod orchestrator;

pub use filter::{ChannelFilter, FilteredSource};
pub use observer::{MergeObserver, NoopObserver, TracingObserver};
pub use orchestrator::EpgMerger;

/// Accumulator for the merged guide
///
/// Channels and programmes are kept in separate lists so every channel lands before
/// every programme in the written document, whatever order sources arrive in.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedDocument {
    generator_name: String,
    generator_url: String,
    channels: Vec<Element>,
    programmes: Vec<Element>,
}

impl MergedDocument {
    pub fn new<N: Into<String>, U: Into<String>>(generator_name: N, generator_url: U) -> Self {
        Self {
            generator_name: generator_name.into(),
            generator_url: generator_url.into(),
            channels: Vec::new(),
            programmes: Vec::new(),
        }
    }

    /// Append one source's channels and programmes, returning how many of each were added
    pub fn append(&mut self, source: FilteredSource) -> (usize, usize) {
        let channels = source.channels.len();
        let programmes = source.programmes.len();
        self.channels.extend(source.channels);
        self.programmes.extend(source.programmes);
        (channels, programmes)
    }

    pub fn channels(&self) -> &[Element] {
        &self.channels
    }

    pub fn programmes(&self) -> &[Element] {
        &self.programmes
    }

    /// Build the `tv` root: generator attributes, all channels, then all programmes
    pub fn into_element(self) -> Element {
        let mut root = Element::new(TV)
            .with_attribute("generator-info-name", self.generator_name)
            .with_attribute("generator-info-url", self.generator_url);
        root.children.reserve(self.channels.len() + self.programmes.len());
        root.children.extend(self.channels.into_iter().map(Node::Element));
        root.children.extend(self.programmes.into_iter().map(Node::Element));
        root
    }
}

/// How a single source ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    Succeeded { channels: usize, programmes: usize },
    Failed { stage: &'static str, error: String },
}

/// Per-source line of the run summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    /// 1-based position in the configured source list
    pub index: usize,
    pub name: String,
    pub outcome: SourceOutcome,
    pub elapsed: Duration,
}

impl SourceReport {
    pub fn succeeded(
        index: usize,
        name: impl Into<String>,
        channels: usize,
        programmes: usize,
        elapsed: Duration,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            outcome: SourceOutcome::Succeeded {
                channels,
                programmes,
            },
            elapsed,
        }
    }

    pub fn failed(
        index: usize,
        name: impl Into<String>,
        error: &SourceError,
        elapsed: Duration,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            outcome: SourceOutcome::Failed {
                stage: error.stage(),
                error: error.to_string(),
            },
            elapsed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, SourceOutcome::Succeeded { .. })
    }

    /// Channels contributed to the merged guide, zero for a failed source
    pub fn channels(&self) -> usize {
        match self.outcome {
            SourceOutcome::Succeeded { channels, .. } => channels,
            SourceOutcome::Failed { .. } => 0,
        }
    }

    pub fn programmes(&self) -> usize {
        match self.outcome {
            SourceOutcome::Succeeded { programmes, .. } => programmes,
            SourceOutcome::Failed { .. } => 0,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            SourceOutcome::Failed { error, .. } => Some(error),
            SourceOutcome::Succeeded { .. } => None,
        }
    }
}

/// Aggregate counts for a merge run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub total_channels: usize,
    pub total_programmes: usize,
    pub sources_succeeded: usize,
    pub sources_failed: usize,
    pub reports: Vec<SourceReport>,
}

impl MergeStats {
    pub fn from_reports(reports: Vec<SourceReport>) -> Self {
        let mut stats = Self::default();
        for report in &reports {
            stats.total_channels += report.channels();
            stats.total_programmes += report.programmes();
            if report.is_success() {
                stats.sources_succeeded += 1;
            } else {
                stats.sources_failed += 1;
            }
        }
        stats.reports = reports;
        stats
    }

    pub fn total_sources(&self) -> usize {
        self.sources_succeeded + self.sources_failed
    }

    /// True when sources were configured but none produced any data
    pub fn all_failed(&self) -> bool {
        self.sources_succeeded == 0 && self.sources_failed > 0
    }
}

/// Result of [`EpgMerger::merge`]
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub document: MergedDocument,
    pub stats: MergeStats,
}
