//! Channel filter and id rewriter
//!
//! Selects the channels of one source, prefixes their ids and rewrites every
//! programme's channel reference with the same prefix. Rewriting is plain string
//! concatenation: an id that already carries the prefix gets it a second time.
//!
//! Elements are rebuilt rather than edited: each kept `channel`/`programme` becomes a
//! fresh element and the original children are moved onto it in order.

use tracing::debug;

use crate::errors::{SourceError, SourceResult};
use crate::models::ChannelSelector;
use crate::xmltv::{CHANNEL, Element, Node, PROGRAMME, TV};

/// Programme attributes that are rebuilt explicitly, in this order
const PROGRAMME_CHANNEL: &str = "channel";
const PROGRAMME_START: &str = "start";
const PROGRAMME_STOP: &str = "stop";

/// Result of filtering one source document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredSource {
    /// Kept channels with rewritten ids, in document order
    pub channels: Vec<Element>,
    /// Kept programmes with rewritten channel references, in document order
    pub programmes: Vec<Element>,
    /// Original (unprefixed) ids of the kept channels
    pub found_channel_ids: Vec<String>,
    /// Whether the selector was the wildcard
    pub wildcard: bool,
    /// Channels and programmes dropped because the id attribute was missing
    pub skipped_missing_id: usize,
}

impl FilteredSource {
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn programme_count(&self) -> usize {
        self.programmes.len()
    }

    /// Standalone `tv` document holding the kept channels followed by the kept programmes
    pub fn into_document(self) -> Element {
        let mut root = Element::new(TV);
        root.children.reserve(self.channels.len() + self.programmes.len());
        root.children.extend(self.channels.into_iter().map(Node::Element));
        root.children.extend(self.programmes.into_iter().map(Node::Element));
        root
    }
}

/// Filters and namespaces a single source document
pub struct ChannelFilter<'a> {
    selector: &'a ChannelSelector,
    prefix: &'a str,
}

impl<'a> ChannelFilter<'a> {
    pub fn new(selector: &'a ChannelSelector, prefix: &'a str) -> Self {
        Self { selector, prefix }
    }

    /// The id a channel ends up with in the merged guide
    pub fn rewrite_id(&self, original_id: &str) -> String {
        format!("{}{}", self.prefix, original_id)
    }

    /// Consume a parsed document and keep only the selected channels and programmes.
    ///
    /// Root children other than `channel` and `programme` are dropped. An element
    /// without its id attribute never matches, not even the wildcard.
    pub fn apply(&self, document: Element) -> SourceResult<FilteredSource> {
        if document.name != TV {
            return Err(SourceError::parse(format!(
                "expected <{TV}> root element, found <{}>",
                document.name
            )));
        }

        let mut filtered = FilteredSource {
            wildcard: self.selector.is_wildcard(),
            ..FilteredSource::default()
        };

        for node in document.children {
            let Node::Element(element) = node else {
                continue;
            };
            match element.name.as_str() {
                CHANNEL => self.keep_channel(element, &mut filtered),
                PROGRAMME => self.keep_programme(element, &mut filtered),
                _ => {}
            }
        }

        if filtered.skipped_missing_id > 0 {
            debug!(
                "Skipped {} element(s) without a channel id attribute",
                filtered.skipped_missing_id
            );
        }

        Ok(filtered)
    }

    fn keep_channel(&self, mut channel: Element, filtered: &mut FilteredSource) {
        let Some(original_id) = channel.attribute("id").map(str::to_owned) else {
            filtered.skipped_missing_id += 1;
            return;
        };
        if !self.selector.matches(&original_id) {
            return;
        }

        let mut rewritten =
            Element::new(CHANNEL).with_attribute("id", self.rewrite_id(&original_id));
        rewritten.children = channel.take_children();

        filtered.channels.push(rewritten);
        filtered.found_channel_ids.push(original_id);
    }

    fn keep_programme(&self, mut programme: Element, filtered: &mut FilteredSource) {
        let Some(channel_ref) = programme.attribute(PROGRAMME_CHANNEL) else {
            filtered.skipped_missing_id += 1;
            return;
        };
        if !self.selector.matches(channel_ref) {
            return;
        }

        let mut rewritten =
            Element::new(PROGRAMME).with_attribute(PROGRAMME_CHANNEL, self.rewrite_id(channel_ref));
        for key in [PROGRAMME_START, PROGRAMME_STOP] {
            if let Some(value) = programme.attribute(key) {
                rewritten.set_attribute(key, value);
            }
        }

        let attributes = std::mem::take(&mut programme.attributes);
        rewritten.attributes.extend(attributes.into_iter().filter(|(key, _)| {
            !matches!(key.as_str(), PROGRAMME_CHANNEL | PROGRAMME_START | PROGRAMME_STOP)
        }));
        rewritten.children = programme.take_children();

        filtered.programmes.push(rewritten);
    }
}
