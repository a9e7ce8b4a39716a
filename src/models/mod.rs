use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub mod epg_source;

/// One remote EPG feed as declared in the sources file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpgSourceConfig {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub format: SourceFormat,
    pub channels: ChannelSelector,
    /// Prepended to every channel id of this source; may be empty
    #[serde(default)]
    pub prefix: String,
}

/// Payload encoding a source declares
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SourceFormat {
    #[default]
    Raw,
    Gz,
}

/// Which channels of a source are kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSelector {
    /// The `"*"` wildcard: every channel and programme is kept
    All,
    /// Original channel ids to keep, compared as strings
    Only(HashSet<String>),
}
