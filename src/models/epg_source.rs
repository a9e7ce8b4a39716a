//! EPG source model implementations: format parsing and channel selector handling

use std::collections::HashSet;
use std::fmt;

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::models::{ChannelSelector, EpgSourceConfig, SourceFormat};

/// Sentinel used in configuration for "select every channel"
pub const WILDCARD: &str = "*";

impl EpgSourceConfig {
    /// Whether the payload of this source has to be inflated before parsing
    pub fn is_compressed(&self) -> bool {
        self.format == SourceFormat::Gz
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Raw => write!(f, "raw"),
            SourceFormat::Gz => write!(f, "gz"),
        }
    }
}

impl std::str::FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "raw" | "xml" => Ok(SourceFormat::Raw),
            "gz" | "gzip" => Ok(SourceFormat::Gz),
            _ => Err(format!("Invalid source format '{s}', expected 'raw' or 'gz'")),
        }
    }
}

impl TryFrom<String> for SourceFormat {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SourceFormat> for String {
    fn from(format: SourceFormat) -> Self {
        format.to_string()
    }
}

impl ChannelSelector {
    /// Build an explicit selector from anything yielding channel ids
    pub fn only<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ChannelSelector::Only(ids.into_iter().map(Into::into).collect())
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, ChannelSelector::All)
    }

    /// Whether an original channel id is eligible under this selector
    pub fn matches(&self, channel_id: &str) -> bool {
        match self {
            ChannelSelector::All => true,
            ChannelSelector::Only(ids) => ids.contains(channel_id),
        }
    }

    /// Number of explicitly listed ids, `None` for the wildcard
    pub fn listed_count(&self) -> Option<usize> {
        match self {
            ChannelSelector::All => None,
            ChannelSelector::Only(ids) => Some(ids.len()),
        }
    }
}

impl Serialize for ChannelSelector {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ChannelSelector::All => serializer.serialize_str(WILDCARD),
            ChannelSelector::Only(ids) => {
                let mut sorted: Vec<&String> = ids.iter().collect();
                sorted.sort();
                let mut seq = serializer.serialize_seq(Some(sorted.len()))?;
                for id in sorted {
                    seq.serialize_element(id)?;
                }
                seq.end()
            }
        }
    }
}

/// A single list entry; numeric ids are coerced to their decimal form
struct ChannelId(String);

impl<'de> Deserialize<'de> for ChannelId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ChannelIdVisitor;

        impl<'de> Visitor<'de> for ChannelIdVisitor {
            type Value = ChannelId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a channel id as a string or an integer")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(ChannelId(value.to_string()))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(ChannelId(value.to_string()))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(ChannelId(value.to_string()))
            }
        }

        deserializer.deserialize_any(ChannelIdVisitor)
    }
}

impl<'de> Deserialize<'de> for ChannelSelector {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SelectorVisitor;

        impl<'de> Visitor<'de> for SelectorVisitor {
            type Value = ChannelSelector;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("\"*\" or a list of channel ids")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                if value == WILDCARD {
                    Ok(ChannelSelector::All)
                } else {
                    Err(de::Error::invalid_value(de::Unexpected::Str(value), &self))
                }
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut ids = HashSet::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(ChannelId(id)) = seq.next_element()? {
                    ids.insert(id);
                }
                Ok(ChannelSelector::Only(ids))
            }
        }

        deserializer.deserialize_any(SelectorVisitor)
    }
}
