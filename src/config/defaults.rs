//! Configuration default values
//!
//! This module contains all the default values for configuration options,
//! making them easily changeable in one central location.
use std::time::Duration;

// Config file
pub const DEFAULT_CONFIG_FILE: &str = "sources.json";
pub const ENV_PREFIX: &str = "EPG_MERGE_";

// Output defaults
pub const DEFAULT_OUTPUT_PATH: &str = "output/guide.xml";
pub const DEFAULT_GENERATOR_NAME: &str = "EPG Merger";
pub const DEFAULT_GENERATOR_URL: &str = "https://github.com/mdbass/iptv-epg";

// HTTP defaults
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

pub fn default_user_agent() -> String {
    format!("epg-merge/{}", env!("CARGO_PKG_VERSION"))
}
