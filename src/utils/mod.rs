//! Utility modules for the EPG merger
//!
//! Thin plumbing around the merge core: fetching, decompression and URL handling.

pub mod decompression;
pub mod http_client;
pub mod url;

// Re-export commonly used types for convenience
pub use decompression::{CompressionFormat, DecompressionService};
pub use http_client::{DocumentFetcher, StandardHttpClient};
