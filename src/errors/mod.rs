//! Centralized error handling for the EPG merger
//!
//! Errors are split along the recovery boundary of a merge run:
//!
//! - **Configuration Errors**: missing or malformed sources file, fatal at startup
//! - **Source Errors**: fetch, decompression and parse failures for a single source,
//!   recovered by the orchestrator which skips the source and carries on
//! - **Output Errors**: the merged guide could not be persisted, fatal at the end
//!
//! # Usage
//!
//! ```rust
//! use epg_merge::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::configuration("no sources configured"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for per-source Results
pub type SourceResult<T> = Result<T, SourceError>;
