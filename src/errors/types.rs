//! Error type definitions for the EPG merger

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Failure to persist the merged guide
    #[error("Output error: {path}: {message}")]
    Output { path: PathBuf, message: String },

    /// XML serialization failures
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Errors raised while processing a single EPG source.
///
/// These never escape the orchestrator: the failing source is skipped and the
/// error is reported through the merge observer.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Transport level failures (DNS, connection refused, TLS, body read)
    #[error("Fetch failed: {url} - {message}")]
    Fetch { url: String, message: String },

    /// Network connection timeouts
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// Non-success HTTP status
    #[error("HTTP error: {status} - {url}")]
    Http { status: u16, url: String },

    /// Corrupt or unsupported compressed payload
    #[error("Decompression failed: {message}")]
    Decompression { message: String },

    /// Malformed XML or an unexpected document shape
    #[error("Parse error: {message}")]
    Parse { message: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an output error for the given path
    pub fn output<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        Self::Output {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl SourceError {
    pub fn fetch<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn decompression<S: Into<String>>(message: S) -> Self {
        Self::Decompression {
            message: message.into(),
        }
    }

    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Pipeline stage that produced the error, used in progress output
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Fetch { .. } | Self::Timeout { .. } | Self::Http { .. } => "fetch",
            Self::Decompression { .. } => "decompress",
            Self::Parse { .. } => "parse",
        }
    }
}
