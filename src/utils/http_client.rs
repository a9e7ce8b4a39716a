use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::debug;

use crate::config::HttpConfig;
use crate::errors::{AppError, AppResult, SourceError, SourceResult};
use crate::utils::url::UrlUtils;

/// Retrieves the raw payload of an EPG source
///
/// The seam between the merge core and the network; tests substitute their own
/// implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch URL and return the body exactly as served (no decompression)
    async fn fetch_bytes(&self, url: &str) -> SourceResult<Bytes>;
}

/// Default implementation of DocumentFetcher using reqwest
pub struct StandardHttpClient {
    client: Client,
}

impl StandardHttpClient {
    /// Create a client applying the configured deadlines to every request
    pub fn new(config: &HttpConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    fn map_transport_error(url: &str, error: reqwest::Error) -> SourceError {
        let safe_url = UrlUtils::obfuscate_credentials(url);
        if error.is_timeout() {
            SourceError::Timeout { url: safe_url }
        } else {
            SourceError::fetch(safe_url, UrlUtils::obfuscate_credentials(&error.to_string()))
        }
    }
}

#[async_trait]
impl DocumentFetcher for StandardHttpClient {
    async fn fetch_bytes(&self, url: &str) -> SourceResult<Bytes> {
        debug!("Fetching EPG content from: {}", UrlUtils::obfuscate_credentials(url));

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::map_transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                url: UrlUtils::obfuscate_credentials(url),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Self::map_transport_error(url, e))?;

        debug!("Fetched {} bytes of raw content", bytes.len());
        Ok(bytes)
    }
}
