//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the shared HTTP client with the configured user agent
//! - GET requests that return the page body as text
//! - Error classification into transport, status and read failures

use crate::config::FetchConfig;
use crate::HarvestError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Source of page bodies for the traversal engine
///
/// The engine only ever needs "give me the body of this URL"; keeping that
/// behind a trait lets tests drive the engine over an in-memory site.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches one URL and returns its body
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The full response body
    /// * `Err(HarvestError::Transport)` - The request could not be sent
    /// * `Err(HarvestError::HttpStatus)` - The status was not 2xx
    /// * `Err(HarvestError::Read)` - The body could not be read
    async fn fetch(&self, url: &Url) -> Result<String, HarvestError>;
}

/// Builds an HTTP client with proper configuration
///
/// The client is cheap to clone and safe to share across branches; it keeps
/// no per-request state. Redirects follow reqwest's default policy.
///
/// # Example
///
/// ```no_run
/// use article_harvester::config::FetchConfig;
/// use article_harvester::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetcher backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a client built from `config`
    pub fn new(config: &FetchConfig) -> Result<Self, HarvestError> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, HarvestError> {
        tracing::debug!("Fetching: {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| {
                if source.is_timeout() {
                    tracing::debug!("Request timeout for {}", url);
                } else if source.is_connect() {
                    tracing::debug!("Connection failed for {}", url);
                }
                HarvestError::Transport {
                    url: url.to_string(),
                    source,
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            // Dropping the response releases the connection without reading the body
            return Err(HarvestError::HttpStatus {
                url: url.to_string(),
                code: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| HarvestError::Read {
            url: url.to_string(),
            source,
        })
    }
}
