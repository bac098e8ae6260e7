//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the ingestion pipeline:
//! - Building the HTTP client with a proper user agent
//! - GET requests for the catalog root and listing pages
//! - Retry with delay on transient transport failures
//!
//! Transient failures (timeout, connection error, HTTP 5xx) are retried up
//! to the configured attempt count. Everything else fails immediately;
//! parse failures are deterministic and are never retried at this layer.

use crate::config::CrawlerConfig;
use crate::{IngestError, Result};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Retry behavior for page fetches
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts per fetch (first try included)
    pub max_attempts: u32,
    /// Delay between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_attempts: config.max_retries,
            delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// Single attempt, no delay. Used in tests and for cheap local fetches.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }
}

/// Builds the HTTP client used for every catalog request
pub fn build_http_client(user_agent: &str) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page and returns its body as text
///
/// Retries on timeouts, connection errors, and 5xx responses per the given
/// policy. A non-success status after the final attempt surfaces as
/// `IngestError::HttpStatus`; transport failures as `IngestError::Fetch`.
pub async fn fetch_page(client: &Client, url: &Url, retry: RetryPolicy) -> Result<String> {
    let mut attempt = 0;

    loop {
        attempt += 1;

        match client.get(url.clone()).send().await {
            Ok(response) => {
                let status = response.status();

                if status.is_server_error() && attempt < retry.max_attempts {
                    tracing::warn!(
                        "HTTP {} for {}, retrying ({}/{})",
                        status.as_u16(),
                        url,
                        attempt,
                        retry.max_attempts
                    );
                    tokio::time::sleep(retry.delay).await;
                    continue;
                }

                if !status.is_success() {
                    return Err(IngestError::HttpStatus {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }

                return response.text().await.map_err(|e| IngestError::Fetch {
                    url: url.to_string(),
                    source: e,
                });
            }
            Err(e) => {
                let transient = e.is_timeout() || e.is_connect();
                if transient && attempt < retry.max_attempts {
                    tracing::warn!(
                        "Transport error for {}: {}, retrying ({}/{})",
                        url,
                        e,
                        attempt,
                        retry.max_attempts
                    );
                    tokio::time::sleep(retry.delay).await;
                    continue;
                }

                return Err(IngestError::Fetch {
                    url: url.to_string(),
                    source: e,
                });
            }
        }
    }
}
