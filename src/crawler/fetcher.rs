//! Fetch/parse collaborator
//!
//! This module defines the seam between the crawl engine and the network:
//! - The `LinkSource` trait the engine fetches pages through
//! - `HttpSource`, the reqwest-backed implementation with retry logic
//! - Error classification into page states

use crate::config::{Config, UserAgentConfig};
use crate::crawler::parser::parse_html;
use crate::state::PageState;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Shortest wait between two attempts at the same URL
pub const RETRY_WAIT_MIN: Duration = Duration::from_secs(1);

/// Result of fetching a page that produced an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// HTTP status code
    pub status_code: u16,

    /// Every raw anchor target found in the document; empty for failed statuses
    pub hrefs: Vec<String>,
}

impl FetchedPage {
    /// Returns true if the status code is in the success range (200-399)
    pub fn is_success(&self) -> bool {
        is_success_status(self.status_code)
    }
}

/// Returns true if a status code counts as a successfully fetched page
pub fn is_success_status(status_code: u16) -> bool {
    (200..400).contains(&status_code)
}

/// Transport-level failure while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

impl FetchError {
    /// The page state a page is left in after this error
    pub fn page_state(&self) -> PageState {
        match self {
            Self::Timeout | Self::Connect(_) => PageState::Unreachable,
            Self::Request(_) | Self::Body(_) => PageState::Failed,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else {
            Self::Request(e.to_string())
        }
    }
}

/// Fetches a page and returns the raw anchor targets found in it
///
/// Implementations report transport failures as `Err`. Any HTTP response,
/// including error statuses, is returned as `Ok` so the caller can apply its
/// own success policy.
#[async_trait]
pub trait LinkSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Exponential backoff settings for retried requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Wait before the first retry
    pub wait_min: Duration,

    /// Cap for the wait between retries
    pub wait_max: Duration,
}

impl RetryPolicy {
    /// Wait before retry number `attempt` (0-based): `wait_min * 2^attempt`, capped at `wait_max`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.wait_min.saturating_mul(factor).min(self.wait_max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            wait_min: RETRY_WAIT_MIN,
            wait_max: Duration::from_secs(60),
        }
    }
}

/// Returns true for statuses worth retrying (429 and 5xx)
fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `timeout` - Timeout for a whole request, including reading the body
/// * `accept_invalid_certs` - Skip TLS certificate verification
///
/// # Example
///
/// ```no_run
/// use sitewalk::config::UserAgentConfig;
/// use sitewalk::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30), false).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
    accept_invalid_certs: bool,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .danger_accept_invalid_certs(accept_invalid_certs)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Link source backed by a reqwest client
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 429 | Retry with backoff |
/// | HTTP 5xx | Retry with backoff |
/// | Timeout | Retry with backoff |
/// | Connection refused | Retry with backoff |
/// | Other statuses | Returned as-is |
///
/// Once retries are exhausted the last response (or error) is returned.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    retry: RetryPolicy,
}

impl HttpSource {
    /// Creates a source from an existing client
    pub fn new(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Creates a source with default user agent and retry settings
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&UserAgentConfig::default(), timeout, false)?;
        Ok(Self::new(client, RetryPolicy::default()))
    }

    /// Creates a source from the crawler and user agent configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.crawler.fetch_timeout),
            config.crawler.accept_invalid_certs,
        )?;

        let retry = RetryPolicy {
            max_retries: config.crawler.retry_max,
            wait_min: RETRY_WAIT_MIN,
            wait_max: Duration::from_secs(config.crawler.retry_wait_max),
        };

        Ok(Self::new(client, retry))
    }

    /// Returns the retry settings in use
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    async fn get_with_retry(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let mut attempt = 0;

        loop {
            let result = self.client.get(url).send().await;

            let retryable = match &result {
                Ok(response) => is_retryable_status(response.status()),
                Err(e) => e.is_timeout() || e.is_connect(),
            };

            if !retryable || attempt >= self.retry.max_retries {
                return result.map_err(FetchError::from);
            }

            let wait = self.retry.backoff(attempt);
            tracing::debug!(
                url,
                attempt = attempt + 1,
                wait_ms = wait.as_millis() as u64,
                "retrying request"
            );
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }
}

#[async_trait]
impl LinkSource for HttpSource {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self.get_with_retry(url).await?;
        let status_code = response.status().as_u16();

        if !is_success_status(status_code) {
            return Ok(FetchedPage {
                status_code,
                hrefs: Vec::new(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;

        let parsed = parse_html(&body);
        if let Some(title) = &parsed.title {
            tracing::trace!(url, title = %title, "parsed page");
        }

        Ok(FetchedPage {
            status_code,
            hrefs: parsed.hrefs,
        })
    }
}
