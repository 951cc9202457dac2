//! HTTP client with rate limiting for IMDb
//!
//! This module provides a rate-limited HTTP client that spaces requests to
//! imdb.com and retries transient failures with exponential backoff.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{ImdbError, Result};

/// Base URL for IMDb
pub const IMDB_BASE_URL: &str = "https://www.imdb.com";

/// Default User-Agent mimicking a modern browser
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// English pages keep labels (tech specs, credit headers) predictable
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Rate limiter to control request frequency
///
/// Ensures that requests are spaced at least `min_interval` apart.
pub struct RateLimiter {
    /// Minimum interval between requests
    min_interval: Duration,
    /// Timestamp of the last request
    last_request: Arc<Mutex<Instant>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the specified requests per second
    ///
    /// # Example
    /// ```
    /// use imdb_core::client::RateLimiter;
    ///
    /// let limiter = RateLimiter::new(2.0); // 2 requests per second
    /// ```
    pub fn new(requests_per_second: f64) -> Self {
        let min_interval = Duration::from_secs_f64(1.0 / requests_per_second);
        let last = Instant::now()
            .checked_sub(min_interval)
            .unwrap_or_else(Instant::now);
        Self {
            min_interval,
            last_request: Arc::new(Mutex::new(last)),
        }
    }

    /// Wait until the minimum interval since the previous request has passed.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();

        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }

        *last = Instant::now();
    }

    /// Get the minimum interval between requests
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// Configuration for the IMDb HTTP client
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Site root every request path is appended to (default: https://www.imdb.com)
    pub base_url: String,
    /// Maximum requests per second (default: 2.0)
    pub requests_per_second: f64,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Retries for 429 and 5xx responses (default: 3)
    pub max_retries: u32,
    /// Base delay for exponential backoff in milliseconds (default: 1000)
    pub retry_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: IMDB_BASE_URL.to_string(),
            requests_per_second: 2.0,
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

/// HTTP client for IMDb with rate limiting and retry logic
///
/// This client automatically:
/// - Limits request rate to avoid server overload
/// - Retries on transient errors (429, 5xx) with exponential backoff
/// - Requests English pages
pub struct ImdbClient {
    client: reqwest::Client,
    rate_limiter: RateLimiter,
    base_url: String,
    max_retries: u32,
    retry_delay_ms: u64,
}

impl ImdbClient {
    /// Create a new client with default configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created or the
    /// request rate is not positive
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        if !(config.requests_per_second > 0.0 && config.requests_per_second.is_finite()) {
            return Err(ImdbError::InvalidUrl(format!(
                "requests_per_second must be positive, got {}",
                config.requests_per_second
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE),
        );

        let client = reqwest::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(config.requests_per_second),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            retry_delay_ms: config.retry_delay_ms,
        })
    }

    /// Fetch HTML content from an IMDb path
    ///
    /// # Arguments
    /// * `path` - Relative path (e.g., "/title/tt0133093/plotsummary")
    ///
    /// # Errors
    /// - `ImdbError::HttpError` - Network or HTTP error after all retries
    /// - `ImdbError::RateLimited` - Server returned 429 after all retries
    /// - `ImdbError::NotFound` - Server returned 404
    pub async fn fetch(&self, path: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0;

        loop {
            self.rate_limiter.acquire().await;
            debug!(url = %url, attempt, "IMDb request");

            let response = self.client.get(&url).send().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response.text().await?);
            }

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(ImdbError::NotFound(path.to_string()));
            }

            let transient =
                status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            if transient && attempt < self.max_retries {
                let delay = self.backoff_delay(attempt);
                warn!(url = %url, %status, ?delay, "transient IMDb error, retrying");
                sleep(delay).await;
                attempt += 1;
                continue;
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(ImdbError::RateLimited);
            }

            return match response.error_for_status() {
                Err(err) => Err(ImdbError::HttpError(err)),
                Ok(_) => Err(ImdbError::ParseError(format!(
                    "unexpected status {} for {}",
                    status, url
                ))),
            };
        }
    }

    /// Exponential backoff: base, 2x base, 4x base, ...
    fn backoff_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_delay_ms.saturating_mul(2u64.saturating_pow(attempt)))
    }

    /// Get a reference to the rate limiter (for testing)
    #[cfg(test)]
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }
}
