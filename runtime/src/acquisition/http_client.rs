//! Async HTTP client wrapping reqwest.
//!
//! Not a browser, just a bounded GET. A single attempt per call: no retries,
//! no backoff. Non-2xx responses are reported as [`FetchError::Status`] so
//! callers can decide what a failed fetch means for them.

use std::time::Duration;

/// User agent sent to target sites.
pub const USER_AGENT: &str = concat!("smart-scraper/", env!("CARGO_PKG_VERSION"));

/// Successful response from a GET request.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Original requested URL.
    pub url: String,
    /// Final URL after redirects.
    pub final_url: String,
    /// HTTP status code (always 2xx).
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("request to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },
    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("failed to read body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// HTTP client shared by the classifier and the static extractor.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client with the given per-request timeout.
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self { client, timeout }
    }

    /// Perform a single bounded GET.
    ///
    /// The timeout covers connect, headers and body.
    pub async fn get(&self, url: &str) -> Result<FetchOutcome, FetchError> {
        match tokio::time::timeout(self.timeout, self.get_inner(url)).await {
            Ok(result) => result,
            Err(_) => Err(self.timeout_error(url)),
        }
    }

    async fn get_inner(&self, url: &str) -> Result<FetchOutcome, FetchError> {
        let resp = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                self.timeout_error(url)
            } else {
                FetchError::Network {
                    url: url.to_string(),
                    source: e,
                }
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = resp.url().to_string();
        let body = resp.text().await.map_err(|e| {
            if e.is_timeout() {
                self.timeout_error(url)
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    source: e,
                }
            }
        })?;

        Ok(FetchOutcome {
            url: url.to_string(),
            final_url,
            status: status.as_u16(),
            body,
        })
    }

    fn timeout_error(&self, url: &str) -> FetchError {
        FetchError::Timeout {
            url: url.to_string(),
            timeout_ms: self.timeout.as_millis() as u64,
        }
    }
}
