//! Page and file retrieval.
//!
//! `PageFetcher` is the seam between the resolver/crawler/mirror and the
//! network, so tests can substitute an in-memory fetcher. `HttpFetcher` is
//! the reqwest-backed implementation: plain GET requests with a timeout,
//! a redirect limit, retry on transport errors and 5xx, and backoff on 429.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::listing::{self, Row, TableLayout};
use crate::types::{DatasetError, DatasetResult};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Longest `Retry-After` we are willing to honour.
const MAX_RETRY_AFTER_SECS: u64 = 10;

/// Raw result of fetching a file. Non-success statuses are returned, not raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFile {
    pub status: u16,
    pub bytes: Vec<u8>,
}

impl FetchedFile {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Retrieval primitive used by the resolver, crawler, and mirror.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a page as text. A non-success status is a `DatasetError::Status`.
    async fn fetch_html(&self, url: &str) -> DatasetResult<String>;

    /// Fetch a file's bytes along with the response status.
    async fn fetch_file(&self, url: &str) -> DatasetResult<FetchedFile>;

    /// Fetch a page and return the data rows of the table selected by `layout`.
    async fn fetch_rows(&self, url: &str, layout: TableLayout) -> DatasetResult<Vec<Row>> {
        let html = self.fetch_html(url).await?;
        listing::parse_rows(&html, url, layout)
    }
}

/// Settings for `HttpFetcher`.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            user_agent: format!("datamirror/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP fetcher wrapping reqwest.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_retries: u32,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> DatasetResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| DatasetError::Retrieval {
                url: String::new(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
        })
    }

    /// GET with retry on transport errors and 5xx, and backoff on 429.
    ///
    /// The last response is returned whatever its status once retries run out.
    async fn get(&self, url: &str) -> DatasetResult<reqwest::Response> {
        let mut retries = 0u32;

        loop {
            debug!(url, attempt = retries + 1, "GET");
            match self.client.get(url).send().await {
                Ok(resp) => {
                    let status = resp.status().as_u16();

                    if status >= 500 && retries < self.max_retries {
                        retries += 1;
                        warn!(url, status, retries, "server error, retrying");
                        tokio::time::sleep(backoff(retries)).await;
                        continue;
                    }

                    if status == 429 && retries < self.max_retries {
                        retries += 1;
                        let retry_after = resp
                            .headers()
                            .get(reqwest::header::RETRY_AFTER)
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.trim().parse::<u64>().ok())
                            .unwrap_or(2);
                        warn!(url, retry_after, "rate limited, backing off");
                        tokio::time::sleep(Duration::from_secs(
                            retry_after.min(MAX_RETRY_AFTER_SECS),
                        ))
                        .await;
                        continue;
                    }

                    return Ok(resp);
                }
                Err(e) => {
                    if retries < self.max_retries {
                        retries += 1;
                        warn!(url, error = %e, retries, "request failed, retrying");
                        tokio::time::sleep(backoff(retries)).await;
                        continue;
                    }
                    return Err(DatasetError::Retrieval {
                        url: url.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(500 * 2u64.pow(attempt.saturating_sub(1)))
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_html(&self, url: &str) -> DatasetResult<String> {
        let resp = self.get(url).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DatasetError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        resp.text().await.map_err(|e| DatasetError::Retrieval {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    async fn fetch_file(&self, url: &str) -> DatasetResult<FetchedFile> {
        let resp = self.get(url).await?;
        let status = resp.status().as_u16();
        let bytes = resp.bytes().await.map_err(|e| DatasetError::Retrieval {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(FetchedFile {
            status,
            bytes: bytes.to_vec(),
        })
    }
}
