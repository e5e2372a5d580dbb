use crate::config::{FeedSource, FetchConfig};
use crate::feed::parser::{parse_feed, RawFeedItem};
use futures::stream::{self, StreamExt};
use std::time::Duration;
use thiserror::Error;

const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Browser-like User-Agent — several trade-press feeds refuse obvious bots.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const ACCEPT: &str = "application/rss+xml, application/xml, text/xml, */*";

/// Errors that can occur while fetching a single source.
///
/// Every variant is a per-source outcome: the run logs it, skips the
/// source, and moves on. There is no retry — a source that fails
/// contributes zero items this run and is retried naturally on the next
/// scheduled run.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Feed XML could not be parsed as RSS or Atom
    #[error("Parse error: {0}")]
    Parse(String),
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
}

/// Outcome of fetching one configured source.
#[derive(Debug)]
pub struct SourceFetch {
    pub source: FeedSource,
    pub result: Result<Vec<RawFeedItem>, FetchError>,
}

/// Builds the shared HTTP client with browser-like default headers.
pub fn build_client() -> Result<reqwest::Client, reqwest::Error> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static(ACCEPT),
    );
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .build()
}

/// Fetches all configured sources concurrently.
///
/// Runs at most `config.concurrency` fetches at a time on a
/// `buffer_unordered` pool. Each source is fault-isolated: its failure is
/// logged and recorded in the returned [`SourceFetch`], never propagated.
/// The result of a run is always "whatever sources answered" — partial
/// success is the normal case, not an error.
///
/// Results are returned in completion order, not input order.
pub async fn fetch_all(
    client: &reqwest::Client,
    sources: Vec<FeedSource>,
    config: &FetchConfig,
) -> Vec<SourceFetch> {
    if sources.is_empty() {
        return Vec::new();
    }

    let timeout = Duration::from_secs(config.timeout_secs);
    let max_items = config.max_items_per_feed;

    stream::iter(sources.into_iter())
        .map(|source| {
            let client = client.clone();
            async move {
                let result = fetch_one(&client, &source.url, timeout, max_items).await;
                match &result {
                    Ok(items) => tracing::info!(
                        category = %source.category,
                        source = %source.label,
                        items = items.len(),
                        "Fetched feed"
                    ),
                    Err(e) => tracing::warn!(
                        category = %source.category,
                        source = %source.label,
                        url = %source.url,
                        error = %e,
                        "Skipping source for this run"
                    ),
                }
                SourceFetch { source, result }
            }
        })
        .buffer_unordered(config.concurrency.max(1))
        .collect()
        .await
}

/// Fetches and parses a single feed.
///
/// # Errors
///
/// - [`FetchError::Timeout`] — request exceeded the configured timeout
/// - [`FetchError::Network`] — connection or TLS errors
/// - [`FetchError::HttpStatus`] — non-2xx HTTP response
/// - [`FetchError::ResponseTooLarge`] — body exceeded 10MB
/// - [`FetchError::Parse`] — invalid RSS/Atom XML
async fn fetch_one(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
    max_items: usize,
) -> Result<Vec<RawFeedItem>, FetchError> {
    let response = tokio::time::timeout(timeout, client.get(url).send())
        .await
        .map_err(|_| FetchError::Timeout)?
        .map_err(FetchError::Network)?;

    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    let bytes = read_limited_bytes(response, MAX_FEED_SIZE).await?;

    let mut items = parse_feed(&bytes).map_err(|e| FetchError::Parse(e.to_string()))?;
    if items.len() > max_items {
        tracing::debug!(
            url = %url,
            total = items.len(),
            kept = max_items,
            "Truncating feed to per-feed cap"
        );
        items.truncate(max_items);
    }
    Ok(items)
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
