use crate::feed::parser::RawFeedItem;
use crate::util::{first_image_src, is_valid_image_url, normalize_image_url, og_image_hint};
use futures::StreamExt;
use std::time::Duration;

/// Article pages are only scanned for `<meta>` hints, which live in the
/// document head — reading more than this buys nothing.
const MAX_ARTICLE_PAGE_BYTES: usize = 64 * 1024;

/// Resolves a representative image for a feed entry.
///
/// Strategies run in strict priority order until one produces a validated
/// URL:
///
/// 1. media-namespace thumbnail/content tags
/// 2. enclosure tags
/// 3. `<img>` tags inside the embedded-content field
/// 4. `<img>` tags inside the description field
/// 5. OpenGraph hints fetched from the article page (budgeted per feed)
///
/// On exhaustion [`ImageResolver::resolve`] returns `None` — never an
/// error, never a guess. The consumer applies a category-level fallback.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    client: reqwest::Client,
    og_timeout: Duration,
}

impl ImageResolver {
    pub fn new(client: reqwest::Client, og_timeout: Duration) -> Self {
        Self { client, og_timeout }
    }

    /// Resolves an image for one entry.
    ///
    /// `og_budget` is the per-feed allowance of article-page lookups; it is
    /// decremented only when the cheap in-feed strategies are exhausted and
    /// a lookup is actually attempted. A budget of zero disables strategy 5
    /// for the remaining entries of the feed.
    pub async fn resolve(&self, raw: &RawFeedItem, og_budget: &mut usize) -> Option<String> {
        for candidate in raw.media_urls.iter().chain(&raw.enclosure_urls) {
            if let Some(url) = validated(candidate) {
                return Some(url);
            }
        }

        for markup in [&raw.content_html, &raw.summary_html].into_iter().flatten() {
            if let Some(url) = first_image_src(markup).filter(|u| is_valid_image_url(u)) {
                return Some(url);
            }
        }

        if *og_budget == 0 {
            return None;
        }
        let link = raw.link.as_deref()?;
        *og_budget -= 1;
        self.og_image(link).await
    }

    /// Last-resort OpenGraph lookup against the article page.
    ///
    /// All failures (timeout, HTTP error, unreadable body) resolve to
    /// `None`; a missing image is an expected outcome, not a fault.
    async fn og_image(&self, article_url: &str) -> Option<String> {
        let response = match tokio::time::timeout(
            self.og_timeout,
            self.client.get(article_url).send(),
        )
        .await
        {
            Ok(Ok(response)) if response.status().is_success() => response,
            Ok(Ok(response)) => {
                tracing::debug!(url = %article_url, status = %response.status(), "OpenGraph lookup refused");
                return None;
            }
            Ok(Err(e)) => {
                tracing::debug!(url = %article_url, error = %e, "OpenGraph lookup failed");
                return None;
            }
            Err(_) => {
                tracing::debug!(url = %article_url, "OpenGraph lookup timed out");
                return None;
            }
        };

        let head = read_page_head(response, MAX_ARTICLE_PAGE_BYTES).await?;
        og_image_hint(&head).filter(|u| is_valid_image_url(u))
    }
}

fn validated(candidate: &str) -> Option<String> {
    normalize_image_url(candidate).filter(|u| is_valid_image_url(u))
}

/// Reads up to `limit` bytes of the page body; a truncated read is fine —
/// the meta tags we want precede the cut.
async fn read_page_head(response: reqwest::Response, limit: usize) -> Option<String> {
    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.ok()?;
        bytes.extend_from_slice(&chunk);
        if bytes.len() >= limit {
            bytes.truncate(limit);
            break;
        }
    }
    Some(String::from_utf8_lossy(&bytes).into_owned())
}
