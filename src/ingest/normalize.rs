use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::config::FeedSource;
use crate::feed::RawFeedItem;
use crate::store::Item;
use crate::util::{clean_summary, MAX_SUMMARY_LENGTH};

/// Placeholder title for entries that arrived without one.
pub const UNTITLED: &str = "Untitled";

/// Builds a canonical [`Item`] from a raw entry and its source.
///
/// Category and publisher label come from the [`FeedSource`] — they are
/// configuration, never re-derived from feed content. Missing fields
/// default safely instead of failing: an entry with no title is still
/// worth ingesting.
///
/// The resulting record is immutable; nothing downstream ever rewrites a
/// field, only store membership changes.
pub fn normalize(
    raw: RawFeedItem,
    source: &FeedSource,
    image: Option<String>,
    fetched_at: DateTime<Utc>,
) -> Item {
    let guid = identity_key(
        raw.guid.as_deref(),
        raw.link.as_deref(),
        raw.title.as_deref(),
        raw.published,
    );
    let title = raw
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());
    let summary = raw
        .content_html
        .as_deref()
        .or(raw.summary_html.as_deref())
        .and_then(|markup| clean_summary(markup, MAX_SUMMARY_LENGTH));

    Item {
        guid,
        link: raw.link.unwrap_or_default(),
        title,
        summary,
        image,
        source: source.label.clone(),
        category: source.category.clone(),
        pub_date: raw.published,
        timestamp: fetched_at.timestamp(),
    }
}

/// Identity key: guid if present, else link, else a content digest.
///
/// The digest fallback keys on link|title|published so the same entry
/// hashes identically on every run — a wall-clock fallback would defeat
/// deduplication entirely.
fn identity_key(
    guid: Option<&str>,
    link: Option<&str>,
    title: Option<&str>,
    published: Option<DateTime<Utc>>,
) -> String {
    if let Some(guid) = guid {
        let trimmed = guid.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    if let Some(link) = link {
        let trimmed = link.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let input = format!(
        "{}|{}|{}",
        link.unwrap_or(""),
        title.unwrap_or(""),
        published.map(|p| p.timestamp().to_string()).unwrap_or_default()
    );
    let hash = Sha256::digest(input.as_bytes());
    format!("{:x}", hash)
}
