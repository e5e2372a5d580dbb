use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Store-level errors.
///
/// `Corrupt` is deliberately separate from `Io`: an unreadable or invalid
/// store file must abort the run so existing good data is never overwritten.
/// Truncating on read failure is the one unrecoverable mistake this layer
/// guards against.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading a store file failed below the JSON layer.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A store file exists but does not parse as any accepted shape.
    #[error("Store file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Writing or renaming a store file failed.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// Data Structures
// ============================================================================

/// A normalized, deduplicated unit of content derived from one feed entry.
///
/// Items are immutable once created: after normalization the only state
/// change they undergo is store membership (current → archive, one-way).
/// `guid` is the identity key — the feed's guid when present, else the link.
///
/// `timestamp` records ingestion time (unix seconds). `pub_date` is the
/// publisher's date when one was present and parseable; age and ordering
/// decisions use [`Item::effective_date`], which falls back to ingestion
/// time, so an item without a pubDate is never treated as infinitely old.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub guid: String,
    pub link: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub source: String,
    pub category: String,
    #[serde(rename = "pubDate", default, skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<DateTime<Utc>>,
    pub timestamp: i64,
}

impl Item {
    /// The date used for age and ordering: pubDate when present, else
    /// ingestion time.
    pub fn effective_date(&self) -> DateTime<Utc> {
        self.pub_date.unwrap_or_else(|| {
            DateTime::<Utc>::from_timestamp(self.timestamp, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
        })
    }
}

/// The persisted news document: the current window plus the pinned
/// featured ordering.
///
/// Both fields default to empty so `{}` and partial documents deserialize
/// cleanly; the legacy bare-array shape is handled by [`PersistedShape`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsDocument {
    #[serde(default)]
    pub featured_priority: Vec<Item>,
    #[serde(default)]
    pub items: Vec<Item>,
}

/// Accepted on-disk shapes for the news file.
///
/// Earlier deployments persisted a bare top-level array (the current window
/// only). Reads accept both; writes always produce the document shape.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum PersistedShape {
    Document(NewsDocument),
    Legacy(Vec<Item>),
}

impl From<PersistedShape> for NewsDocument {
    fn from(shape: PersistedShape) -> Self {
        match shape {
            PersistedShape::Document(doc) => doc,
            PersistedShape::Legacy(items) => NewsDocument {
                featured_priority: Vec::new(),
                items,
            },
        }
    }
}
