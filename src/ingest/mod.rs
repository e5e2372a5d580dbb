//! The write side: one scheduled ingestion run.
//!
//! A run is a single-writer transaction over the persisted stores:
//!
//! fetch (concurrent, fault-isolated) → resolve images → normalize →
//! dedup → merge → archive old/excess → atomic save
//!
//! The run lock serializes overlapping runs; a corrupt store aborts the
//! run before any write so existing good data is never truncated.

mod archive;
mod dedup;
mod lock;
mod normalize;

pub use archive::{evict, Eviction};
pub use dedup::filter_new;
pub use lock::{LockError, RunLock, DEFAULT_MAX_RUN};
pub use normalize::{normalize, UNTITLED};

use std::time::Duration;

use chrono::Utc;
use thiserror::Error;

use crate::config::Config;
use crate::curate::rotate_featured;
use crate::feed::{build_client, fetch_all, ImageResolver};
use crate::store::{JsonStore, NewsDocument, StoreError};

/// Errors that abort an ingestion run.
///
/// Per-source fetch and parse failures are NOT here — those are isolated
/// and absorbed into the report. A run only fails when it cannot start
/// (lock, client) or cannot trust the persisted data (store).
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Summary of one ingestion run, for logs and the CLI.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub sources_total: usize,
    pub sources_failed: usize,
    pub entries_fetched: usize,
    pub new_items: usize,
    pub evicted: usize,
    pub current_len: usize,
    pub archive_appended: usize,
}

/// Executes one full ingestion run against the configured store.
///
/// # Errors
///
/// [`IngestError::Lock`] when another run holds the lock;
/// [`IngestError::Store`] when a persisted file is unreadable or corrupt
/// (the run aborts without writing anything).
pub async fn run(config: &Config) -> Result<IngestReport, IngestError> {
    let _lock = RunLock::acquire(&config.data_dir, DEFAULT_MAX_RUN)?;

    let store = JsonStore::new(&config.data_dir);
    let doc = store.load()?;
    let archived = store.load_archive()?;

    let client = build_client()?;
    let resolver = ImageResolver::new(
        client.clone(),
        Duration::from_secs(config.fetch.og_timeout_secs),
    );

    let sources = config.feed_sources();
    let sources_total = sources.len();
    let fetches = fetch_all(&client, sources, &config.fetch).await;

    let now = Utc::now();
    let mut batch = Vec::new();
    let mut sources_failed = 0;
    let mut entries_fetched = 0;

    for fetch in fetches {
        match fetch.result {
            Ok(raws) => {
                let mut og_budget = config.fetch.og_fetches_per_feed;
                for raw in raws {
                    entries_fetched += 1;
                    let image = resolver.resolve(&raw, &mut og_budget).await;
                    batch.push(normalize(raw, &fetch.source, image, now));
                }
            }
            Err(_) => sources_failed += 1,
        }
    }

    let fresh = filter_new(batch, &doc.items, &archived);
    let new_items = fresh.len();

    // Merge newest-first: this run's items precede the existing window.
    let mut merged = fresh;
    merged.extend(doc.items);

    let eviction = evict(
        merged,
        now,
        chrono::Duration::days(config.window.max_age_days),
        config.window.max_items,
    );

    // Archive before the trimmed window: a crash between the two writes
    // leaves an evicted item present twice on disk, and the idempotent
    // append repairs that on the next run — the reverse order could lose
    // the item entirely.
    let archive_appended = store.append_archive(&eviction.evicted)?;

    let featured_priority = rotate_featured(
        &eviction.kept,
        &config.curate.featured_rotation,
        config.curate.featured_count,
    );
    let current_len = eviction.kept.len();
    store.save(&NewsDocument {
        featured_priority,
        items: eviction.kept,
    })?;

    let report = IngestReport {
        sources_total,
        sources_failed,
        entries_fetched,
        new_items,
        evicted: eviction.evicted.len(),
        current_len,
        archive_appended,
    };
    tracing::info!(
        sources = report.sources_total,
        failed = report.sources_failed,
        fetched = report.entries_fetched,
        new = report.new_items,
        evicted = report.evicted,
        window = report.current_len,
        "Ingestion run complete"
    );
    Ok(report)
}
