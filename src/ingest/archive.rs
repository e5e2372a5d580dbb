use std::cmp::Reverse;
use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use crate::store::Item;

/// Result of an eviction pass: the surviving window and the items moved
/// to the archive. Every input item lands in exactly one of the two.
#[derive(Debug)]
pub struct Eviction {
    pub kept: Vec<Item>,
    pub evicted: Vec<Item>,
}

/// Applies the window bounds to the merged item list.
///
/// Two rules, in order:
///
/// 1. Any item whose age (from its effective date — pubDate, else
///    ingestion time) exceeds `max_age` moves to the archive.
/// 2. If the window still exceeds `cap`, the oldest remaining items are
///    evicted (ascending effective date, ties broken by ascending
///    ingestion order) until the cap holds.
///
/// Eviction is a move, never a copy or deletion. The kept list preserves
/// its input order, so the persisted window stays in recency/insertion
/// order.
pub fn evict(items: Vec<Item>, now: DateTime<Utc>, max_age: Duration, cap: usize) -> Eviction {
    let cutoff = now - max_age;

    let mut kept = Vec::with_capacity(items.len());
    let mut evicted = Vec::new();
    for item in items {
        if item.effective_date() < cutoff {
            evicted.push(item);
        } else {
            kept.push(item);
        }
    }

    if kept.len() > cap {
        let excess = kept.len() - cap;
        // The window is ordered newest-insertion-first, so ascending
        // ingestion order means walking it from the back: Reverse(index)
        // breaks effective-date ties toward the earlier-ingested item.
        let mut order: Vec<usize> = (0..kept.len()).collect();
        order.sort_by_key(|&i| (kept[i].effective_date(), kept[i].timestamp, Reverse(i)));
        let doomed: HashSet<usize> = order.into_iter().take(excess).collect();

        let mut survivors = Vec::with_capacity(cap);
        for (i, item) in kept.into_iter().enumerate() {
            if doomed.contains(&i) {
                evicted.push(item);
            } else {
                survivors.push(item);
            }
        }
        kept = survivors;
    }

    Eviction { kept, evicted }
}
