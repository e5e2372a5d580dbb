use std::collections::HashSet;

use crate::store::Item;

/// Filters a batch of freshly-normalized items down to those whose
/// identity key is not already present in the current window or the
/// archive.
///
/// Pure set-membership, first-write-wins: a duplicate inside the batch
/// keeps its first occurrence, and an existing item's fields are never
/// updated by a later duplicate.
pub fn filter_new(batch: Vec<Item>, current: &[Item], archive: &[Item]) -> Vec<Item> {
    let mut seen: HashSet<String> = current
        .iter()
        .chain(archive)
        .map(|item| item.guid.clone())
        .collect();

    let before = batch.len();
    let fresh: Vec<Item> = batch
        .into_iter()
        .filter(|item| seen.insert(item.guid.clone()))
        .collect();

    if fresh.len() < before {
        tracing::debug!(
            incoming = before,
            kept = fresh.len(),
            dropped = before - fresh.len(),
            "Deduplicated batch against existing stores"
        );
    }
    fresh
}
