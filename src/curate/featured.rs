use std::collections::HashSet;

use crate::curate::filter::has_valid_link;
use crate::store::{Item, NewsDocument};

/// Assembles the aggregate "featured" view.
///
/// Pinned items first, in their editorial order, then every remaining
/// item in window order. Both halves require a syntactically valid
/// http(s) link — malformed-link items are silently excluded, not
/// errored.
pub fn featured_view(doc: &NewsDocument) -> Vec<Item> {
    let pinned: HashSet<&str> = doc
        .featured_priority
        .iter()
        .map(|item| item.guid.as_str())
        .collect();

    let mut view: Vec<Item> = doc
        .featured_priority
        .iter()
        .filter(|item| has_valid_link(item))
        .cloned()
        .collect();
    view.extend(
        doc.items
            .iter()
            .filter(|item| !pinned.contains(item.guid.as_str()))
            .filter(|item| has_valid_link(item))
            .cloned(),
    );
    view
}

/// Regenerates the featured priority by rotating through categories.
///
/// Takes the freshest unseen item from each rotation category in turn
/// until `count` is reached or every pool is dry. Within a category,
/// items carrying an image are preferred — the pool falls back to the
/// full category only when no item has one.
pub fn rotate_featured(items: &[Item], rotation: &[String], count: usize) -> Vec<Item> {
    let mut pools: Vec<Vec<&Item>> = rotation
        .iter()
        .map(|category| {
            let mut pool: Vec<&Item> = items
                .iter()
                .filter(|item| &item.category == category)
                .collect();
            pool.sort_by(|a, b| b.effective_date().cmp(&a.effective_date()));
            let with_image: Vec<&Item> =
                pool.iter().filter(|item| item.image.is_some()).copied().collect();
            if with_image.is_empty() {
                pool
            } else {
                with_image
            }
        })
        .collect();

    let mut pointers = vec![0usize; pools.len()];
    let mut seen: HashSet<&str> = HashSet::new();
    let mut featured = Vec::new();

    while featured.len() < count {
        let mut made_progress = false;
        for (pool, pointer) in pools.iter_mut().zip(pointers.iter_mut()) {
            if featured.len() >= count {
                break;
            }
            while *pointer < pool.len() {
                let candidate = pool[*pointer];
                *pointer += 1;
                if seen.insert(candidate.guid.as_str()) {
                    featured.push(candidate.clone());
                    made_progress = true;
                    break;
                }
            }
        }
        if !made_progress {
            break; // all pools exhausted before reaching count
        }
    }

    featured
}
