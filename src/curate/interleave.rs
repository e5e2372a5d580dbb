use std::collections::HashMap;

use crate::store::Item;

/// Round-robin interleave by publisher.
///
/// Items are grouped by source (groups keep first-seen order), each group
/// is sorted newest-first, then one item is taken from each group in turn.
/// No single prolific publisher can dominate the head of the list: with
/// publishers A (5 items) and B (1 item), B's item lands within the first
/// two positions instead of after all of A's.
pub fn interleave_by_source(items: Vec<Item>) -> Vec<Item> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<Item>> = HashMap::new();
    for item in items {
        if !buckets.contains_key(&item.source) {
            order.push(item.source.clone());
        }
        buckets.entry(item.source.clone()).or_default().push(item);
    }

    for bucket in buckets.values_mut() {
        bucket.sort_by(|a, b| b.effective_date().cmp(&a.effective_date()));
    }

    let rounds = buckets.values().map(Vec::len).max().unwrap_or(0);
    let total = buckets.values().map(Vec::len).sum();
    let mut result = Vec::with_capacity(total);
    for round in 0..rounds {
        for source in &order {
            if let Some(item) = buckets.get(source).and_then(|bucket| bucket.get(round)) {
                result.push(item.clone());
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;

    fn item(guid: &str, source: &str, days_ago: i64) -> Item {
        let date = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap() - Duration::days(days_ago);
        Item {
            guid: guid.to_string(),
            link: format!("https://example.com/{}", guid),
            title: guid.to_string(),
            summary: None,
            image: None,
            source: source.to_string(),
            category: "newsroom".to_string(),
            pub_date: Some(date),
            timestamp: date.timestamp(),
        }
    }

    #[test]
    fn test_minor_publisher_surfaces_early() {
        let items = vec![
            item("a1", "A", 1),
            item("a2", "A", 2),
            item("a3", "A", 3),
            item("a4", "A", 4),
            item("a5", "A", 5),
            item("b1", "B", 1),
        ];
        let result = interleave_by_source(items);
        let position = result.iter().position(|i| i.guid == "b1").unwrap();
        assert!(
            position < 2,
            "B's single item should be within the first 2 positions, was at {}",
            position
        );
    }

    #[test]
    fn test_each_bucket_emitted_newest_first() {
        let items = vec![item("old", "A", 10), item("new", "A", 1), item("mid", "A", 5)];
        let result = interleave_by_source(items);
        let guids: Vec<&str> = result.iter().map(|i| i.guid.as_str()).collect();
        assert_eq!(guids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_round_robin_alternates_sources() {
        let items = vec![
            item("a1", "A", 1),
            item("a2", "A", 2),
            item("b1", "B", 1),
            item("b2", "B", 2),
        ];
        let result = interleave_by_source(items);
        let sources: Vec<&str> = result.iter().map(|i| i.source.as_str()).collect();
        assert_eq!(sources, vec!["A", "B", "A", "B"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(interleave_by_source(Vec::new()).is_empty());
    }

    proptest! {
        /// Interleaving reorders, it never adds or drops.
        #[test]
        fn prop_output_is_permutation(
            entries in proptest::collection::vec((0usize..5, 0i64..30), 0..40)
        ) {
            let items: Vec<Item> = entries
                .iter()
                .enumerate()
                .map(|(n, (src, days))| item(&format!("g{}", n), &format!("S{}", src), *days))
                .collect();

            let mut before: Vec<String> = items.iter().map(|i| i.guid.clone()).collect();
            let result = interleave_by_source(items);
            let mut after: Vec<String> = result.iter().map(|i| i.guid.clone()).collect();

            before.sort();
            after.sort();
            prop_assert_eq!(before, after);
        }
    }
}
