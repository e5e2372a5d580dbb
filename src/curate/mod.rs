//! The read side: turning a persisted snapshot into presentable views.
//!
//! A [`Curator`] wraps one immutable snapshot of the news document plus
//! the curation config. Views are pure functions of that snapshot —
//! concurrent viewers are independent of each other and of any in-flight
//! ingestion run, at the cost of a slightly stale snapshot.
//!
//! - [`filter`] - category aliasing and the publisher denylist
//! - [`interleave`] - round-robin across publisher groups
//! - [`featured`] - the pinned aggregate view
//! - [`paginate`] - fixed-size batches over a curated sequence

mod featured;
mod filter;
mod interleave;
mod paginate;

pub use featured::{featured_view, rotate_featured};
pub use filter::{categories_for_view, filter_category, has_valid_link};
pub use interleave::interleave_by_source;
pub use paginate::{PageSession, SessionState};

use std::collections::{BTreeMap, HashMap};

use crate::config::CurateConfig;
use crate::store::{Item, NewsDocument};

/// The aggregate view name; everything else is treated as a category.
pub const FEATURED_VIEW: &str = "featured";

/// Read-side facade over one loaded snapshot.
pub struct Curator {
    doc: NewsDocument,
    config: CurateConfig,
    fallbacks: BTreeMap<String, String>,
}

impl Curator {
    pub fn new(
        doc: NewsDocument,
        config: CurateConfig,
        fallbacks: BTreeMap<String, String>,
    ) -> Self {
        Self {
            doc,
            config,
            fallbacks,
        }
    }

    /// Produces the fully-curated sequence for a view.
    ///
    /// `"featured"` yields the aggregate view (pinned items first); any
    /// other name is a category view: alias filter, denylist, per-source
    /// cap, then publisher interleave.
    pub fn view(&self, view: &str) -> Vec<Item> {
        if view == FEATURED_VIEW {
            featured_view(&self.doc)
        } else {
            self.category_view(view)
        }
    }

    /// Opens a page session over a view at the configured page size.
    pub fn session(&self, view: &str) -> PageSession {
        PageSession::new(self.view(view), self.config.page_size)
    }

    /// Category-level fallback image for items that resolved none.
    pub fn fallback_image(&self, category: &str) -> Option<&str> {
        self.fallbacks.get(category).map(String::as_str)
    }

    fn category_view(&self, view: &str) -> Vec<Item> {
        let mut items = filter_category(&self.doc.items, view, &self.config);
        items.sort_by(|a, b| b.effective_date().cmp(&a.effective_date()));

        // Per-publisher cap, applied newest-first so a capped publisher
        // keeps its freshest items.
        let mut counts: HashMap<String, usize> = HashMap::new();
        items.retain(|item| {
            let count = counts.entry(item.source.clone()).or_insert(0);
            *count += 1;
            *count <= self.config.max_per_source
        });

        interleave_by_source(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn item(guid: &str, category: &str, source: &str, days_ago: i64) -> Item {
        let date = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap() - Duration::days(days_ago);
        Item {
            guid: guid.to_string(),
            link: format!("https://example.com/{}", guid),
            title: guid.to_string(),
            summary: None,
            image: None,
            source: source.to_string(),
            category: category.to_string(),
            pub_date: Some(date),
            timestamp: date.timestamp(),
        }
    }

    fn curator(items: Vec<Item>) -> Curator {
        Curator::new(
            NewsDocument {
                featured_priority: Vec::new(),
                items,
            },
            CurateConfig::default(),
            BTreeMap::new(),
        )
    }

    #[test]
    fn test_category_view_caps_per_source() {
        let mut items: Vec<Item> = (0..12)
            .map(|i| item(&format!("m{}", i), "streaming", "Mux", i))
            .collect();
        items.push(item("w1", "streaming", "Wowza", 1));

        let view = curator(items).view("streaming");
        let mux = view.iter().filter(|i| i.source == "Mux").count();
        assert_eq!(mux, 8, "per-source cap should bound Mux's contribution");
        assert_eq!(view.len(), 9);
    }

    #[test]
    fn test_capped_publisher_keeps_freshest() {
        let items: Vec<Item> = (0..10)
            .map(|i| item(&format!("m{}", i), "streaming", "Mux", i))
            .collect();

        let view = curator(items).view("streaming");
        assert!(view.iter().any(|i| i.guid == "m0"), "freshest item kept");
        assert!(!view.iter().any(|i| i.guid == "m9"), "oldest item capped out");
    }

    #[test]
    fn test_view_dispatches_featured() {
        let c = Curator::new(
            NewsDocument {
                featured_priority: vec![item("pin", "playout", "Pebble", 3)],
                items: vec![item("a", "cloud", "AWS Media", 1)],
            },
            CurateConfig::default(),
            BTreeMap::new(),
        );
        let view = c.view("featured");
        assert_eq!(view[0].guid, "pin");
    }

    #[test]
    fn test_session_uses_configured_page_size() {
        let items: Vec<Item> = (0..45)
            .map(|i| item(&format!("g{}", i), "streaming", &format!("S{}", i % 5), i))
            .collect();
        let c = curator(items);
        let mut session = c.session("streaming");
        assert_eq!(session.next_batch().len(), 20);
        assert_eq!(session.next_batch().len(), 20);
        assert_eq!(session.next_batch().len(), 5);
        assert!(session.next_batch().is_empty());
    }

    #[test]
    fn test_fallback_image_lookup() {
        let mut fallbacks = BTreeMap::new();
        fallbacks.insert(
            "cloud".to_string(),
            "https://images.example.com/cloud.jpg".to_string(),
        );
        let c = Curator::new(NewsDocument::default(), CurateConfig::default(), fallbacks);
        assert_eq!(
            c.fallback_image("cloud"),
            Some("https://images.example.com/cloud.jpg")
        );
        assert_eq!(c.fallback_image("graphics"), None);
    }
}
