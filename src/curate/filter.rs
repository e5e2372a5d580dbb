use std::collections::{BTreeMap, HashSet};

use url::Url;

use crate::config::CurateConfig;
use crate::store::Item;

/// Item categories admitted into a view.
///
/// The alias table widens a view beyond its own name — "cloud" also admits
/// the historical "cloud-production" tag, "infrastructure" admits
/// "security". A view absent from the table matches its own name only.
pub fn categories_for_view(view: &str, aliases: &BTreeMap<String, Vec<String>>) -> HashSet<String> {
    match aliases.get(view) {
        Some(accepted) => accepted.iter().cloned().collect(),
        None => std::iter::once(view.to_string()).collect(),
    }
}

/// Filters items down to a category view.
///
/// Applies the alias table, then the publisher denylist — a generic outlet
/// stays out of a specialist category even when the upstream feed tagged it
/// in. Order is preserved; idempotent by construction (filtering a filtered
/// set again returns the identical set).
pub fn filter_category(items: &[Item], view: &str, config: &CurateConfig) -> Vec<Item> {
    let accepted = categories_for_view(view, &config.aliases);
    items
        .iter()
        .filter(|item| accepted.contains(&item.category))
        .filter(|item| !config.deny_sources.iter().any(|deny| deny == &item.source))
        .cloned()
        .collect()
}

/// True when the item carries a syntactically valid http(s) link.
///
/// Used by the featured view to silently exclude malformed-link items
/// rather than erroring on them.
pub fn has_valid_link(item: &Item) -> bool {
    Url::parse(&item.link)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(guid: &str, category: &str, source: &str) -> Item {
        Item {
            guid: guid.to_string(),
            link: format!("https://example.com/{}", guid),
            title: guid.to_string(),
            summary: None,
            image: None,
            source: source.to_string(),
            category: category.to_string(),
            pub_date: None,
            timestamp: 1_700_000_000,
        }
    }

    fn config() -> CurateConfig {
        CurateConfig::default()
    }

    #[test]
    fn test_plain_category_filter() {
        let items = vec![
            item("a", "streaming", "Mux"),
            item("b", "playout", "Pebble"),
        ];
        let filtered = filter_category(&items, "streaming", &config());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].guid, "a");
    }

    #[test]
    fn test_alias_admits_related_tags() {
        let items = vec![
            item("a", "cloud", "AWS Media"),
            item("b", "cloud-production", "Frame.io"),
            item("c", "infrastructure", "Broadcast Bridge"),
            item("d", "security", "Broadcast Bridge"),
        ];
        let cloud = filter_category(&items, "cloud", &config());
        let guids: Vec<&str> = cloud.iter().map(|i| i.guid.as_str()).collect();
        assert_eq!(guids, vec!["a", "b"]);

        let infra = filter_category(&items, "infrastructure", &config());
        let guids: Vec<&str> = infra.iter().map(|i| i.guid.as_str()).collect();
        assert_eq!(guids, vec!["c", "d"]);
    }

    #[test]
    fn test_denylist_removes_mis_tagged_generics() {
        let items = vec![
            item("a", "streaming", "Mux"),
            item("b", "streaming", "TechCrunch"),
        ];
        let filtered = filter_category(&items, "streaming", &config());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].source, "Mux");
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let items = vec![
            item("a", "cloud", "AWS Media"),
            item("b", "cloud-production", "Frame.io"),
            item("c", "streaming", "Mux"),
        ];
        let once = filter_category(&items, "cloud", &config());
        let twice = filter_category(&once, "cloud", &config());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unknown_view_matches_own_name_only() {
        let accepted = categories_for_view("graphics", &config().aliases);
        assert_eq!(accepted.len(), 1);
        assert!(accepted.contains("graphics"));
    }

    #[test]
    fn test_valid_link_predicate() {
        let mut ok = item("a", "newsroom", "X");
        assert!(has_valid_link(&ok));

        ok.link = "not a url".to_string();
        assert!(!has_valid_link(&ok));

        ok.link = "ftp://example.com/a".to_string();
        assert!(!has_valid_link(&ok));

        ok.link = String::new();
        assert!(!has_valid_link(&ok));
    }
}
