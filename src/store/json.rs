use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::store::types::{Item, NewsDocument, PersistedShape, StoreError};

/// JSON-file-backed store for the current window and the archive.
///
/// The store owns exactly two files under its data directory:
///
/// - `news.json` — the [`NewsDocument`] (current window + featured priority)
/// - `archive.json` — a bare array of evicted [`Item`]s, append-only
///
/// All writes are atomic (write-to-temp-then-rename), so readers of the
/// persisted JSON always observe a complete document. A corrupt file on
/// read surfaces as [`StoreError::Corrupt`] and must abort the run — the
/// store never replaces data it could not read.
#[derive(Debug, Clone)]
pub struct JsonStore {
    data_dir: PathBuf,
    news_path: PathBuf,
    archive_path: PathBuf,
}

impl JsonStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let news_path = data_dir.join("news.json");
        let archive_path = data_dir.join("archive.json");
        Self {
            data_dir,
            news_path,
            archive_path,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Loads the news document.
    ///
    /// A missing file yields an empty document (first run). Both the current
    /// document shape and the legacy bare-array shape are accepted.
    ///
    /// # Errors
    ///
    /// [`StoreError::Corrupt`] when the file exists but does not parse —
    /// callers abort the run rather than overwrite.
    pub fn load(&self) -> Result<NewsDocument, StoreError> {
        match self.read_file(&self.news_path)? {
            None => Ok(NewsDocument::default()),
            Some(content) => serde_json::from_str::<PersistedShape>(&content)
                .map(NewsDocument::from)
                .map_err(|source| StoreError::Corrupt {
                    path: self.news_path.clone(),
                    source,
                }),
        }
    }

    /// Loads the archive. Missing file yields an empty archive.
    pub fn load_archive(&self) -> Result<Vec<Item>, StoreError> {
        match self.read_file(&self.archive_path)? {
            None => Ok(Vec::new()),
            Some(content) => {
                serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
                    path: self.archive_path.clone(),
                    source,
                })
            }
        }
    }

    /// Atomically persists the news document.
    pub fn save(&self, doc: &NewsDocument) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(doc).expect("NewsDocument serialization is total");
        self.atomic_write(&self.news_path, &json)
    }

    /// Appends evicted items to the archive, skipping guids already present.
    ///
    /// Idempotent by identity key: re-appending after a crashed run cannot
    /// produce duplicates. Returns the number of items actually appended.
    pub fn append_archive(&self, evicted: &[Item]) -> Result<usize, StoreError> {
        if evicted.is_empty() {
            return Ok(0);
        }

        let mut archive = self.load_archive()?;
        let existing: HashSet<&str> = archive.iter().map(|item| item.guid.as_str()).collect();
        let fresh: Vec<Item> = evicted
            .iter()
            .filter(|item| !existing.contains(item.guid.as_str()))
            .cloned()
            .collect();
        let appended = fresh.len();
        archive.extend(fresh);

        let json = serde_json::to_vec_pretty(&archive).expect("Item serialization is total");
        self.atomic_write(&self.archive_path, &json)?;
        Ok(appended)
    }

    fn read_file(&self, path: &Path) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Atomic write via write-to-temp-then-rename.
    ///
    /// SEC-003: the temp filename carries a clock-derived suffix and is
    /// opened with `create_new`, so a concurrent writer or a planted symlink
    /// fails the open instead of clobbering data. POSIX rename makes the
    /// final replace atomic on the same filesystem.
    fn atomic_write(&self, path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        let write_err = |source: std::io::Error| StoreError::Write {
            path: path.to_path_buf(),
            source,
        };

        std::fs::create_dir_all(&self.data_dir).map_err(write_err)?;

        use std::time::{SystemTime, UNIX_EPOCH};
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let temp_path = path.with_extension(format!("tmp.{:016x}", suffix));

        let mut temp_file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .map_err(write_err)?;

        let result = temp_file
            .write_all(bytes)
            .and_then(|_| temp_file.sync_all());
        if let Err(source) = result {
            let _ = std::fs::remove_file(&temp_path);
            return Err(write_err(source));
        }
        drop(temp_file);

        std::fs::rename(&temp_path, path).map_err(|source| {
            let _ = std::fs::remove_file(&temp_path);
            write_err(source)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_item(guid: &str) -> Item {
        Item {
            guid: guid.to_string(),
            link: format!("https://example.com/{}", guid),
            title: format!("Title {}", guid),
            summary: Some("A summary.".into()),
            image: None,
            source: "Example".into(),
            category: "newsroom".into(),
            pub_date: None,
            timestamp: 1_700_000_000,
        }
    }

    fn temp_store(name: &str) -> JsonStore {
        let dir = std::env::temp_dir().join(format!("newsreel_store_test_{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        JsonStore::new(dir)
    }

    #[test]
    fn test_missing_files_yield_empty_stores() {
        let store = temp_store("missing");
        assert!(store.load().unwrap().items.is_empty());
        assert!(store.load_archive().unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_preserves_item_order() {
        let store = temp_store("roundtrip");
        let doc = NewsDocument {
            featured_priority: vec![test_item("f1")],
            items: vec![test_item("a"), test_item("b"), test_item("c")],
        };
        store.save(&doc).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.items, doc.items);
        assert_eq!(loaded.featured_priority, doc.featured_priority);

        std::fs::remove_dir_all(store.data_dir()).ok();
    }

    #[test]
    fn test_legacy_array_file_loads() {
        let store = temp_store("legacy");
        std::fs::create_dir_all(store.data_dir()).unwrap();
        let legacy = serde_json::to_string(&vec![test_item("old")]).unwrap();
        std::fs::write(store.data_dir().join("news.json"), legacy).unwrap();

        let doc = store.load().unwrap();
        assert_eq!(doc.items.len(), 1);
        assert_eq!(doc.items[0].guid, "old");
        assert!(doc.featured_priority.is_empty());

        std::fs::remove_dir_all(store.data_dir()).ok();
    }

    #[test]
    fn test_corrupt_news_file_is_fatal_and_untouched() {
        let store = temp_store("corrupt");
        std::fs::create_dir_all(store.data_dir()).unwrap();
        let news_path = store.data_dir().join("news.json");
        std::fs::write(&news_path, "{not json at all").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));

        // The corrupt file must survive the failed read untouched.
        let on_disk = std::fs::read_to_string(&news_path).unwrap();
        assert_eq!(on_disk, "{not json at all");

        std::fs::remove_dir_all(store.data_dir()).ok();
    }

    #[test]
    fn test_append_archive_skips_existing_guids() {
        let store = temp_store("archive_dedup");
        let first = store.append_archive(&[test_item("x"), test_item("y")]).unwrap();
        assert_eq!(first, 2);

        let second = store.append_archive(&[test_item("y"), test_item("z")]).unwrap();
        assert_eq!(second, 1);

        let archive = store.load_archive().unwrap();
        let guids: Vec<&str> = archive.iter().map(|i| i.guid.as_str()).collect();
        assert_eq!(guids, vec!["x", "y", "z"]);

        std::fs::remove_dir_all(store.data_dir()).ok();
    }

    #[test]
    fn test_append_archive_empty_is_noop() {
        let store = temp_store("archive_noop");
        assert_eq!(store.append_archive(&[]).unwrap(), 0);
        // No directory or file should have been created for a no-op.
        assert!(store.load_archive().unwrap().is_empty());
    }

    #[test]
    fn test_save_overwrites_atomically() {
        let store = temp_store("atomic");
        let doc_a = NewsDocument {
            featured_priority: Vec::new(),
            items: vec![test_item("a")],
        };
        let doc_b = NewsDocument {
            featured_priority: Vec::new(),
            items: vec![test_item("b")],
        };
        store.save(&doc_a).unwrap();
        store.save(&doc_b).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.items[0].guid, "b");

        // No stray temp files left behind.
        let leftovers: Vec<_> = std::fs::read_dir(store.data_dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp."))
            .collect();
        assert!(leftovers.is_empty());

        std::fs::remove_dir_all(store.data_dir()).ok();
    }
}
