//! Configuration file parser for the aggregator.
//!
//! The config file is optional — a missing file yields `Config::default()`,
//! which carries the full set of pipeline knobs but an empty source
//! registry (an ingestion run over zero sources is a no-op, not an error).
//! Unknown keys are silently ignored by serde, though we log a warning when
//! the file contains potential typos.
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-001: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// A configured (category, URL) pair identifying a publisher's feed.
///
/// The publisher label travels with the source: the normalizer stamps it
/// onto every item from this feed rather than re-deriving it from content.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSource {
    pub category: String,
    pub url: String,
    pub label: String,
}

/// One feed under a category heading in the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceEntry {
    pub url: String,
    pub label: String,
}

/// Fetch-phase knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Width of the concurrent fetch pool.
    pub concurrency: usize,
    /// Entries taken per feed per run.
    pub max_items_per_feed: usize,
    /// OpenGraph article-page lookups allowed per feed per run.
    pub og_fetches_per_feed: usize,
    /// Timeout for OpenGraph article-page lookups, in seconds.
    pub og_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            concurrency: 8,
            max_items_per_feed: 20,
            og_fetches_per_feed: 8,
            og_timeout_secs: 5,
        }
    }
}

/// Bounds on the current window.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Maximum items in the current window.
    pub max_items: usize,
    /// Maximum age in days before an item moves to the archive.
    pub max_age_days: i64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            max_items: 100,
            max_age_days: 30,
        }
    }
}

/// Read-side curation knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CurateConfig {
    /// Batch size for paginated views.
    pub page_size: usize,
    /// Cap on any single publisher's items within one category view.
    pub max_per_source: usize,
    /// View name → accepted item categories. A view absent from the table
    /// matches its own name only.
    pub aliases: BTreeMap<String, Vec<String>>,
    /// Publisher labels excluded from category views even when upstream
    /// tagged them into the category.
    pub deny_sources: Vec<String>,
    /// Categories rotated through when regenerating the featured priority.
    pub featured_rotation: Vec<String>,
    /// Number of items pinned at the top of the featured view.
    pub featured_count: usize,
}

impl Default for CurateConfig {
    fn default() -> Self {
        let mut aliases = BTreeMap::new();
        aliases.insert(
            "cloud".to_string(),
            vec!["cloud".to_string(), "cloud-production".to_string()],
        );
        aliases.insert(
            "infrastructure".to_string(),
            vec!["infrastructure".to_string(), "security".to_string()],
        );
        Self {
            page_size: 20,
            max_per_source: 8,
            aliases,
            deny_sources: vec![
                "Technology News".to_string(),
                "TechCrunch".to_string(),
                "Engadget".to_string(),
                "WIRED".to_string(),
            ],
            featured_rotation: vec![
                "playout".to_string(),
                "infrastructure".to_string(),
                "ai-post-production".to_string(),
                "cloud".to_string(),
            ],
            featured_count: 10,
        }
    }
}

/// Category-level fallback imagery, applied by the presentation layer when
/// an item resolved no image of its own.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub fallbacks: BTreeMap<String, String>,
}

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be
/// specified. Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding news.json, archive.json, and the run lock.
    pub data_dir: PathBuf,

    pub fetch: FetchConfig,
    pub window: WindowConfig,
    pub curate: CurateConfig,
    pub images: ImageConfig,

    /// Category → feeds. The source registry is static configuration;
    /// nothing in the pipeline ever mutates it.
    pub sources: BTreeMap<String, Vec<SourceEntry>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            fetch: FetchConfig::default(),
            window: WindowConfig::default(),
            curate: CurateConfig::default(),
            images: ImageConfig::default(),
            sources: BTreeMap::new(),
        }
    }
}

impl Config {
    /// SEC-001: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse as a raw table first to detect unknown top-level keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = ["data_dir", "fetch", "window", "curate", "images", "sources"];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            categories = config.sources.len(),
            feeds = config.sources.values().map(Vec::len).sum::<usize>(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Flattens the source registry into fetchable [`FeedSource`]s.
    ///
    /// Entries whose URL does not parse as http(s) are dropped with a
    /// warning — a misconfigured source contributes zero items rather than
    /// failing the run.
    pub fn feed_sources(&self) -> Vec<FeedSource> {
        let mut sources = Vec::new();
        for (category, entries) in &self.sources {
            for entry in entries {
                match Url::parse(&entry.url) {
                    Ok(url) if matches!(url.scheme(), "http" | "https") => {
                        sources.push(FeedSource {
                            category: category.clone(),
                            url: entry.url.clone(),
                            label: entry.label.clone(),
                        });
                    }
                    Ok(url) => {
                        tracing::warn!(
                            category = %category,
                            url = %entry.url,
                            scheme = %url.scheme(),
                            "Skipping source with non-http(s) scheme"
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            category = %category,
                            url = %entry.url,
                            error = %e,
                            "Skipping source with unparseable URL"
                        );
                    }
                }
            }
        }
        sources
    }
}

// ============================================================================
// Tests
// ============================================================================
