//! Category-tagged RSS/Atom aggregation for a content vertical.
//!
//! The crate ingests configured feeds, deduplicates entries by identity
//! key, resolves a representative image per entry, and maintains a bounded
//! rolling window of current items plus an unbounded archive, persisted as
//! JSON. The read side curates that JSON into category and featured views
//! with publisher interleaving and pagination.
//!
//! Pipeline, leaf-first:
//!
//! [`config`] (source registry) → [`feed`] (fetch, parse, image) →
//! [`ingest`] (normalize, dedup, archive, atomic save) → [`store`]
//! (persisted JSON) → [`curate`] (views for the presentation layer)

pub mod config;
pub mod curate;
pub mod feed;
pub mod ingest;
pub mod store;
pub mod util;

pub use config::Config;
pub use curate::Curator;
pub use ingest::{IngestError, IngestReport};
pub use store::{Item, JsonStore, NewsDocument};
