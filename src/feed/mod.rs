//! Feed retrieval: fetching, parsing, and image resolution.
//!
//! This module turns configured sources into transient [`RawFeedItem`]s:
//!
//! - [`fetcher`] - Concurrent HTTP retrieval with per-source fault isolation
//! - [`parser`] - RSS 2.0 / Atom parsing using the `feed-rs` crate
//! - [`image`] - Multi-strategy representative-image resolution
//!
//! Nothing here touches the persisted store; the ingest pipeline owns the
//! merge phase.

mod fetcher;
mod image;
mod parser;

pub use fetcher::{build_client, fetch_all, FetchError, SourceFetch};
pub use image::ImageResolver;
pub use parser::{parse_feed, RawFeedItem};
