//! Persistence layer: the current window and archive as JSON documents.
//!
//! The single shared JSON file of earlier deployments is wrapped in an
//! explicit store abstraction with a load → merge → archive → atomic-save
//! discipline. Writers go through [`JsonStore`]; readers treat whatever
//! they loaded as an immutable snapshot.

mod json;
mod types;

pub use json::JsonStore;
pub use types::{Item, NewsDocument, StoreError};
