//! Utility functions for common operations.
//!
//! This module provides reusable utilities for:
//!
//! - **Image URL validation**: scheme and substring checks that keep tracking
//!   pixels, avatars, and data URIs out of the persisted store
//! - **Markup scanning**: `<img>` and OpenGraph extraction from feed HTML
//!
//! # Examples
//!
//! ```
//! use newsreel::util::{is_valid_image_url, first_image_src};
//!
//! assert!(is_valid_image_url("https://cdn.example.com/photo.jpg"));
//! assert!(!is_valid_image_url("data:image/gif;base64,AAAA"));
//!
//! let src = first_image_src(r#"<p><img src="https://cdn.example.com/a.png"></p>"#);
//! assert_eq!(src.as_deref(), Some("https://cdn.example.com/a.png"));
//! ```

mod html;
mod image_url;

pub use html::{clean_summary, first_image_src, og_image_hint, strip_tags};
pub use image_url::{is_valid_image_url, normalize_image_url};

/// Maximum length of a generated summary — shared by the normalizer and its tests
pub const MAX_SUMMARY_LENGTH: usize = 200;
