/// Substrings that mark a URL as a non-representative image.
///
/// Covers tracking pixels and beacons, spacer/blank assets, person photos
/// (avatars, gravatars), inline data URIs, and the generic fallback assets
/// some publishers serve when an article has no photo of its own.
const REJECT_SUBSTRINGS: &[&str] = &[
    "1x1",
    "pixel",
    "tracker",
    "beacon",
    "spacer",
    "blank",
    "placeholder",
    "default",
    "avatar",
    "gravatar",
    "data:image",
    "base64",
];

/// Normalizes a candidate image URL extracted from feed markup.
///
/// Trims surrounding whitespace and upgrades protocol-relative URLs
/// (`//cdn.example.com/a.jpg`) to https. Returns `None` for empty input.
// EDGE-001: Protocol-relative URLs are common in WordPress feed markup and
// would otherwise fail the scheme check below.
pub fn normalize_image_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(rest) = trimmed.strip_prefix("//") {
        return Some(format!("https://{}", rest));
    }
    Some(trimmed.to_string())
}

/// Checks whether a URL is acceptable as an item's representative image.
///
/// A valid image URL:
/// - starts with `http://` or `https://` (data URIs and relative paths fail)
/// - contains none of the [`REJECT_SUBSTRINGS`] markers (tracking pixels,
///   spacers, avatars, fallback assets)
///
/// This is a pure predicate — it never fetches the URL. Resolution order and
/// fallback behavior live in the image resolver; exhaustion there yields a
/// `None` image, not an error.
///
/// # Examples
///
/// ```
/// use newsreel::util::is_valid_image_url;
///
/// assert!(is_valid_image_url("https://cdn.example.com/photo.jpg"));
/// assert!(!is_valid_image_url("data:image/gif;base64,AAAA"));
/// assert!(!is_valid_image_url("https://site.com/avatar-1x1-pixel.gif"));
/// ```
pub fn is_valid_image_url(url: &str) -> bool {
    if url.len() < 8 {
        return false;
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return false;
    }
    let lower = url.to_lowercase();
    !REJECT_SUBSTRINGS.iter().any(|bad| lower.contains(bad))
}
