use once_cell::sync::Lazy;
use regex::Regex;

use crate::util::image_url::normalize_image_url;

static IMG_SRC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img[^>]+src\s*=\s*["']([^"']+)["']"#).expect("img regex")
});

static OG_IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+property\s*=\s*["']og:image["'][^>]+content\s*=\s*["']([^"']+)["']"#)
        .expect("og:image regex")
});

static TWITTER_IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)<meta[^>]+name\s*=\s*["']twitter:image["'][^>]+content\s*=\s*["']([^"']+)["']"#,
    )
    .expect("twitter:image regex")
});

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag regex"));

static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+\s+").expect("sentence regex"));

/// Extracts the first `<img src="…">` URL from embedded feed markup.
///
/// Feed descriptions routinely arrive entity-escaped (`&lt;img …&gt;`), so
/// entities are decoded before scanning. The returned URL is normalized
/// (whitespace trimmed, protocol-relative upgraded to https) but NOT
/// validated — callers apply [`crate::util::is_valid_image_url`].
pub fn first_image_src(markup: &str) -> Option<String> {
    if markup.is_empty() {
        return None;
    }
    let decoded = html_escape::decode_html_entities(markup);
    IMG_SRC
        .captures(&decoded)
        .and_then(|caps| normalize_image_url(&caps[1]))
}

/// Extracts an OpenGraph image hint from an article page.
///
/// Tries `og:image` first, then `twitter:image`. Returns the normalized URL
/// without validating it.
pub fn og_image_hint(html: &str) -> Option<String> {
    OG_IMAGE
        .captures(html)
        .or_else(|| TWITTER_IMAGE.captures(html))
        .and_then(|caps| normalize_image_url(&caps[1]))
}

/// Removes markup tags and decodes entities, leaving plain text.
pub fn strip_tags(markup: &str) -> String {
    let decoded = html_escape::decode_html_entities(markup);
    TAG.replace_all(&decoded, "").into_owned()
}

/// Builds a short plain-text summary from feed markup.
///
/// Strips tags, collapses whitespace, clips to the first two sentences, and
/// truncates to `max_len` characters. Returns `None` when nothing readable
/// remains — the caller stores the absence rather than an empty string.
pub fn clean_summary(markup: &str, max_len: usize) -> Option<String> {
    let text = strip_tags(markup);
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }

    let sentences: Vec<&str> = SENTENCE_END.split(&collapsed).collect();
    let mut summary = sentences
        .iter()
        .take(2)
        .map(|s| s.trim_end_matches(['.', '!', '?']))
        .collect::<Vec<_>>()
        .join(". ");
    if !summary.ends_with('.') {
        summary.push('.');
    }

    if summary.chars().count() > max_len {
        summary = summary.chars().take(max_len).collect();
    }
    Some(summary)
}
