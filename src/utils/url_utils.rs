//! URL helpers for Pinterest image links.
//!
//! Thumbnail URLs are rewritten to their full-resolution form, and image
//! ids and file extensions are recovered from the last path segment.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Generic size segment such as `/236x/`, `/60x60/` or `/123x456/`
static SIZE_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/\d+x\d*/").expect("size segment pattern is a valid regex")
});

/// Literal size markers used by older Pinterest thumbnails
const LEGACY_SIZE_MARKERS: [&str; 4] = ["/60x60/", "/236x/", "/474x/", "/736x/"];

const ORIGINALS_SEGMENT: &str = "/originals/";

/// Rewrite a thumbnail image URL to its full-resolution form.
///
/// The first size segment matching `/<digits>x<digits?>/` is replaced with
/// `/originals/`. The legacy literal markers are checked as a fallback.
/// Anything else, including the empty string, comes back untouched. The
/// host is not inspected, so the rule applies to any domain.
///
/// Only the first size segment is rewritten. For URLs with a single size
/// segment the rewrite is idempotent, since `/originals/` never matches one;
/// a URL such as `/236x/474x/a.jpg` changes again on a second pass.
///
/// # Example
/// ```
/// use pinterest_mcp::utils::to_original_url;
///
/// assert_eq!(
///     to_original_url("https://i.pinimg.com/236x/ab/cd/ef.jpg"),
///     "https://i.pinimg.com/originals/ab/cd/ef.jpg"
/// );
/// ```
#[must_use]
pub fn to_original_url(url: &str) -> Cow<'_, str> {
    if url.is_empty() {
        return Cow::Borrowed(url);
    }

    if SIZE_SEGMENT.is_match(url) {
        return SIZE_SEGMENT.replace(url, ORIGINALS_SEGMENT);
    }

    for marker in LEGACY_SIZE_MARKERS {
        if url.contains(marker) {
            return Cow::Owned(url.replacen(marker, ORIGINALS_SEGMENT, 1));
        }
    }

    Cow::Borrowed(url)
}

/// Same as [`to_original_url`] for values that may be absent
#[must_use]
pub fn to_original_url_opt(url: Option<&str>) -> Option<String> {
    url.map(|u| to_original_url(u).into_owned())
}

/// Last path segment of a URL with any query string or fragment removed
fn last_segment(url: &str) -> &str {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    without_query.rsplit('/').next().unwrap_or(without_query)
}

/// Image id taken from the URL's last path segment, minus its extension
///
/// `https://i.pinimg.com/originals/ab/cd/ef.jpg?x=1` yields `ef`.
#[must_use]
pub fn image_id_from_url(url: &str) -> String {
    let segment = last_segment(url);
    segment.split('.').next().unwrap_or(segment).to_string()
}

/// File extension taken from the URL's last path segment, `jpg` when absent
#[must_use]
pub fn file_extension_from_url(url: &str) -> String {
    match last_segment(url).rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_string(),
        _ => "jpg".to_string(),
    }
}

/// Check whether a URL points at Pinterest's image CDN
#[must_use]
pub fn is_pinterest_image(url: &str) -> bool {
    url.contains(super::constants::PINTEREST_IMAGE_HOST)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_generic_size_segment() {
        assert_eq!(
            to_original_url("https://i.pinimg.com/123x456/aa/bb.png"),
            "https://i.pinimg.com/originals/aa/bb.png"
        );
    }

    #[test]
    fn only_first_size_segment_is_rewritten() {
        assert_eq!(
            to_original_url("https://i.pinimg.com/236x/474x/a.jpg"),
            "https://i.pinimg.com/originals/474x/a.jpg"
        );
    }

    #[test]
    fn leaves_unrelated_urls_alone() {
        let url = "https://example.com/images/photo.jpg";
        assert!(matches!(to_original_url(url), Cow::Borrowed(_)));
    }

    #[test]
    fn id_and_extension_ignore_query() {
        let url = "https://i.pinimg.com/originals/ab/cd/ef.webp?token=1.2";
        assert_eq!(image_id_from_url(url), "ef");
        assert_eq!(file_extension_from_url(url), "webp");
    }

    #[test]
    fn extension_defaults_to_jpg() {
        assert_eq!(file_extension_from_url("https://i.pinimg.com/originals/ab/cd/ef"), "jpg");
        assert_eq!(file_extension_from_url("https://i.pinimg.com/originals/ab/cd/ef."), "jpg");
    }
}
