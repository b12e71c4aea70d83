//! Turning raw `<img>` data into search results

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, warn};

use super::types::{RawImage, SearchResult};
use crate::utils::constants::{RESULT_SOURCE, UNKNOWN_TITLE};
use crate::utils::{is_pinterest_image, to_original_url};

/// Collects `{src, alt, link}` for every `<img>` on the page
///
/// `link` is the href of the nearest enclosing anchor, or empty.
pub const EXTRACT_IMAGES_JS: &str = r"
(() => {
    return Array.from(document.querySelectorAll('img')).map(img => {
        const anchor = img.closest('a');
        return {
            src: img.src || '',
            alt: img.alt || '',
            link: anchor && anchor.href ? anchor.href : ''
        };
    });
})()
";

/// Filter, canonicalize, dedup and truncate raw extraction output
///
/// Only images served from the Pinterest CDN are kept. Anything that is not a
/// JSON array yields no results. The first occurrence of a canonical URL wins.
#[must_use]
pub fn assemble_results(raw: Value, limit: usize) -> Vec<SearchResult> {
    if limit == 0 {
        return Vec::new();
    }

    let Value::Array(items) = raw else {
        warn!("Image extraction returned a non-array value; treating as empty");
        return Vec::new();
    };

    let candidates = items.len();
    let mut seen = HashSet::new();
    let mut results = Vec::with_capacity(limit.min(candidates));

    for item in items {
        let image: RawImage = match serde_json::from_value(item) {
            Ok(image) => image,
            Err(e) => {
                debug!("Skipping malformed image entry: {e}");
                continue;
            }
        };

        if image.src.is_empty() || !is_pinterest_image(&image.src) {
            continue;
        }

        let image_url = to_original_url(&image.src).into_owned();
        if !seen.insert(image_url.clone()) {
            continue;
        }

        let title = if image.alt.is_empty() {
            UNKNOWN_TITLE.to_string()
        } else {
            image.alt
        };
        let link = if image.link.is_empty() {
            image_url.clone()
        } else {
            image.link
        };

        results.push(SearchResult {
            title,
            image_url,
            link,
            source: RESULT_SOURCE.to_string(),
        });

        if results.len() >= limit {
            break;
        }
    }

    debug!("Kept {} of {} image candidates", results.len(), candidates);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn skips_non_cdn_images() {
        let raw = json!([
            {"src": "https://example.com/a.png", "alt": "x", "link": ""},
            {"src": "https://i.pinimg.com/236x/ab/cd.jpg", "alt": "", "link": ""}
        ]);
        let results = assemble_results(raw, 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].image_url, "https://i.pinimg.com/originals/ab/cd.jpg");
        assert_eq!(results[0].title, UNKNOWN_TITLE);
        assert_eq!(results[0].link, results[0].image_url);
        assert_eq!(results[0].source, "pinterest");
    }

    #[test]
    fn non_array_is_empty() {
        assert!(assemble_results(json!({"src": "x"}), 10).is_empty());
        assert!(assemble_results(Value::Null, 10).is_empty());
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let raw = json!([42, {"src": "https://i.pinimg.com/474x/1.jpg"}]);
        assert_eq!(assemble_results(raw, 10).len(), 1);
    }
}
