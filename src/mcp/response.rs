//! Text rendering of tool results
//!
//! Each returned string becomes one text content item.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::download::BatchReport;
use crate::scraper::SearchResult;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Directory name used for a keyword's downloads
///
/// Whitespace runs become `_`; anything outside ASCII alphanumerics, `_`
/// and CJK ideographs (U+4E00..=U+9FA5) is dropped.
#[must_use]
pub fn keyword_dir_name(keyword: &str) -> String {
    WHITESPACE_RUN
        .replace_all(keyword, "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || ('\u{4e00}'..='\u{9fa5}').contains(c))
        .collect()
}

/// Lines for `pinterest_search`
#[must_use]
pub fn search_lines(keyword: &str, results: &[SearchResult]) -> Vec<String> {
    let mut lines = vec![format!(
        "Found {} images related to \"{keyword}\" on Pinterest",
        results.len()
    )];

    for (index, result) in results.iter().enumerate() {
        lines.push(format!("Image {}: {}", index + 1, display_title(&result.title)));
        lines.push(format!("Link: {}", result.image_url));
        if !result.link.is_empty() && result.link != result.image_url {
            lines.push(format!("Original page: {}", result.link));
        }
        if index + 1 < results.len() {
            lines.push("---".to_string());
        }
    }

    lines
}

/// Lines for `pinterest_search_and_download`
///
/// Titles are matched to downloads by URL since skipped or failed records
/// shift positions.
#[must_use]
pub fn download_lines(keyword: &str, results: &[SearchResult], report: &BatchReport) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Searched and downloaded {} images related to \"{keyword}\"",
            results.len()
        ),
        format!(
            "Succeeded: {}, Failed: {}",
            report.downloaded_count, report.failed_count
        ),
    ];

    for (index, outcome) in report.downloaded.iter().enumerate() {
        let title = results
            .iter()
            .find(|r| r.image_url == outcome.url)
            .map_or("No title", |r| display_title(&r.title));
        lines.push(format!("Image {}: {title}", index + 1));
        lines.push(format!("Link: {}", outcome.url));
        lines.push(format!("Saved to: {}", outcome.path));
        if index + 1 < report.downloaded.len() {
            lines.push("---".to_string());
        }
    }

    if report.failed_count > 0 {
        lines.push("--- Failed downloads ---".to_string());
        for (index, failed) in report.failed.iter().enumerate() {
            lines.push(format!("Failed {}: {}", index + 1, failed.url));
            lines.push(format!("Error: {}", failed.error));
            if index + 1 < report.failed.len() {
                lines.push("---".to_string());
            }
        }
    }

    lines
}

/// Payload of `pinterest_get_image_info`
#[derive(Debug, Clone, Serialize)]
pub struct ImageInfo {
    pub image_url: String,
    pub source: &'static str,
    pub timestamp: String,
}

impl ImageInfo {
    #[must_use]
    pub fn now(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            source: "Pinterest",
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}

fn display_title(title: &str) -> &str {
    if title.is_empty() { "No title" } else { title }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::{DownloadOutcome, FailedDownload};

    fn result(title: &str, image_url: &str, link: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            image_url: image_url.to_string(),
            link: link.to_string(),
            source: "pinterest".to_string(),
        }
    }

    #[test]
    fn keyword_dir_keeps_cjk_and_underscores() {
        assert_eq!(keyword_dir_name("cute  cats & dogs"), "cute_cats__dogs");
        assert_eq!(keyword_dir_name("风景 照片!"), "风景_照片");
        assert_eq!(keyword_dir_name("../etc/passwd"), "etcpasswd");
    }

    #[test]
    fn search_lines_include_original_page_only_when_different() {
        let results = vec![
            result("A", "https://i.pinimg.com/originals/a.jpg", "https://www.pinterest.com/pin/1/"),
            result("B", "https://i.pinimg.com/originals/b.jpg", "https://i.pinimg.com/originals/b.jpg"),
        ];
        let lines = search_lines("cats", &results);
        assert_eq!(
            lines,
            vec![
                "Found 2 images related to \"cats\" on Pinterest",
                "Image 1: A",
                "Link: https://i.pinimg.com/originals/a.jpg",
                "Original page: https://www.pinterest.com/pin/1/",
                "---",
                "Image 2: B",
                "Link: https://i.pinimg.com/originals/b.jpg",
            ]
        );
    }

    #[test]
    fn download_lines_list_failures() {
        let results = vec![
            result("A", "u1", "u1"),
            result("B", "u2", "u2"),
        ];
        let report = BatchReport {
            success: true,
            total: 2,
            downloaded_count: 1,
            failed_count: 1,
            downloaded: vec![DownloadOutcome {
                success: true,
                id: "u2".to_string(),
                path: "/tmp/u2.jpg".to_string(),
                url: "u2".to_string(),
            }],
            failed: vec![FailedDownload {
                url: "u1".to_string(),
                error: "HTTP error 404: u1".to_string(),
            }],
        };

        let lines = download_lines("cats", &results, &report);
        assert_eq!(lines[1], "Succeeded: 1, Failed: 1");
        assert_eq!(lines[2], "Image 1: B");
        assert!(lines.contains(&"--- Failed downloads ---".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("Error: HTTP error 404: u1"));
    }
}
