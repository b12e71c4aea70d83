//! Data structures for download results

use serde::{Deserialize, Serialize};

use crate::cancel::CancelSignal;
use crate::scraper::SearchResult;

/// An image to download
///
/// Loosely shaped on purpose: batch input may hold records without an id or
/// even without a URL, and those are skipped rather than failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default, alias = "imageUrl")]
    pub image_url: Option<String>,
}

impl ImageRecord {
    #[must_use]
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            id: None,
            image_url: Some(image_url.into()),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// URL to fetch, if present and non-empty
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|u| !u.is_empty())
    }
}

impl From<&SearchResult> for ImageRecord {
    fn from(result: &SearchResult) -> Self {
        Self::new(result.image_url.clone())
    }
}

/// Result of one successful download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOutcome {
    pub success: bool,
    pub id: String,
    pub path: String,
    pub url: String,
}

/// A download that failed after retries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedDownload {
    pub url: String,
    pub error: String,
}

/// Aggregate over a batch of downloads
///
/// `total` is the input length; skipped records count toward it but not
/// toward `downloaded_count` or `failed_count`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub success: bool,
    pub total: usize,
    pub downloaded_count: usize,
    pub failed_count: usize,
    pub downloaded: Vec<DownloadOutcome>,
    pub failed: Vec<FailedDownload>,
}

impl BatchReport {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            success: true,
            total,
            ..Self::default()
        }
    }

    pub(crate) fn record_success(&mut self, outcome: DownloadOutcome) {
        self.downloaded.push(outcome);
        self.downloaded_count += 1;
    }

    pub(crate) fn record_failure(&mut self, url: String, error: String) {
        self.failed.push(FailedDownload { url, error });
        self.failed_count += 1;
    }

    /// Records neither downloaded nor failed
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.total - self.downloaded_count - self.failed_count
    }
}

/// Per-call options for the retrying engine
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    /// 1-based position within a batch, exposed to templates as `{index}`
    pub index: Option<usize>,
    /// Cancel signal observed before each attempt and during backoff
    pub signal: Option<CancelSignal>,
}

impl DownloadOptions {
    #[must_use]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    #[must_use]
    pub fn with_signal(mut self, signal: CancelSignal) -> Self {
        self.signal = Some(signal);
        self
    }
}
