//! Data structures and errors for Pinterest search

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::cancel::Cancelled;
use crate::utils::constants::{SCROLL_SETTLE, SCROLL_STEP_INTERVAL, SCROLL_STEP_PX};

/// A single scraped image candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Alt text of the image, or `"Unknown Title"`
    pub title: String,

    /// Full-resolution image URL; unique within one search response
    pub image_url: String,

    /// Page the image links to, or `image_url` when it has no enclosing anchor
    pub link: String,

    /// Always `"pinterest"`
    pub source: String,
}

/// Raw `<img>` data returned by the in-page extraction script
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawImage {
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub link: String,
}

/// Internal search failures
///
/// Everything except `Cancelled` is degraded to an empty result by
/// [`super::PinterestScraper::search`].
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("operation cancelled")]
    Cancelled,

    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("failed to create page: {0}")]
    Page(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("timed out waiting for selector '{selector}' after {timeout:?}")]
    SelectorTimeout { selector: String, timeout: Duration },

    #[error("scroll failed: {0}")]
    Scroll(String),

    #[error("image extraction failed: {0}")]
    Extraction(String),
}

impl From<Cancelled> for ScrapeError {
    fn from(_: Cancelled) -> Self {
        ScrapeError::Cancelled
    }
}

impl ScrapeError {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ScrapeError::Cancelled)
    }
}

/// Timing of the lazy-load scroll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollSettings {
    /// Pixels per step
    pub step_px: i64,
    /// Pause between steps
    pub step_interval: Duration,
    /// Pause after the last step so new content can render
    pub settle: Duration,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            step_px: SCROLL_STEP_PX,
            step_interval: SCROLL_STEP_INTERVAL,
            settle: SCROLL_SETTLE,
        }
    }
}

impl ScrollSettings {
    /// No pauses; for tests driving a stub page
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            step_interval: Duration::ZERO,
            settle: Duration::ZERO,
            ..Self::default()
        }
    }
}
