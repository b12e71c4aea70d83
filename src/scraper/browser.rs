//! Browser seams used by the search engine
//!
//! `PinterestScraper` only talks to these traits. The production
//! implementation lives in [`super::chromium`]; tests plug in stubs.

use async_trait::async_trait;
use std::time::Duration;

use super::types::ScrapeError;
use crate::cancel::CancelSignal;

/// Starts one browser instance per search
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self, headless: bool) -> Result<Box<dyn BrowserSession>, ScrapeError>;
}

/// A running browser owned by a single search call
#[async_trait]
pub trait BrowserSession: Send {
    async fn new_page(&mut self) -> Result<Box<dyn SearchPage>, ScrapeError>;

    /// Shut the browser down and release its resources; best-effort
    async fn close(self: Box<Self>);
}

/// The operations a search performs on a page
#[async_trait]
pub trait SearchPage: Send + Sync {
    /// Apply viewport, user agent and request interception
    ///
    /// Interception blocks image, font and media requests, and every request
    /// once `signal` is cancelled.
    async fn configure(&self, signal: &CancelSignal) -> Result<(), ScrapeError>;

    /// Navigate and wait for the page to finish loading
    async fn goto(&self, url: &str) -> Result<(), ScrapeError>;

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), ScrapeError>;

    async fn scroll_by(&self, px: i64) -> Result<(), ScrapeError>;

    /// Run the extraction script and return its raw JSON value
    ///
    /// A well-behaved page returns an array of `{src, alt, link}` objects;
    /// callers must tolerate anything else.
    async fn extract_images(&self) -> Result<serde_json::Value, ScrapeError>;

    async fn close(self: Box<Self>);
}
