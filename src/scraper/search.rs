//! Pinterest search execution
//!
//! One search owns one browser and one page from launch to teardown. Every
//! failure except cancellation degrades to an empty result list.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::browser::{BrowserLauncher, BrowserSession, SearchPage};
use super::extract::assemble_results;
use super::scroll::{auto_scroll_with, scroll_distance_for};
use super::types::{ScrapeError, ScrollSettings, SearchResult};
use crate::cancel::{CancelSignal, Cancelled};
use crate::utils::constants::{CONTENT_WAIT_TIMEOUT, PIN_SELECTOR, PINTEREST_SEARCH_URL};

/// Build the pin search URL for `keyword`
#[must_use]
pub fn search_url(keyword: &str) -> String {
    format!("{PINTEREST_SEARCH_URL}{}", urlencoding::encode(keyword))
}

/// Search engine over an injectable browser
#[derive(Clone)]
pub struct PinterestScraper {
    launcher: Arc<dyn BrowserLauncher>,
    scroll: ScrollSettings,
}

impl PinterestScraper {
    #[must_use]
    pub fn new(launcher: Arc<dyn BrowserLauncher>) -> Self {
        Self {
            launcher,
            scroll: ScrollSettings::default(),
        }
    }

    #[must_use]
    pub fn with_scroll_settings(mut self, scroll: ScrollSettings) -> Self {
        self.scroll = scroll;
        self
    }

    /// Search Pinterest for `keyword` and return up to `limit` unique images
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if `signal` is cancelled before the call or at
    /// any checkpoint during it. Launch, navigation, scroll and extraction
    /// failures are logged and produce `Ok(vec![])` instead.
    pub async fn search(
        &self,
        keyword: &str,
        limit: usize,
        headless: bool,
        signal: &CancelSignal,
    ) -> Result<Vec<SearchResult>, Cancelled> {
        signal.check()?;

        if limit == 0 {
            debug!("Search limit is 0, skipping browser launch");
            return Ok(Vec::new());
        }

        let url = search_url(keyword);
        info!("Searching Pinterest: keyword={keyword:?} limit={limit} headless={headless}");

        let mut session = match self.launcher.launch(headless).await {
            Ok(session) => session,
            Err(e) => {
                warn!("Browser launch failed, returning no results: {e}");
                return Ok(Vec::new());
            }
        };

        let outcome = self.run_session(session.as_mut(), &url, limit, signal).await;
        session.close().await;

        match outcome {
            Ok(results) => {
                info!("Found {} images for {keyword:?}", results.len());
                Ok(results)
            }
            Err(ScrapeError::Cancelled) => {
                info!("Search for {keyword:?} cancelled");
                Err(Cancelled)
            }
            Err(e) => {
                warn!("Search for {keyword:?} failed, returning no results: {e}");
                Ok(Vec::new())
            }
        }
    }

    /// Everything between launch and browser close
    async fn run_session(
        &self,
        session: &mut dyn BrowserSession,
        url: &str,
        limit: usize,
        signal: &CancelSignal,
    ) -> Result<Vec<SearchResult>, ScrapeError> {
        signal.check()?;

        let page = session.new_page().await?;
        let outcome = self.run_page(page.as_ref(), url, limit, signal).await;
        page.close().await;
        outcome
    }

    async fn run_page(
        &self,
        page: &dyn SearchPage,
        url: &str,
        limit: usize,
        signal: &CancelSignal,
    ) -> Result<Vec<SearchResult>, ScrapeError> {
        signal.check()?;
        page.configure(signal).await?;

        signal.check()?;
        page.goto(url).await?;
        signal.check()?;

        if let Err(e) = page.wait_for_selector(PIN_SELECTOR, CONTENT_WAIT_TIMEOUT).await {
            if e.is_cancelled() {
                return Err(e);
            }
            warn!("Pin results marker did not appear, extracting anyway: {e}");
        }

        signal.check()?;
        match auto_scroll_with(page, scroll_distance_for(limit), self.scroll, signal).await {
            Ok(()) => {}
            Err(ScrapeError::Cancelled) => return Err(ScrapeError::Cancelled),
            Err(e) => warn!("Scrolling failed, extracting what is loaded: {e}"),
        }

        signal.check()?;
        let raw = match page.extract_images().await {
            Ok(raw) => raw,
            Err(ScrapeError::Cancelled) => return Err(ScrapeError::Cancelled),
            Err(e) => {
                warn!("Image extraction failed: {e}");
                serde_json::Value::Null
            }
        };

        signal.check()?;
        Ok(assemble_results(raw, limit))
    }
}
