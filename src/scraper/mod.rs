//! Pinterest image search using browser automation
//!
//! Launches a browser per search, scrolls the results page to trigger lazy
//! loading, and returns de-duplicated full-resolution image URLs.

mod browser;
pub mod chromium;
mod extract;
mod scroll;
mod search;
mod types;

pub use browser::{BrowserLauncher, BrowserSession, SearchPage};
pub use chromium::ChromiumLauncher;
pub use extract::{EXTRACT_IMAGES_JS, assemble_results};
pub use scroll::{auto_scroll, auto_scroll_with, scroll_distance_for};
pub use search::{PinterestScraper, search_url};
pub use types::{ScrapeError, ScrollSettings, SearchResult};

use std::sync::Arc;

impl PinterestScraper {
    /// Scraper backed by a local Chrome/Chromium
    #[must_use]
    pub fn chromium(chrome_executable: Option<std::path::PathBuf>) -> Self {
        Self::new(Arc::new(ChromiumLauncher::new(chrome_executable)))
    }
}
