pub mod browser_setup;
pub mod cancel;
pub mod config;
pub mod download;
pub mod filename_template;
pub mod mcp;
pub mod scraper;
pub mod utils;

pub use browser_setup::{download_managed_browser, find_browser_executable, launch_browser};
pub use cancel::{CancelSignal, Cancelled};
pub use config::{Config, ConfigBuilder, ConfigError, ProxyUrl};
pub use download::{
    BatchReport, DownloadError, DownloadOptions, DownloadOutcome, HttpFetcher, ImageDownloader,
    ImageFetcher, ImageRecord, RetryPolicy, batch_download, download_image_to,
};
pub use filename_template::{FilenameTemplate, TemplateError, TemplateVars, validate_template};
pub use mcp::{PinterestMcpServer, RawToolArgs, SearchArgs};
pub use scraper::{
    BrowserLauncher, BrowserSession, ChromiumLauncher, PinterestScraper, ScrapeError, SearchPage,
    SearchResult,
};
pub use utils::to_original_url;
