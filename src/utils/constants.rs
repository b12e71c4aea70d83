//! Shared configuration constants for the Pinterest tools
//!
//! Default values and fixed site parameters used throughout the codebase,
//! kept in one place to avoid magic numbers.

use std::time::Duration;

/// Pinterest site root
pub const PINTEREST_BASE_URL: &str = "https://www.pinterest.com";

/// Pin search endpoint; the encoded keyword is appended directly
pub const PINTEREST_SEARCH_URL: &str = "https://www.pinterest.com/search/pins/?q=";

/// Host fragment identifying Pinterest's image CDN
pub const PINTEREST_IMAGE_HOST: &str = "pinimg.com";

/// Tag stored in `SearchResult::source`
pub const RESULT_SOURCE: &str = "pinterest";

/// Title used when an image has no alt text
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Marker element that shows pin results have rendered
pub const PIN_SELECTOR: &str = "div[data-test-id=\"pin\"]";

/// Default number of results per search
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Keyword used when a tool call supplies none
pub const DEFAULT_SEARCH_KEYWORD: &str = "landscape";

/// Browsers run headless unless asked otherwise
pub const DEFAULT_HEADLESS_MODE: bool = true;

/// Default file name template for downloads
pub const DEFAULT_FILENAME_TEMPLATE: &str = "pinterest_{imageId}.{fileExtension}";

/// Viewport width applied to search pages
pub const VIEWPORT_WIDTH: i64 = 1280;

/// Viewport height applied to search pages
pub const VIEWPORT_HEIGHT: i64 = 800;

/// UI language passed to Chrome via `--lang`
pub const BROWSER_LANG: &str = "zh-CN,zh";

/// Timeout for `page.goto()` plus the load wait that follows it
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for individual CDP requests
pub const CDP_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How long to wait for `PIN_SELECTOR` before extracting anyway
pub const CONTENT_WAIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Pixels scrolled per step while triggering lazy loading
pub const SCROLL_STEP_PX: i64 = 100;

/// Delay between scroll steps
pub const SCROLL_STEP_INTERVAL: Duration = Duration::from_millis(100);

/// Pause after scrolling so new pins can render
pub const SCROLL_SETTLE: Duration = Duration::from_secs(2);

/// Scroll distance per requested result
pub const SCROLL_PX_PER_RESULT: i64 = 300;

/// Lower bound on the total scroll distance
pub const MIN_SCROLL_DISTANCE: i64 = 1000;

/// Upper bound on the total scroll distance (600 steps, about a minute)
pub const MAX_SCROLL_DISTANCE: i64 = 60_000;

/// Retries after the first attempt for a failed download
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// First backoff delay; doubled on every further retry
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Per-request timeout for image downloads
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Chrome user agent string presented by both the browser and the HTTP client
///
/// Reference: https://chromiumdash.appspot.com/schedule
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
