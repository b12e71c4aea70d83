//! chromiumoxide implementation of the browser seams

use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams,
};
use chromiumoxide::cdp::browser_protocol::network::{
    ErrorReason, ResourceType, SetUserAgentOverrideParams,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::browser::{BrowserLauncher, BrowserSession, SearchPage};
use super::extract::EXTRACT_IMAGES_JS;
use super::types::ScrapeError;
use crate::browser_setup::launch_browser;
use crate::cancel::CancelSignal;
use crate::utils::constants::{
    BROWSER_LANG, CHROME_USER_AGENT, NAVIGATION_TIMEOUT, VIEWPORT_HEIGHT, VIEWPORT_WIDTH,
};

/// Interception rule: heavy sub-resources are never loaded, and nothing is
/// once the search has been cancelled
pub(crate) fn should_block(resource_type: &ResourceType, cancelled: bool) -> bool {
    cancelled
        || matches!(
            resource_type,
            ResourceType::Image | ResourceType::Font | ResourceType::Media
        )
}

/// Launches a local Chrome/Chromium per search
#[derive(Debug, Clone, Default)]
pub struct ChromiumLauncher {
    chrome_executable: Option<PathBuf>,
}

impl ChromiumLauncher {
    /// `chrome_executable` overrides browser discovery when it exists
    #[must_use]
    pub fn new(chrome_executable: Option<PathBuf>) -> Self {
        Self { chrome_executable }
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self, headless: bool) -> Result<Box<dyn BrowserSession>, ScrapeError> {
        let (browser, handler, user_data_dir) =
            launch_browser(headless, self.chrome_executable.as_deref())
                .await
                .map_err(|e| ScrapeError::Launch(format!("{e:#}")))?;
        Ok(Box::new(ChromiumSession::new(browser, handler, user_data_dir)))
    }
}

/// Browser plus its event handler task
///
/// The handler MUST be aborted once the browser is closed or it runs
/// indefinitely. `Drop` covers paths where `close()` was never awaited.
pub struct ChromiumSession {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl ChromiumSession {
    pub(crate) fn new(browser: Browser, handler: JoinHandle<()>, user_data_dir: PathBuf) -> Self {
        Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
        }
    }

    async fn shutdown(&mut self) {
        if let Err(e) = self.browser.close().await {
            debug!("Browser close command failed: {e}");
        }
        if let Err(e) = self.browser.wait().await {
            debug!("Waiting for browser exit failed: {e}");
        }
        self.handler.abort();
        self.cleanup_temp_dir();
    }

    /// Remove the per-launch profile directory
    ///
    /// Call after the browser process has exited; Chrome holds file locks
    /// until then. Blocking because `Drop` calls it too.
    fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            debug!("Cleaning up temp directory: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(
                    "Failed to clean up temp directory {}: {}. Manual cleanup may be required.",
                    path.display(),
                    e
                );
            }
        }
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler.abort();
        if self.user_data_dir.is_some() {
            warn!("ChromiumSession dropped without close() - removing temp dir in Drop");
            self.cleanup_temp_dir();
        }
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn new_page(&mut self) -> Result<Box<dyn SearchPage>, ScrapeError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScrapeError::Page(e.to_string()))?;
        Ok(Box::new(ChromiumPage::new(page)))
    }

    async fn close(self: Box<Self>) {
        info!("Closing browser");
        let mut session = self;
        session.shutdown().await;
    }
}

/// A chromiumoxide page with request interception
pub struct ChromiumPage {
    page: Page,
    interceptor: OnceCell<JoinHandle<()>>,
}

impl ChromiumPage {
    fn new(page: Page) -> Self {
        Self {
            page,
            interceptor: OnceCell::new(),
        }
    }

    async fn enable_interception(&self, signal: &CancelSignal) -> Result<(), ScrapeError> {
        let mut paused = self
            .page
            .event_listener::<EventRequestPaused>()
            .await
            .map_err(|e| ScrapeError::Page(format!("failed to listen for requests: {e}")))?;

        self.page
            .execute(EnableParams::default())
            .await
            .map_err(|e| ScrapeError::Page(format!("failed to enable interception: {e}")))?;

        let page = self.page.clone();
        let signal = signal.clone();
        let task = tokio::spawn(async move {
            while let Some(event) = paused.next().await {
                let result = if should_block(&event.resource_type, signal.is_cancelled()) {
                    page.execute(FailRequestParams::new(
                        event.request_id.clone(),
                        ErrorReason::BlockedByClient,
                    ))
                    .await
                    .map(|_| ())
                } else {
                    page.execute(ContinueRequestParams::new(event.request_id.clone()))
                        .await
                        .map(|_| ())
                };

                if let Err(e) = result {
                    trace!("Interception response failed (page may be closing): {e}");
                }
            }
            trace!("Request interception stream ended");
        });

        if let Err(task) = self.interceptor.set(task) {
            task.abort();
        }
        Ok(())
    }
}

impl Drop for ChromiumPage {
    fn drop(&mut self) {
        if let Some(task) = self.interceptor.get() {
            task.abort();
        }
    }
}

#[async_trait]
impl SearchPage for ChromiumPage {
    async fn configure(&self, signal: &CancelSignal) -> Result<(), ScrapeError> {
        self.page
            .execute(SetDeviceMetricsOverrideParams::new(
                VIEWPORT_WIDTH,
                VIEWPORT_HEIGHT,
                1.0,
                false,
            ))
            .await
            .map_err(|e| ScrapeError::Page(format!("failed to set viewport: {e}")))?;

        self.page
            .execute(SetUserAgentOverrideParams {
                user_agent: CHROME_USER_AGENT.to_string(),
                accept_language: Some(BROWSER_LANG.to_string()),
                platform: None,
                user_agent_metadata: None,
            })
            .await
            .map_err(|e| ScrapeError::Page(format!("failed to set user agent: {e}")))?;

        self.enable_interception(signal).await
    }

    async fn goto(&self, url: &str) -> Result<(), ScrapeError> {
        let navigation = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        };

        match tokio::time::timeout(NAVIGATION_TIMEOUT, navigation).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ScrapeError::Navigation(e.to_string())),
            Err(_) => Err(ScrapeError::Navigation(format!(
                "timed out after {NAVIGATION_TIMEOUT:?} loading {url}"
            ))),
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), ScrapeError> {
        let start = Instant::now();
        let poll_interval = Duration::from_millis(100);

        loop {
            if self.page.find_element(selector).await.is_ok() {
                debug!("Selector '{selector}' found after {:?}", start.elapsed());
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(ScrapeError::SelectorTimeout {
                    selector: selector.to_string(),
                    timeout,
                });
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    async fn scroll_by(&self, px: i64) -> Result<(), ScrapeError> {
        self.page
            .evaluate(format!("window.scrollBy(0, {px})"))
            .await
            .map(|_| ())
            .map_err(|e| ScrapeError::Scroll(e.to_string()))
    }

    async fn extract_images(&self) -> Result<serde_json::Value, ScrapeError> {
        self.page
            .evaluate(EXTRACT_IMAGES_JS)
            .await
            .map_err(|e| ScrapeError::Extraction(e.to_string()))?
            .into_value::<serde_json::Value>()
            .map_err(|e| ScrapeError::Extraction(e.to_string()))
    }

    async fn close(self: Box<Self>) {
        if let Some(task) = self.interceptor.get() {
            task.abort();
        }
        if let Err(e) = self.page.clone().close().await {
            debug!("Page close failed: {e}");
        }
    }
}
