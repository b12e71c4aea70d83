//! Test utilities and stub engines for the pinterest_mcp test suite

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use pinterest_mcp::cancel::CancelSignal;
use pinterest_mcp::download::{DownloadError, ImageFetcher};
use pinterest_mcp::scraper::{BrowserLauncher, BrowserSession, ScrapeError, SearchPage};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Creates a temporary directory for test output
pub fn create_test_dir() -> TempDir {
    TempDir::new().expect("create temp dir")
}

/// Eight raw candidates: two non-CDN images, one duplicate thumbnail and
/// five distinct Pinterest images
pub fn sample_extraction() -> Value {
    json!([
        {"src": "https://i.pinimg.com/236x/aa/11/one.jpg", "alt": "First pin", "link": "https://www.pinterest.com/pin/1/"},
        {"src": "https://example.com/logo.png", "alt": "Logo", "link": ""},
        {"src": "https://i.pinimg.com/474x/bb/22/two.jpg", "alt": "", "link": "https://www.pinterest.com/pin/2/"},
        {"src": "https://i.pinimg.com/736x/aa/11/one.jpg", "alt": "Duplicate of first", "link": ""},
        {"src": "https://i.pinimg.com/60x60/cc/33/three.png", "alt": "Third", "link": ""},
        {"src": "https://s.pinimg.com/images/user/default_30.png", "alt": "avatar", "link": ""},
        {"src": "https://i.pinimg.com/originals/dd/44/four.webp", "alt": "Fourth", "link": "https://www.pinterest.com/pin/4/"},
        {"src": "https://cdn.other.net/236x/x.jpg", "alt": "elsewhere", "link": ""}
    ])
}

/// Where the stub browser should fail or cancel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Launch,
    NewPage,
    Configure,
    Goto,
    WaitForSelector,
    Scroll,
    Extract,
}

/// Counters shared between a stub launcher and the test
#[derive(Debug, Default)]
pub struct StubStats {
    /// Successful launches
    pub launches: AtomicUsize,
    pub browsers_closed: AtomicUsize,
    pub pages_closed: AtomicUsize,
    pub scroll_steps: AtomicUsize,
    pub scrolled_px: AtomicUsize,
    pub extractions: AtomicUsize,
}

impl StubStats {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct StubPlan {
    extraction: Value,
    fail_at: Option<Step>,
    cancel_at: Option<(Step, CancelSignal)>,
}

impl StubPlan {
    fn fail(&self, step: Step) -> Result<(), ScrapeError> {
        if let Some((at, signal)) = &self.cancel_at
            && *at == step
        {
            signal.cancel();
        }
        if self.fail_at == Some(step) {
            return Err(match step {
                Step::Launch => ScrapeError::Launch("stub launch failure".into()),
                Step::NewPage | Step::Configure => ScrapeError::Page("stub page failure".into()),
                Step::Goto => ScrapeError::Navigation("stub navigation failure".into()),
                Step::WaitForSelector => ScrapeError::SelectorTimeout {
                    selector: "div".into(),
                    timeout: Duration::ZERO,
                },
                Step::Scroll => ScrapeError::Scroll("stub scroll failure".into()),
                Step::Extract => ScrapeError::Extraction("stub extraction failure".into()),
            });
        }
        Ok(())
    }
}

/// Browser stub that returns a fixed extraction result
#[derive(Clone)]
pub struct StubLauncher {
    plan: StubPlan,
    pub stats: Arc<StubStats>,
}

impl StubLauncher {
    pub fn new(extraction: Value) -> Self {
        Self {
            plan: StubPlan {
                extraction,
                fail_at: None,
                cancel_at: None,
            },
            stats: Arc::new(StubStats::default()),
        }
    }

    pub fn failing_at(mut self, step: Step) -> Self {
        self.plan.fail_at = Some(step);
        self
    }

    /// Cancel `signal` when the browser reaches `step`
    pub fn cancelling_at(mut self, step: Step, signal: CancelSignal) -> Self {
        self.plan.cancel_at = Some((step, signal));
        self
    }
}

#[async_trait]
impl BrowserLauncher for StubLauncher {
    async fn launch(&self, _headless: bool) -> Result<Box<dyn BrowserSession>, ScrapeError> {
        self.plan.fail(Step::Launch)?;
        self.stats.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubSession {
            plan: self.plan.clone(),
            stats: self.stats.clone(),
        }))
    }
}

struct StubSession {
    plan: StubPlan,
    stats: Arc<StubStats>,
}

#[async_trait]
impl BrowserSession for StubSession {
    async fn new_page(&mut self) -> Result<Box<dyn SearchPage>, ScrapeError> {
        self.plan.fail(Step::NewPage)?;
        Ok(Box::new(StubPage {
            plan: self.plan.clone(),
            stats: self.stats.clone(),
        }))
    }

    async fn close(self: Box<Self>) {
        self.stats.browsers_closed.fetch_add(1, Ordering::SeqCst);
    }
}

struct StubPage {
    plan: StubPlan,
    stats: Arc<StubStats>,
}

#[async_trait]
impl SearchPage for StubPage {
    async fn configure(&self, _signal: &CancelSignal) -> Result<(), ScrapeError> {
        self.plan.fail(Step::Configure)
    }

    async fn goto(&self, _url: &str) -> Result<(), ScrapeError> {
        self.plan.fail(Step::Goto)
    }

    async fn wait_for_selector(&self, _selector: &str, _timeout: Duration) -> Result<(), ScrapeError> {
        self.plan.fail(Step::WaitForSelector)
    }

    async fn scroll_by(&self, px: i64) -> Result<(), ScrapeError> {
        self.plan.fail(Step::Scroll)?;
        self.stats.scroll_steps.fetch_add(1, Ordering::SeqCst);
        self.stats
            .scrolled_px
            .fetch_add(usize::try_from(px).unwrap_or(0), Ordering::SeqCst);
        Ok(())
    }

    async fn extract_images(&self) -> Result<Value, ScrapeError> {
        self.stats.extractions.fetch_add(1, Ordering::SeqCst);
        self.plan.fail(Step::Extract)?;
        Ok(self.plan.extraction.clone())
    }

    async fn close(self: Box<Self>) {
        self.stats.pages_closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Scripted fetcher: pops one response per call, then succeeds forever
pub struct StubFetcher {
    script: Mutex<VecDeque<Result<Bytes, DownloadError>>>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl StubFetcher {
    pub fn always_ok() -> Self {
        Self::scripted(Vec::new())
    }

    pub fn scripted(script: Vec<Result<Bytes, DownloadError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(u, _)| u.clone()).collect()
    }

    /// Gaps between consecutive calls
    pub fn gaps(&self) -> Vec<Duration> {
        let calls = self.calls.lock().unwrap();
        calls
            .windows(2)
            .map(|w| w[1].1.duration_since(w[0].1))
            .collect()
    }
}

#[async_trait]
impl ImageFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, DownloadError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), Instant::now()));
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(Bytes::from_static(b"\xff\xd8\xff fake jpeg")))
    }
}

/// TCP server that accepts connections and never answers
///
/// Returns its base URL; the accept loop is aborted when the handle drops.
pub async fn silent_server() -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind silent listener");
    let addr = listener.local_addr().expect("listener address");
    let task = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    (format!("http://{addr}"), task)
}

/// Cancel `signal` after `delay`
pub fn cancel_after(signal: &CancelSignal, delay: Duration) {
    let signal = signal.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        signal.cancel();
    });
}

pub fn http_error(status: u16) -> DownloadError {
    DownloadError::Http {
        url: "stub".to_string(),
        status,
    }
}
