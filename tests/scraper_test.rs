//! Search engine tests against a stub browser

mod common;

use common::{StubLauncher, StubStats, Step, sample_extraction};
use pinterest_mcp::cancel::{CancelSignal, Cancelled};
use pinterest_mcp::scraper::{PinterestScraper, ScrapeError, ScrollSettings, auto_scroll_with};
use serde_json::json;
use std::sync::Arc;

fn scraper(launcher: &StubLauncher) -> PinterestScraper {
    PinterestScraper::new(Arc::new(launcher.clone())).with_scroll_settings(ScrollSettings::immediate())
}

fn assert_released(launcher: &StubLauncher) {
    let stats = &launcher.stats;
    assert_eq!(
        StubStats::get(&stats.browsers_closed),
        StubStats::get(&stats.launches),
        "every launched browser must be closed"
    );
}

#[tokio::test]
async fn test_candidates_are_filtered_canonicalized_and_deduplicated() {
    let launcher = StubLauncher::new(sample_extraction());
    let results = scraper(&launcher)
        .search("cats", 10, true, &CancelSignal::new())
        .await
        .expect("search should not be cancelled");

    let urls: Vec<&str> = results.iter().map(|r| r.image_url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://i.pinimg.com/originals/aa/11/one.jpg",
            "https://i.pinimg.com/originals/bb/22/two.jpg",
            "https://i.pinimg.com/originals/cc/33/three.png",
            "https://s.pinimg.com/images/user/default_30.png",
            "https://i.pinimg.com/originals/dd/44/four.webp",
        ]
    );

    // First occurrence wins
    assert_eq!(results[0].title, "First pin");
    assert_eq!(results[0].link, "https://www.pinterest.com/pin/1/");
    // Missing alt and missing anchor fall back
    assert_eq!(results[1].title, "Unknown Title");
    assert_eq!(results[2].link, results[2].image_url);
    assert!(results.iter().all(|r| r.source == "pinterest"));

    assert_eq!(StubStats::get(&launcher.stats.pages_closed), 1);
    assert_released(&launcher);
}

#[tokio::test]
async fn test_eight_unique_candidates_truncate_to_five() {
    let candidates: Vec<_> = (1..=8)
        .map(|i| json!({"src": format!("https://i.pinimg.com/236x/aa/{i}.jpg"), "alt": format!("pin {i}"), "link": ""}))
        .collect();
    let launcher = StubLauncher::new(json!(candidates));

    let results = scraper(&launcher)
        .search("landscape", 5, true, &CancelSignal::new())
        .await
        .unwrap();

    assert_eq!(results.len(), 5);
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.image_url, format!("https://i.pinimg.com/originals/aa/{}.jpg", i + 1));
        assert!(!result.image_url.contains("/236x/"));
    }
}

#[tokio::test]
async fn test_results_are_truncated_to_limit() {
    let launcher = StubLauncher::new(sample_extraction());
    let results = scraper(&launcher)
        .search("cats", 2, true, &CancelSignal::new())
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[1].image_url, "https://i.pinimg.com/originals/bb/22/two.jpg");
}

#[tokio::test]
async fn test_zero_limit_returns_empty() {
    let launcher = StubLauncher::new(sample_extraction());
    let results = scraper(&launcher)
        .search("cats", 0, true, &CancelSignal::new())
        .await
        .unwrap();

    assert!(results.is_empty());
    assert_released(&launcher);
}

#[tokio::test]
async fn test_pre_cancelled_signal_fails_without_launching() {
    let launcher = StubLauncher::new(sample_extraction());
    let signal = CancelSignal::new();
    signal.cancel();

    let outcome = scraper(&launcher).search("cats", 10, true, &signal).await;

    assert_eq!(outcome, Err(Cancelled));
    assert_eq!(StubStats::get(&launcher.stats.launches), 0);
}

#[tokio::test]
async fn test_cancellation_mid_search_propagates_and_releases_browser() {
    for step in [Step::NewPage, Step::Configure, Step::Goto, Step::Scroll, Step::Extract] {
        let signal = CancelSignal::new();
        let launcher = StubLauncher::new(sample_extraction()).cancelling_at(step, signal.clone());

        let outcome = scraper(&launcher).search("cats", 5, true, &signal).await;

        assert_eq!(outcome, Err(Cancelled), "cancel at {step:?}");
        assert_released(&launcher);
    }
}

#[tokio::test]
async fn test_failures_degrade_to_empty_results() {
    for step in [Step::Launch, Step::NewPage, Step::Configure, Step::Goto] {
        let launcher = StubLauncher::new(sample_extraction()).failing_at(step);

        let results = scraper(&launcher)
            .search("cats", 5, true, &CancelSignal::new())
            .await
            .unwrap_or_else(|_| panic!("failure at {step:?} must not be a cancellation"));

        assert!(results.is_empty(), "failure at {step:?}");
        assert_released(&launcher);
    }
}

#[tokio::test]
async fn test_missing_marker_and_scroll_failure_are_tolerated() {
    for step in [Step::WaitForSelector, Step::Scroll] {
        let launcher = StubLauncher::new(sample_extraction()).failing_at(step);

        let results = scraper(&launcher)
            .search("cats", 10, true, &CancelSignal::new())
            .await
            .unwrap();

        assert_eq!(results.len(), 5, "failure at {step:?} should still extract");
    }
}

#[tokio::test]
async fn test_extraction_failure_or_non_array_yields_empty() {
    let failing = StubLauncher::new(sample_extraction()).failing_at(Step::Extract);
    let results = scraper(&failing)
        .search("cats", 10, true, &CancelSignal::new())
        .await
        .unwrap();
    assert!(results.is_empty());

    let non_array = StubLauncher::new(json!({"images": []}));
    let results = scraper(&non_array)
        .search("cats", 10, true, &CancelSignal::new())
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_scroll_distance_scales_with_limit() {
    let launcher = StubLauncher::new(sample_extraction());
    scraper(&launcher)
        .search("cats", 20, true, &CancelSignal::new())
        .await
        .unwrap();

    // 20 results * 300px, in 100px steps
    assert_eq!(StubStats::get(&launcher.stats.scrolled_px), 6000);
    assert_eq!(StubStats::get(&launcher.stats.scroll_steps), 60);
}

#[tokio::test]
async fn test_small_limit_uses_scroll_floor() {
    let launcher = StubLauncher::new(sample_extraction());
    scraper(&launcher)
        .search("cats", 1, true, &CancelSignal::new())
        .await
        .unwrap();

    assert_eq!(StubStats::get(&launcher.stats.scrolled_px), 1000);
}

#[tokio::test]
async fn test_auto_scroll_non_positive_distance_is_noop() {
    use pinterest_mcp::scraper::BrowserLauncher;

    let launcher = StubLauncher::new(json!([]));
    let mut session = launcher.launch(true).await.unwrap();
    let page = session.new_page().await.unwrap();

    auto_scroll_with(page.as_ref(), 0, ScrollSettings::immediate(), &CancelSignal::new())
        .await
        .unwrap();
    auto_scroll_with(page.as_ref(), -50, ScrollSettings::immediate(), &CancelSignal::new())
        .await
        .unwrap();

    assert_eq!(StubStats::get(&launcher.stats.scroll_steps), 0);
    page.close().await;
    session.close().await;
}

#[tokio::test]
async fn test_auto_scroll_propagates_cancellation_and_page_errors() {
    use pinterest_mcp::scraper::BrowserLauncher;

    let signal = CancelSignal::new();
    signal.cancel();
    let launcher = StubLauncher::new(json!([]));
    let mut session = launcher.launch(true).await.unwrap();
    let page = session.new_page().await.unwrap();
    let outcome = auto_scroll_with(page.as_ref(), 500, ScrollSettings::immediate(), &signal).await;
    assert!(matches!(outcome, Err(ScrapeError::Cancelled)));
    page.close().await;
    session.close().await;

    let failing = StubLauncher::new(json!([])).failing_at(Step::Scroll);
    let mut session = failing.launch(true).await.unwrap();
    let page = session.new_page().await.unwrap();
    let outcome =
        auto_scroll_with(page.as_ref(), 500, ScrollSettings::immediate(), &CancelSignal::new()).await;
    assert!(matches!(outcome, Err(ScrapeError::Scroll(_))));
    page.close().await;
    session.close().await;
}

#[tokio::test]
#[ignore = "requires a local Chrome/Chromium and network access"]
async fn test_live_pinterest_search() {
    let scraper = PinterestScraper::chromium(None);
    let results = scraper
        .search("landscape", 5, true, &CancelSignal::new())
        .await
        .unwrap();

    assert!(results.len() <= 5);
    for result in &results {
        assert!(result.image_url.contains("pinimg.com"));
        assert!(!result.image_url.contains("/236x/"));
    }
}
