//! Scroll-driven lazy loading

use tracing::debug;

use super::browser::SearchPage;
use super::types::{ScrapeError, ScrollSettings};
use crate::cancel::CancelSignal;
use crate::utils::constants::{MAX_SCROLL_DISTANCE, MIN_SCROLL_DISTANCE, SCROLL_PX_PER_RESULT};

/// Distance to scroll for a search asking for `limit` results
///
/// Clamped to `MIN_SCROLL_DISTANCE..=MAX_SCROLL_DISTANCE` so a huge limit
/// cannot hold a browser open indefinitely.
#[must_use]
pub fn scroll_distance_for(limit: usize) -> i64 {
    let wanted = i64::try_from(limit)
        .unwrap_or(i64::MAX)
        .saturating_mul(SCROLL_PX_PER_RESULT);
    wanted.clamp(MIN_SCROLL_DISTANCE, MAX_SCROLL_DISTANCE)
}

/// Scroll `max_distance` pixels with the default step timing
///
/// See [`auto_scroll_with`].
pub async fn auto_scroll(
    page: &dyn SearchPage,
    max_distance: i64,
    signal: &CancelSignal,
) -> Result<(), ScrapeError> {
    auto_scroll_with(page, max_distance, ScrollSettings::default(), signal).await
}

/// Scroll the page in fixed steps until `max_distance` is covered, then settle
///
/// Returns `ScrapeError::Cancelled` if the signal fires before or during the
/// loop or while settling. A failing page evaluation propagates unchanged.
/// A non-positive distance is a no-op.
pub async fn auto_scroll_with(
    page: &dyn SearchPage,
    max_distance: i64,
    settings: ScrollSettings,
    signal: &CancelSignal,
) -> Result<(), ScrapeError> {
    signal.check()?;

    if max_distance <= 0 || settings.step_px <= 0 {
        return Ok(());
    }

    let mut scrolled: i64 = 0;
    while scrolled < max_distance {
        signal.check()?;
        page.scroll_by(settings.step_px).await?;
        scrolled = scrolled.saturating_add(settings.step_px);

        if !settings.step_interval.is_zero() {
            tokio::time::sleep(settings.step_interval).await;
        }
    }
    debug!("Scrolled {scrolled}px");

    signal.check()?;
    if !settings.settle.is_zero() {
        tokio::select! {
            () = tokio::time::sleep(settings.settle) => {}
            () = signal.cancelled() => return Err(ScrapeError::Cancelled),
        }
    }
    signal.check()?;

    Ok(())
}
