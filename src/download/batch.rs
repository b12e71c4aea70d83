//! Sequential batch download

use std::path::Path;

use log::{debug, warn};

use super::image::ImageDownloader;
use super::types::{BatchReport, DownloadOptions, ImageRecord};
use crate::cancel::CancelSignal;

/// Download every valid record in order and report per-item results
///
/// Records that are `None` or have no `image_url` are skipped without being
/// counted as failures. Items run one after another; a failure never stops
/// the batch. The returned report always has `success: true`.
///
/// # Errors
///
/// Only fails when `download_dir` itself cannot be created.
pub async fn batch_download(
    downloader: &ImageDownloader,
    records: &[Option<ImageRecord>],
    download_dir: &Path,
    signal: Option<&CancelSignal>,
) -> std::io::Result<BatchReport> {
    tokio::fs::create_dir_all(download_dir).await?;

    let mut report = BatchReport::new(records.len());

    for (position, record) in records.iter().enumerate() {
        let index = position + 1;
        let Some(record) = record.as_ref().filter(|r| r.url().is_some()) else {
            debug!("Skipping record {index}: no image_url");
            continue;
        };
        // url() is Some after the filter above
        let url = record.url().unwrap_or_default().to_string();

        let mut options = DownloadOptions::default().with_index(index);
        if let Some(signal) = signal {
            options = options.with_signal(signal.clone());
        }

        match downloader.download_image(record, download_dir, &options).await {
            Ok(outcome) => report.record_success(outcome),
            Err(e) => {
                warn!("Failed to download image {url}: {e}");
                report.record_failure(url, e.to_string());
            }
        }
    }

    Ok(report)
}
