//! Retrying single-image download
//!
//! Used by batch orchestration. Unlike [`super::simple`], this engine
//! returns an error on ultimate failure so the caller can record it.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use log::{debug, info, warn};

use super::errors::{DownloadError, RetryPolicy};
use super::fetcher::{HttpFetcher, ImageFetcher};
use super::types::{DownloadOptions, DownloadOutcome, ImageRecord};
use crate::cancel::CancelSignal;
use crate::config::Config;
use crate::filename_template::{FilenameTemplate, TemplateVars};
use crate::utils::{file_extension_from_url, image_id_from_url};

/// Downloads images with retry, backoff and templated file names
#[derive(Clone)]
pub struct ImageDownloader {
    fetcher: Arc<dyn ImageFetcher>,
    template: FilenameTemplate,
    retry: RetryPolicy,
}

impl ImageDownloader {
    #[must_use]
    pub fn new(fetcher: Arc<dyn ImageFetcher>, template: FilenameTemplate, retry: RetryPolicy) -> Self {
        Self {
            fetcher,
            template,
            retry,
        }
    }

    /// Downloader wired to a reqwest client built from `config`
    pub fn from_config(config: &Config) -> Result<Self, DownloadError> {
        Ok(Self::new(
            Arc::new(HttpFetcher::from_config(config)?),
            config.filename_template().clone(),
            config.retry_policy(),
        ))
    }

    #[must_use]
    pub fn template(&self) -> &FilenameTemplate {
        &self.template
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Download one image into `download_dir`
    ///
    /// The id comes from the record, else from the URL's last path segment;
    /// the extension comes from the URL (default `jpg`). The file name is
    /// rendered from the template with the optional batch index.
    ///
    /// # Errors
    ///
    /// Returns the last error once retries are exhausted, or immediately for
    /// non-retryable errors (4xx, IO, invalid record, cancellation).
    pub async fn download_image(
        &self,
        record: &ImageRecord,
        download_dir: &Path,
        options: &DownloadOptions,
    ) -> Result<DownloadOutcome, DownloadError> {
        let url = record
            .url()
            .ok_or_else(|| DownloadError::InvalidRecord("record has no image_url".to_string()))?;

        let image_id = record
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| image_id_from_url(url));
        let file_extension = file_extension_from_url(url);

        let mut vars = TemplateVars::new(image_id.clone(), file_extension);
        vars.index = options.index;
        let file_name = self.template.render(&vars);
        let output_path = download_dir.join(&file_name);

        tokio::fs::create_dir_all(download_dir).await?;

        let bytes = self.fetch_with_retry(url, options.signal.as_ref()).await?;
        tokio::fs::write(&output_path, &bytes).await?;

        info!("Saved {} ({} bytes) to {}", url, bytes.len(), output_path.display());

        Ok(DownloadOutcome {
            success: true,
            id: image_id,
            path: output_path.to_string_lossy().into_owned(),
            url: url.to_string(),
        })
    }

    /// Fetch with exponential backoff on retryable errors
    async fn fetch_with_retry(
        &self,
        url: &str,
        signal: Option<&CancelSignal>,
    ) -> Result<Bytes, DownloadError> {
        let mut retries = 0;
        loop {
            if let Some(signal) = signal {
                signal.check()?;
            }

            let attempt = match signal {
                Some(signal) => tokio::select! {
                    result = self.fetcher.fetch(url) => result,
                    () = signal.cancelled() => Err(DownloadError::Cancelled),
                },
                None => self.fetcher.fetch(url).await,
            };

            let error = match attempt {
                Ok(bytes) => return Ok(bytes),
                Err(e) => e,
            };

            if !error.is_retryable() {
                debug!("Non-retryable download error for {url}: {error}");
                return Err(error);
            }

            if retries >= self.retry.max_retries {
                warn!("Max retries ({}) exceeded for {url}: {error}", self.retry.max_retries);
                return Err(error);
            }

            let delay = self.retry.delay_for_attempt(retries);
            warn!(
                "Retryable error, attempt {}/{}, retrying {url} in {}ms: {error}",
                retries + 1,
                self.retry.max_retries,
                delay.as_millis()
            );

            match signal {
                Some(signal) => tokio::select! {
                    () = tokio::time::sleep(delay) => {}
                    () = signal.cancelled() => return Err(DownloadError::Cancelled),
                },
                None => tokio::time::sleep(delay).await,
            }
            retries += 1;
        }
    }
}
