//! Single ad-hoc download without retry
//!
//! Every failure, cancellation included, is reported as `false`; nothing
//! propagates. The retrying engine in [`super::image`] is the one to use
//! when the caller needs to know why a download failed.

use std::path::Path;

use log::{debug, warn};
use reqwest::Client;

use crate::cancel::CancelSignal;
use crate::utils::to_original_url;

/// Download `image_url` to `output_path`, returning whether it succeeded
///
/// The URL is rewritten to full resolution first. The cancel signal is bound
/// to the in-flight request and rechecked after the headers and after the
/// body arrive.
pub async fn download_image_to(
    client: &Client,
    image_url: &str,
    output_path: &Path,
    signal: &CancelSignal,
) -> bool {
    if image_url.is_empty() || output_path.as_os_str().is_empty() {
        debug!("Image URL or output path is empty");
        return false;
    }

    if signal.is_cancelled() {
        debug!("Download cancelled before starting: {image_url}");
        return false;
    }

    let url = to_original_url(image_url);

    let response = tokio::select! {
        response = client.get(url.as_ref()).send() => response,
        () = signal.cancelled() => {
            debug!("Download cancelled during request: {url}");
            return false;
        }
    };

    let response = match response {
        Ok(response) => response,
        Err(e) => {
            warn!("Failed to download image {url}: {e}");
            return false;
        }
    };

    if !response.status().is_success() {
        warn!("Download failed for {url}, status code: {}", response.status());
        return false;
    }

    if signal.is_cancelled() {
        debug!("Download cancelled after response headers: {url}");
        return false;
    }

    let body = tokio::select! {
        body = response.bytes() => body,
        () = signal.cancelled() => {
            debug!("Download cancelled while reading body: {url}");
            return false;
        }
    };

    let bytes = match body {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to read image body {url}: {e}");
            return false;
        }
    };

    if signal.is_cancelled() {
        debug!("Download cancelled after body: {url}");
        return false;
    }

    match tokio::fs::write(output_path, &bytes).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to write image to {}: {e}", output_path.display());
            false
        }
    }
}
