//! HTTP transport for image downloads
//!
//! `ImageFetcher` is the seam between the retrying engine and the network;
//! `HttpFetcher` is the reqwest implementation used in production.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;

use super::errors::DownloadError;
use crate::config::{Config, ProxyUrl};
use crate::utils::{CHROME_USER_AGENT, DEFAULT_REQUEST_TIMEOUT};

/// Fetch the raw bytes behind an image URL
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, DownloadError>;
}

/// Build a reqwest client with browser-like headers, a request timeout and an optional proxy
pub fn build_client(timeout: Duration, proxy: Option<&ProxyUrl>) -> Result<Client, DownloadError> {
    let mut builder = Client::builder()
        .timeout(timeout)
        .user_agent(CHROME_USER_AGENT);

    if let Some(proxy) = proxy {
        let proxy = reqwest::Proxy::all(proxy.as_str())
            .map_err(|e| DownloadError::Request(format!("invalid proxy {proxy}: {e}")))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| DownloadError::Request(format!("failed to build HTTP client: {e}")))
}

/// reqwest-backed fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Client configured from the process `Config` (timeout and proxy)
    pub fn from_config(config: &Config) -> Result<Self, DownloadError> {
        Ok(Self::new(build_client(config.request_timeout(), config.proxy())?))
    }

    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        let client = build_client(DEFAULT_REQUEST_TIMEOUT, None).unwrap_or_default();
        Self::new(client)
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, DownloadError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "image/avif,image/webp,image/apng,image/*,*/*;q=0.8")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?)
    }
}
