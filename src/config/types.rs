//! Core configuration types
//!
//! `Config` is resolved once at process start and shared by reference with
//! the search and download engines. Nothing below reads the environment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::filename_template::FilenameTemplate;

/// Errors raised while resolving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("download directory {path} is not usable: {source}")]
    DownloadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid proxy URL '{0}': expected scheme://host:port with scheme http, https, socks4 or socks5")]
    InvalidProxy(String),
}

/// Proxy schemes accepted for image downloads
const PROXY_SCHEMES: [&str; 4] = ["http", "https", "socks4", "socks5"];

/// Validated proxy URL of the form `scheme://host:port`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProxyUrl(String);

impl ProxyUrl {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ProxyUrl {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidProxy(s.to_string());
        let parsed = url::Url::parse(s).map_err(|_| invalid())?;

        if !PROXY_SCHEMES.contains(&parsed.scheme()) {
            return Err(invalid());
        }
        if parsed.host_str().is_none_or(str::is_empty) || !has_explicit_port(s) {
            return Err(invalid());
        }

        Ok(Self(s.to_string()))
    }
}

/// `Url::port()` hides default ports, so look at the authority text itself
fn has_explicit_port(s: &str) -> bool {
    let authority = s
        .split_once("://")
        .map_or(s, |(_, rest)| rest)
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    authority
        .rsplit_once(':')
        .is_some_and(|(_, port)| port.parse::<u16>().is_ok())
}

impl TryFrom<String> for ProxyUrl {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProxyUrl> for String {
    fn from(proxy: ProxyUrl) -> Self {
        proxy.0
    }
}

impl fmt::Display for ProxyUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Process-wide configuration for the Pinterest tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Writable directory that receives downloads.
    ///
    /// **INVARIANT:** exists and passed a write check when built through
    /// [`ConfigBuilder::build`](super::ConfigBuilder::build).
    pub(crate) download_dir: PathBuf,
    pub(crate) filename_template: FilenameTemplate,
    pub(crate) proxy: Option<ProxyUrl>,
    /// Explicit Chrome/Chromium executable; discovered on the system when unset
    pub(crate) chrome_executable: Option<PathBuf>,
    pub(crate) max_retries: u32,
    pub(crate) retry_base_delay: Duration,
    pub(crate) request_timeout: Duration,
}
