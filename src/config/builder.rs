//! Builder for `Config`
//!
//! Collects raw values (typically from CLI flags or their environment
//! fallbacks), then validates the download directory, filename template
//! and proxy in one place.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use super::types::{Config, ConfigError, ProxyUrl};
use crate::filename_template::FilenameTemplate;
use crate::utils::{DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_TIMEOUT, DEFAULT_RETRY_BASE_DELAY};

/// Name of the file written while checking the download directory
const WRITE_CHECK_FILE: &str = ".write-test";

/// Create `dir` if needed and prove it is writable
///
/// Writes and removes a small file. Any failure means the directory
/// cannot receive downloads.
pub fn validate_download_dir(dir: &Path) -> Result<(), ConfigError> {
    let wrap = |source| ConfigError::DownloadDir {
        path: dir.to_path_buf(),
        source,
    };

    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(wrap)?;
        info!("Created download directory: {}", dir.display());
    }

    let check_file = dir.join(WRITE_CHECK_FILE);
    std::fs::write(&check_file, b"test").map_err(wrap)?;
    std::fs::remove_file(&check_file).map_err(wrap)?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    download_dir: PathBuf,
    filename_template: Option<String>,
    proxy: Option<String>,
    chrome_executable: Option<PathBuf>,
    max_retries: u32,
    retry_base_delay: Duration,
    request_timeout: Duration,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("downloads"),
            filename_template: None,
            proxy: None,
            chrome_executable: None,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ConfigBuilder {
    #[must_use]
    pub fn download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    /// Set the filename template; invalid templates fall back to the default at build time
    #[must_use]
    pub fn filename_template(mut self, template: Option<String>) -> Self {
        self.filename_template = template.filter(|t| !t.trim().is_empty());
        self
    }

    #[must_use]
    pub fn proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy.filter(|p| !p.trim().is_empty());
        self
    }

    #[must_use]
    pub fn chrome_executable(mut self, path: Option<PathBuf>) -> Self {
        self.chrome_executable = path;
        self
    }

    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    #[must_use]
    pub fn retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Validate everything and produce a `Config`
    ///
    /// # Errors
    ///
    /// Fails when the download directory cannot be created or written, or
    /// when the proxy URL is malformed. An invalid filename template is not
    /// an error; it is replaced by the default with a warning.
    pub fn build(self) -> Result<Config, ConfigError> {
        let download_dir = if self.download_dir.is_absolute() {
            self.download_dir
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(&self.download_dir))
                .unwrap_or(self.download_dir)
        };
        validate_download_dir(&download_dir)?;
        info!("Using download directory: {}", download_dir.display());

        let filename_template = FilenameTemplate::parse_or_default(self.filename_template.as_deref());

        let proxy = self.proxy.as_deref().map(str::parse::<ProxyUrl>).transpose()?;
        if let Some(proxy) = &proxy {
            info!("Routing image downloads through proxy {proxy}");
        }

        if self.max_retries == 0 {
            warn!("max_retries is 0; failed downloads will not be retried");
        }

        Ok(Config {
            download_dir,
            filename_template,
            proxy,
            chrome_executable: self.chrome_executable,
            max_retries: self.max_retries,
            retry_base_delay: self.retry_base_delay,
            request_timeout: self.request_timeout,
        })
    }
}

impl Config {
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}
