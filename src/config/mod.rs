//! Configuration module
//!
//! Provides the `Config` struct, resolved once at startup from CLI flags and
//! their environment fallbacks, plus the builder that validates it.

pub mod builder;
pub mod getters;
pub mod types;

pub use builder::{ConfigBuilder, validate_download_dir};
pub use types::{Config, ConfigError, ProxyUrl};
