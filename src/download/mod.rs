//! Image download engine
//!
//! Two contracts live here:
//! - [`download_image_to`]: single ad-hoc download, no retry, returns `bool`
//! - [`ImageDownloader::download_image`]: retrying download that fails with
//!   a [`DownloadError`]; [`batch_download`] runs it over many records

pub mod batch;
pub mod errors;
pub mod fetcher;
pub mod image;
pub mod simple;
pub mod types;

pub use batch::batch_download;
pub use errors::{DownloadError, RetryPolicy};
pub use fetcher::{HttpFetcher, ImageFetcher, build_client};
pub use image::ImageDownloader;
pub use simple::download_image_to;
pub use types::{BatchReport, DownloadOptions, DownloadOutcome, FailedDownload, ImageRecord};
