//! MCP (Model Context Protocol) tools for Pinterest image search
//!
//! ## Tools
//!
//! - `pinterest_search`: search by keyword, return image URLs and titles
//! - `pinterest_get_image_info`: describe an image URL
//! - `pinterest_search_and_download`: search, then download every result into
//!   `<download_dir>/<sanitized keyword>/`
//!
//! Search arguments are normalized leniently by [`args::SearchArgs::normalize`].

pub mod args;
pub mod response;
pub mod server;

pub use args::{RawToolArgs, SearchArgs};
pub use response::{ImageInfo, download_lines, keyword_dir_name, search_lines};
pub use server::{ImageInfoParams, PinterestMcpServer, SERVER_NAME, SearchToolParams};
