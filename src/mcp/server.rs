//! MCP server exposing the Pinterest tools over rmcp

use anyhow::Result;
use rmcp::{
    ErrorData as McpError,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use super::args::{RawToolArgs, SearchArgs};
use super::response::{ImageInfo, download_lines, keyword_dir_name, search_lines};
use crate::cancel::CancelSignal;
use crate::config::Config;
use crate::download::{ImageDownloader, ImageRecord, batch_download};
use crate::scraper::{PinterestScraper, SearchResult};

/// Name reported in the MCP handshake
pub const SERVER_NAME: &str = "pinterest-mcp-server";

// ============================================================================
// Parameter Types
// ============================================================================

/// Arguments shared by the two search tools
///
/// Values are kept as raw JSON and normalized leniently, so `"limit": "5"`
/// or backtick-quoted keys still work.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct SearchToolParams {
    #[schemars(with = "String", description = "Search keyword")]
    #[serde(default)]
    pub keyword: Option<Value>,

    #[schemars(
        with = "Option<i64>",
        description = "Number of images to return (default: 10)"
    )]
    #[serde(default)]
    pub limit: Option<Value>,

    #[schemars(
        with = "Option<bool>",
        description = "Whether to use headless browser mode (default: true)"
    )]
    #[serde(default)]
    pub headless: Option<Value>,

    #[schemars(skip)]
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchToolParams {
    #[must_use]
    pub fn into_raw(self) -> RawToolArgs {
        let mut map = self.extra;
        for (key, value) in [
            ("keyword", self.keyword),
            ("limit", self.limit),
            ("headless", self.headless),
        ] {
            if let Some(value) = value {
                map.insert(key.to_string(), value);
            }
        }
        RawToolArgs::Object(map)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ImageInfoParams {
    #[schemars(description = "Image URL")]
    pub image_url: String,
}

// ============================================================================
// Server
// ============================================================================

/// Pinterest MCP server
///
/// Every search observes the server's shutdown signal; [`cleanup`] fires it
/// so in-flight searches unwind and close their browsers.
///
/// [`cleanup`]: PinterestMcpServer::cleanup
#[derive(Clone)]
pub struct PinterestMcpServer {
    config: Arc<Config>,
    scraper: PinterestScraper,
    downloader: ImageDownloader,
    shutdown: CancelSignal,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl PinterestMcpServer {
    /// Server backed by a local Chrome and a reqwest downloader built from `config`
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let scraper = PinterestScraper::chromium(config.chrome_executable().map(Path::to_path_buf));
        let downloader = ImageDownloader::from_config(&config)?;
        Ok(Self::with_engines(config, scraper, downloader))
    }

    #[must_use]
    pub fn with_engines(
        config: Arc<Config>,
        scraper: PinterestScraper,
        downloader: ImageDownloader,
    ) -> Self {
        Self {
            config,
            scraper,
            downloader,
            shutdown: CancelSignal::new(),
            tool_router: Self::tool_router(),
        }
    }

    /// Release held resources; in-flight and later searches are cancelled
    pub fn cleanup(&self) {
        info!("Cleaning up Pinterest MCP server");
        self.shutdown.cancel();
    }

    #[must_use]
    pub fn shutdown_signal(&self) -> &CancelSignal {
        &self.shutdown
    }

    /// Run a search; cancellation is reported as no results
    pub async fn run_search(&self, args: &SearchArgs) -> Vec<SearchResult> {
        match self
            .scraper
            .search(&args.keyword, args.limit, args.headless, &self.shutdown)
            .await
        {
            Ok(results) => results,
            Err(e) => {
                info!("Search for {:?} ended early: {e}", args.keyword);
                Vec::new()
            }
        }
    }

    /// Search, then download every result into `<download_dir>/<keyword>`
    pub async fn search_and_download(&self, args: &SearchArgs) -> Vec<String> {
        let keyword_dir = self
            .config
            .download_dir()
            .join(keyword_dir_name(&args.keyword));

        if let Err(e) = tokio::fs::create_dir_all(&keyword_dir).await {
            warn!("Failed to create {}: {e}", keyword_dir.display());
            return vec![format!("Failed to create download directory: {e}")];
        }

        let results = self.run_search(args).await;
        let records: Vec<Option<ImageRecord>> =
            results.iter().map(|r| Some(ImageRecord::from(r))).collect();

        match batch_download(&self.downloader, &records, &keyword_dir, Some(&self.shutdown)).await {
            Ok(report) => {
                info!(
                    "Downloaded {}/{} images for {:?} into {}",
                    report.downloaded_count,
                    report.total,
                    args.keyword,
                    keyword_dir.display()
                );
                download_lines(&args.keyword, &results, &report)
            }
            Err(e) => {
                warn!("Batch download failed: {e}");
                vec![format!("Error during search and download: {e}")]
            }
        }
    }

    #[tool(description = "Search for images on Pinterest by keyword")]
    async fn pinterest_search(
        &self,
        Parameters(params): Parameters<SearchToolParams>,
    ) -> Result<CallToolResult, McpError> {
        let args = SearchArgs::normalize(params.into_raw());
        info!(
            "pinterest_search: keyword={:?} limit={} headless={}",
            args.keyword, args.limit, args.headless
        );

        let results = self.run_search(&args).await;
        Ok(text_result(search_lines(&args.keyword, &results)))
    }

    #[tool(description = "Get Pinterest image information")]
    async fn pinterest_get_image_info(
        &self,
        Parameters(params): Parameters<ImageInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        let info = ImageInfo::now(params.image_url);
        let json = serde_json::to_string_pretty(&info)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        Ok(text_result(vec![
            "Pinterest Image Information".to_string(),
            json,
        ]))
    }

    #[tool(description = "Search for images on Pinterest by keyword and download them")]
    async fn pinterest_search_and_download(
        &self,
        Parameters(params): Parameters<SearchToolParams>,
    ) -> Result<CallToolResult, McpError> {
        let args = SearchArgs::normalize(params.into_raw());
        info!(
            "pinterest_search_and_download: keyword={:?} limit={} headless={}",
            args.keyword, args.limit, args.headless
        );

        Ok(text_result(self.search_and_download(&args).await))
    }
}

fn text_result(lines: Vec<String>) -> CallToolResult {
    CallToolResult::success(lines.into_iter().map(Content::text).collect())
}

#[tool_handler]
impl rmcp::ServerHandler for PinterestMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Pinterest MCP Server - search Pinterest images by keyword with a headless \
                 browser, inspect image URLs, and download full-resolution images to the \
                 configured download directory."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
