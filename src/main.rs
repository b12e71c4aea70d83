// Pinterest MCP server
//
// Serves the Pinterest search and download tools over stdio. Logs go to
// stderr because stdout carries the MCP transport.

use anyhow::{Context, Result};
use clap::Parser;
use rmcp::{ServiceExt, transport::stdio};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use pinterest_mcp::config::Config;
use pinterest_mcp::mcp::PinterestMcpServer;
use pinterest_mcp::utils::constants::DEFAULT_MAX_RETRIES;

#[derive(Debug, Parser)]
#[command(name = "pinterest-mcp", version, about = "Pinterest image search MCP server")]
struct Cli {
    /// Directory downloaded images are written to
    #[arg(long, env = "MCP_PINTEREST_DOWNLOAD_DIR", default_value = "downloads")]
    download_dir: PathBuf,

    /// File name template, e.g. `pinterest_{imageId}.{fileExtension}`
    #[arg(long, env = "MCP_PINTEREST_FILENAME_TEMPLATE")]
    filename_template: Option<String>,

    /// Proxy for image downloads, `scheme://host:port`
    #[arg(long = "proxy", env = "MCP_PINTEREST_PROXY_SERVER")]
    proxy: Option<String>,

    /// Chrome/Chromium executable; discovered or downloaded when unset
    #[arg(long, env = "CHROMIUM_PATH")]
    chrome_path: Option<PathBuf>,

    /// Retries after the first attempt for a failed download
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    max_retries: u32,

    /// Per-request timeout for image downloads, in seconds
    #[arg(long, default_value_t = 30)]
    request_timeout_secs: u64,
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("pinterest_mcp=info"))
        .context("Invalid log filter")?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    tracing::info!("Starting Pinterest MCP Server");

    let config = Config::builder()
        .download_dir(cli.download_dir)
        .filename_template(cli.filename_template)
        .proxy(cli.proxy)
        .chrome_executable(cli.chrome_path)
        .max_retries(cli.max_retries)
        .request_timeout(Duration::from_secs(cli.request_timeout_secs))
        .build()
        .context("Invalid configuration")?;

    tracing::info!("Download directory: {}", config.download_dir().display());
    tracing::info!("Filename template: {}", config.filename_template());

    let server = PinterestMcpServer::new(Arc::new(config))?;
    let shutdown = server.clone();
    let service = server.serve(stdio()).await?;

    tracing::info!("Server running, waiting for requests...");
    tokio::select! {
        result = service.waiting() => {
            result?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            tracing::info!("Received Ctrl-C");
            shutdown.cleanup();
        }
    }

    tracing::info!("Server shutting down");
    Ok(())
}
