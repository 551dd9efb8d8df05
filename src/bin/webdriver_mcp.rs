//! WebDriver MCP Server
//!
//! This binary serves the browser automation tools over the Model Context
//! Protocol, on stdio (default) or streamable HTTP.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use rmcp::transport::streamable_http_server::{StreamableHttpService, session::local::LocalSessionManager};
use rmcp::{ServiceExt, transport::stdio};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use webdriver_mcp::browser::{BrowserOptions, WindowSize};
use webdriver_mcp::mcp::BrowserServer;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);
const STREAM_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Transport {
    /// Standard input/output transport (default)
    Stdio,
    /// HTTP streamable transport
    Http,
}

#[derive(Parser)]
#[command(name = "webdriver-mcp")]
#[command(version)]
#[command(about = "WebDriver browser automation MCP server", long_about = None)]
struct Cli {
    /// Launch browsers in headless mode
    #[arg(long)]
    headless: bool,

    /// WebDriver grid URL; browsers are launched through local drivers when omitted
    #[arg(long, value_name = "URL", env = "WEBDRIVER_GRID_URL")]
    grid_url: Option<String>,

    /// Browser window size, e.g. 1600x900
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_window_size)]
    window_size: Option<WindowSize>,

    /// Transport type to use
    #[arg(long, short = 't', value_enum, default_value = "stdio")]
    transport: Transport,

    /// Port for HTTP transport
    #[arg(long, short = 'p', default_value = "3000")]
    port: u16,

    /// HTTP streamable endpoint path
    #[arg(long, default_value = "/mcp")]
    http_path: String,
}

fn parse_window_size(s: &str) -> Result<WindowSize, String> {
    s.parse().map_err(|e: webdriver_mcp::BrowserError| e.to_string())
}

impl Cli {
    fn browser_options(&self) -> BrowserOptions {
        let mut options = BrowserOptions::new().headless(self.headless);
        if let Some(url) = &self.grid_url {
            options = options.grid_url(url.clone());
        }
        if let Some(size) = self.window_size {
            options = options.window_size(size.width, size.height);
        }
        options
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let options = cli.browser_options();

    log::info!("WebDriver MCP Server v{}", env!("CARGO_PKG_VERSION"));
    log::info!(
        "Browser mode: {}, grid: {}",
        if options.headless { "headless" } else { "headed" },
        options.grid_url.as_deref().unwrap_or("local")
    );

    let server = BrowserServer::new(options);

    let served = match cli.transport {
        Transport::Stdio => serve_stdio(server.clone()).await,
        Transport::Http => serve_http(server.clone(), cli.port, &cli.http_path).await,
    };
    if let Err(e) = &served {
        log::error!("Server error: {:#}", e);
    }

    tokio::select! {
        _ = server.shutdown() => {
            log::info!("Cleanup complete, exiting...");
        }
        _ = tokio::time::sleep(SHUTDOWN_TIMEOUT) => {
            log::error!("Cleanup did not finish within {:?}, exiting", SHUTDOWN_TIMEOUT);
            return ExitCode::FAILURE;
        }
    }

    if served.is_err() { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

async fn serve_stdio(server: BrowserServer) -> anyhow::Result<()> {
    log::info!("Transport: stdio");

    let service = server
        .serve(stdio())
        .await
        .context("Failed to start stdio transport")?;
    log::info!("Ready to accept MCP connections via stdio");

    tokio::select! {
        reason = service.waiting() => {
            let reason = reason.context("MCP service failed")?;
            log::info!("Server quit with reason: {:?}", reason);
        }
        _ = shutdown_signal() => {}
    }
    Ok(())
}

async fn serve_http(server: BrowserServer, port: u16, path: &str) -> anyhow::Result<()> {
    log::info!("Transport: HTTP streamable");

    let http_service = StreamableHttpService::new(
        move || Ok(server.clone()),
        Arc::new(LocalSessionManager::default()),
        Default::default(),
    );
    let router = axum::Router::new().nest_service(path, http_service);

    let bind_addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    log::info!("Ready to accept MCP connections at http://{}{}", bind_addr, path);

    let ct = CancellationToken::new();
    let graceful = ct.clone();
    let serve = axum::serve(listener, router)
        .with_graceful_shutdown(async move { graceful.cancelled().await })
        .into_future();

    run_until_shutdown(serve, shutdown_signal(), &ct, STREAM_DRAIN_TIMEOUT).await
}

/// Drive `serve` until it ends by itself or `shutdown` fires. After shutdown,
/// `serve` gets `drain` to finish; open streams still pending then are dropped.
async fn run_until_shutdown<S, E>(
    serve: S,
    shutdown: impl Future<Output = ()>,
    cancel: &CancellationToken,
    drain: Duration,
) -> anyhow::Result<()>
where
    S: Future<Output = Result<(), E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    tokio::pin!(serve);
    tokio::select! {
        result = &mut serve => return result.context("HTTP server error"),
        _ = shutdown => cancel.cancel(),
    }

    match tokio::time::timeout(drain, serve).await {
        Ok(result) => result.context("HTTP server error"),
        Err(_) => {
            log::warn!("Open MCP streams did not close within {:?}, dropping them", drain);
            Ok(())
        }
    }
}

/// Resolves on SIGINT, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => log::info!("Received SIGINT"),
        _ = terminate => log::info!("Received SIGTERM"),
    }
}
