//! html-artifacts binary
//!
//! Wires a [`PageStore`] to the preview server and the MCP stdio server,
//! then runs until the MCP client disconnects or the process is signalled.
use anyhow::{Context, Result};
use artifacts_core::PageStore;
use artifacts_http::HttpServer;
use artifacts_mcp::McpServer;
use clap::Parser;

mod cli;
mod utils;

pub use cli::Cli;

use crate::utils::{initialize_logging, open_on_first_create};

/// Run html-artifacts with the current process arguments and environment.
///
/// # Errors
///
/// Returns an error if the options are invalid, the preview server cannot
/// bind, or the MCP transport fails.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    initialize_logging(&cli)?;

    let store = PageStore::new(cli.store_options().context("invalid store options")?);
    let http = HttpServer::start(store.clone(), &cli.http_options())
        .await
        .context("failed to start preview server")?;

    tracing::info!(url = http.url(), "preview server listening");
    if !cli.quiet {
        eprintln!("html-artifacts dashboard: {}", http.url());
    }

    let browser = (!cli.no_open).then(|| open_on_first_create(&store, http.url().to_string()));
    let mcp = McpServer::new(store.clone(), http.url());

    let outcome = tokio::select! {
        result = mcp.serve_stdio() => result.context("MCP server failed"),
        () = shutdown_signal() => {
            tracing::info!("shutdown signal received");
            Ok(())
        },
    };

    drop(browser);
    let closed = http.close().await;
    store.dispose();

    outcome?;
    closed.context("failed to stop preview server")
}

/// Resolves on SIGINT, or SIGTERM on unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = sigterm.recv() => {},
                }
                return;
            },
            Err(e) => tracing::warn!("failed to install SIGTERM handler: {e}"),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}
