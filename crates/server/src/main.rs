//! scribe-offline server entry point.
//!
//! Boots the cache coordinator and serves it as MCP tools on stdio.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use scribe_offline_client::{Coordinator, CoordinatorConfig, FetchConfig, HttpNetwork};
use scribe_offline_core::{AppConfig, CacheDb};
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    tracing::info!(origin = %config.origin, generation = %config.generation, db = %config.db_path.display(), "Starting scribe-offline on stdio transport");

    let store = CacheDb::open(&config.db_path)
        .await
        .map_err(|e| anyhow!("opening cache store at {}: {e}", config.db_path.display()))?;
    let network = HttpNetwork::new(FetchConfig::from(&config))?;
    let coordinator = Arc::new(Coordinator::new(
        CoordinatorConfig::try_from(&config).map_err(|e| anyhow!("{e}"))?,
        Arc::new(store),
        Arc::new(network),
    ));

    match coordinator.register().await {
        Ok(report) => tracing::info!(generation = %report.generation, deleted = ?report.deleted, "cache ready"),
        Err(e) => tracing::warn!(error = %e, "cache registration failed; requests pass through until cache_register succeeds"),
    }

    let handler = handler::ScribeOfflineServer::new(Arc::clone(&coordinator));
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;
    coordinator.settle().await;

    Ok(())
}
