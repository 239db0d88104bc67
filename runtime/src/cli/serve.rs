//! Run the HTTP extraction service.

use crate::cli::build_service;
use crate::config::ServiceConfig;
use crate::rest::{self, AppState};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Start the service and block until Ctrl-C.
pub async fn run(config: ServiceConfig) -> Result<()> {
    info!("starting smart-scraper v{}", env!("CARGO_PKG_VERSION"));
    info!(
        fetch_timeout_ms = config.fetch_timeout.as_millis() as u64,
        render_timeout_ms = config.render_timeout.as_millis() as u64,
        renderer = ?config.renderer,
        renderer_cmd = %config.renderer_command.program.display(),
        "configuration loaded"
    );

    let service = build_service(&config).await;
    let state = Arc::new(AppState::new(service));
    let addr = SocketAddr::new(config.host, config.port);

    rest::start(addr, state, shutdown_signal())
        .await
        .with_context(|| format!("REST API on {addr} failed"))?;

    info!("smart-scraper stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("received shutdown signal");
}
