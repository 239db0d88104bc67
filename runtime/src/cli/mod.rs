//! CLI subcommand implementations for the smart-scraper binary.

pub mod classify_cmd;
pub mod doctor;
pub mod render_cmd;
pub mod scrape_cmd;
pub mod serve;

use crate::acquisition::http_client::HttpClient;
use crate::config::{RendererBackend, ServiceConfig};
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::process::ProcessRenderer;
use crate::renderer::DynamicRenderer;
use crate::service::ExtractionService;
use std::sync::Arc;
use tracing::{info, warn};

/// Initialize tracing. Logs always go to stderr so that stdout stays
/// reserved for command output (the `render` subcommand's page text).
pub fn init_tracing(json: bool, verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "smart_scraper={default_level},tower_http={default_level}"
        ))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // A subscriber may already be set (tests); ignore that.
    if json {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}

/// Build the extraction service the configuration describes.
///
/// If the in-process Chromium backend cannot start, the subprocess renderer
/// is used instead.
pub async fn build_service(config: &ServiceConfig) -> ExtractionService {
    let renderer: Arc<dyn DynamicRenderer> = match config.renderer {
        RendererBackend::Process => {
            Arc::new(ProcessRenderer::new(config.renderer_command.clone()))
        }
        RendererBackend::Chromium => {
            match ChromiumRenderer::launch(config.chromium_path.as_deref()).await {
                Ok(r) => {
                    info!("Chromium renderer initialized");
                    Arc::new(r)
                }
                Err(e) => {
                    warn!("Failed to initialize Chromium: {e:#}");
                    warn!("Falling back to the subprocess renderer");
                    Arc::new(ProcessRenderer::new(config.renderer_command.clone()))
                }
            }
        }
    };

    ExtractionService::new(
        HttpClient::new(config.fetch_timeout),
        renderer,
        config.render_timeout,
    )
}
