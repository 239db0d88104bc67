// Copyright 2026 Smart Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP REST API.
//!
//! `POST /scrape` runs one extraction per request through the shared
//! [`ExtractionService`]. Every response, including rejected bodies, is JSON.
//! Handlers await the extraction inline: if the client disconnects, the
//! handler future is dropped and any renderer it started is killed with it.

use crate::error::ExtractionError;
use crate::service::{ExtractionMode, ExtractionRequest, ExtractionService};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// State shared by all handlers. Immutable after startup.
pub struct AppState {
    pub service: ExtractionService,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(service: ExtractionService) -> Self {
        Self {
            service,
            started_at: Instant::now(),
        }
    }
}

/// Build the axum Router with all REST endpoints.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/scrape", post(scrape))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve the REST API until `shutdown` resolves.
pub async fn start<F>(addr: SocketAddr, state: Arc<AppState>, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("REST API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Body of `POST /scrape`.
#[derive(Debug, Deserialize)]
struct ScrapeBody {
    url: Option<String>,
    #[serde(default)]
    mode: ExtractionMode,
}

// ── Handlers ────────────────────────────────────────────────────

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "renderer": state.service.renderer_name(),
        "uptime_seconds": state.started_at.elapsed().as_secs_f64(),
        "ts": chrono::Utc::now().timestamp_millis(),
    }))
}

async fn scrape(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ScrapeBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => {
            // Shape, syntax and content-type rejections are all client errors.
            tracing::debug!(status = %rejection.status(), "rejected /scrape body");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Invalid request body",
                    "detail": rejection.body_text(),
                })),
            )
                .into_response();
        }
    };

    let request = ExtractionRequest::new(body.url.unwrap_or_default()).with_mode(body.mode);
    match state.service.extract(request).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => e.into_response(),
    }
}

impl IntoResponse for ExtractionError {
    fn into_response(self) -> Response {
        let status = if self.kind.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(self.response_body())).into_response()
    }
}
