//! Extraction orchestration.
//!
//! Per request: validate the URL, pick a path (classifier or explicit mode),
//! run exactly one extractor, and return either an outcome or a structured
//! error. Nothing is retried and nothing is cached between requests.

use crate::acquisition::classifier::Classifier;
use crate::acquisition::http_client::HttpClient;
use crate::error::{ExtractionError, ExtractionResult};
use crate::extraction::StaticExtractor;
use crate::renderer::DynamicRenderer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, info_span, Instrument};

/// How the extraction path is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Let the classifier decide.
    #[default]
    Auto,
    /// Always fetch and parse the raw HTML.
    Static,
    /// Always render.
    Dynamic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    pub url: String,
    pub mode: ExtractionMode,
}

impl ExtractionRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: ExtractionMode::Auto,
        }
    }

    pub fn with_mode(mut self, mode: ExtractionMode) -> Self {
        self.mode = mode;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathTaken {
    Static,
    Dynamic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionOutcome {
    #[serde(rename = "type")]
    pub path_taken: PathTaken,
    pub text: String,
}

pub struct ExtractionService {
    classifier: Classifier,
    static_extractor: StaticExtractor,
    renderer: Arc<dyn DynamicRenderer>,
    render_timeout: Duration,
}

impl ExtractionService {
    pub fn new(
        http: HttpClient,
        renderer: Arc<dyn DynamicRenderer>,
        render_timeout: Duration,
    ) -> Self {
        Self {
            classifier: Classifier::new(http.clone()),
            static_extractor: StaticExtractor::new(http),
            renderer,
            render_timeout,
        }
    }

    pub fn renderer_name(&self) -> &'static str {
        self.renderer.name()
    }

    pub async fn extract(&self, request: ExtractionRequest) -> ExtractionResult<ExtractionOutcome> {
        let span = info_span!(
            "extract",
            request_id = %uuid::Uuid::new_v4(),
            url = %request.url,
            mode = ?request.mode,
        );
        self.extract_inner(request).instrument(span).await
    }

    async fn extract_inner(&self, request: ExtractionRequest) -> ExtractionResult<ExtractionOutcome> {
        let started = Instant::now();
        let url = validate_url(&request.url)?;
        let url = url.as_str();

        let path = match request.mode {
            ExtractionMode::Auto => {
                let classification = self.classifier.classify(url).await;
                info!(
                    is_dynamic = classification.is_dynamic,
                    reason = ?classification.reason,
                    "classified"
                );
                if classification.is_dynamic {
                    PathTaken::Dynamic
                } else {
                    PathTaken::Static
                }
            }
            ExtractionMode::Static => PathTaken::Static,
            ExtractionMode::Dynamic => PathTaken::Dynamic,
        };

        let result = match path {
            PathTaken::Dynamic => self
                .renderer
                .render(url, self.render_timeout)
                .await
                .map(|text| text.trim().to_string()),
            PathTaken::Static => self.static_extractor.extract_static(url).await,
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(text) => {
                info!(path = ?path, elapsed_ms, text_len = text.len(), "extraction succeeded");
                Ok(ExtractionOutcome {
                    path_taken: path,
                    text,
                })
            }
            Err(e) => {
                info!(path = ?path, elapsed_ms, kind = ?e.kind, detail = %e.detail, "extraction failed");
                Err(e)
            }
        }
    }
}

/// Require a non-blank absolute http(s) URL.
pub fn validate_url(raw: &str) -> ExtractionResult<url::Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ExtractionError::missing_url());
    }
    let parsed = url::Url::parse(trimmed)
        .map_err(|e| ExtractionError::invalid_url(format!("{trimmed}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ExtractionError::invalid_url(format!(
            "{trimmed}: unsupported scheme '{other}'"
        ))),
    }
}
