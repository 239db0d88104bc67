//! Structured extraction errors.
//!
//! Every failure that reaches a caller is an [`ExtractionError`]: a kind from
//! a closed taxonomy plus a free-form detail string. The HTTP layer maps the
//! kind to a status code; nothing below it ever panics on bad input.

use serde::Serialize;
use std::fmt;

/// Closed set of failure categories surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionErrorKind {
    /// The request carried no URL (absent, null, empty or blank).
    MissingUrl,
    /// The URL is not an absolute http(s) URL.
    InvalidUrl,
    /// A page fetch did not complete in time. Classification absorbs it and
    /// the static path reports it as `ParseFailure`.
    FetchTimeout,
    /// The renderer exited non-zero or could not be started.
    RenderFailure,
    /// The renderer exceeded its time budget and was killed.
    RenderTimeout,
    /// The static-path fetch failed or its body could not be read.
    ParseFailure,
}

impl ExtractionErrorKind {
    /// Whether this kind is the client's fault.
    pub fn is_client_error(self) -> bool {
        matches!(self, Self::MissingUrl | Self::InvalidUrl)
    }

    /// Short human-readable message used as the `error` field of responses.
    pub fn message(self) -> &'static str {
        match self {
            Self::MissingUrl => "Missing URL",
            Self::InvalidUrl => "Invalid URL",
            Self::FetchTimeout => "Fetch timed out",
            Self::RenderFailure => "Dynamic scrape failed",
            Self::RenderTimeout => "Dynamic scrape timed out",
            Self::ParseFailure => "Static scrape failed",
        }
    }
}

impl fmt::Display for ExtractionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A failed extraction.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {detail}")]
pub struct ExtractionError {
    pub kind: ExtractionErrorKind,
    pub detail: String,
}

impl ExtractionError {
    pub fn new(kind: ExtractionErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn missing_url() -> Self {
        Self::new(ExtractionErrorKind::MissingUrl, "")
    }

    pub fn invalid_url(detail: impl Into<String>) -> Self {
        Self::new(ExtractionErrorKind::InvalidUrl, detail)
    }

    pub fn render_failure(detail: impl Into<String>) -> Self {
        Self::new(ExtractionErrorKind::RenderFailure, detail)
    }

    pub fn render_timeout(detail: impl Into<String>) -> Self {
        Self::new(ExtractionErrorKind::RenderTimeout, detail)
    }

    pub fn parse_failure(detail: impl Into<String>) -> Self {
        Self::new(ExtractionErrorKind::ParseFailure, detail)
    }

    /// JSON body reported to clients.
    ///
    /// A missing URL reports only `{"error": "Missing URL"}`; every other kind
    /// carries its snake_case `kind` and the `detail`. Renderer failures also
    /// expose the captured diagnostics as `stderr`.
    pub fn response_body(&self) -> serde_json::Value {
        if self.kind == ExtractionErrorKind::MissingUrl {
            return serde_json::json!({ "error": self.kind.message() });
        }
        let mut body = serde_json::json!({
            "error": self.kind.message(),
            "kind": self.kind,
            "detail": self.detail,
        });
        if self.kind == ExtractionErrorKind::RenderFailure {
            body["stderr"] = serde_json::Value::String(self.detail.clone());
        }
        body
    }
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;
