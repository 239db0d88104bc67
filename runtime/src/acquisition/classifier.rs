//! Static-vs-dynamic page classification.
//!
//! One cheap GET decides which extraction path a URL takes. A short body
//! containing a script tag is treated as an application shell whose content
//! only appears after rendering. A fetch that fails for any reason fails
//! open to the dynamic path.

use super::http_client::{FetchError, FetchOutcome, HttpClient};
use serde::Serialize;
use tracing::{debug, warn};

/// Bodies shorter than this (in characters) that contain a script tag are
/// classified as dynamic.
pub const SCRIPT_SHELL_MAX_CHARS: usize = 300;

const SCRIPT_MARKER: &str = "<script";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationReason {
    ScriptMarkerFound,
    FetchFailed,
    ContentSufficient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub is_dynamic: bool,
    pub reason: ClassificationReason,
}

impl ClassificationResult {
    fn dynamic(reason: ClassificationReason) -> Self {
        Self {
            is_dynamic: true,
            reason,
        }
    }

    fn static_content() -> Self {
        Self {
            is_dynamic: false,
            reason: ClassificationReason::ContentSufficient,
        }
    }
}

/// Classify a successfully fetched body.
pub fn classify_body(body: &str) -> ClassificationResult {
    let has_marker = body.to_lowercase().contains(SCRIPT_MARKER);
    if has_marker && body.chars().count() < SCRIPT_SHELL_MAX_CHARS {
        ClassificationResult::dynamic(ClassificationReason::ScriptMarkerFound)
    } else {
        ClassificationResult::static_content()
    }
}

/// Classify the outcome of the classification fetch.
pub fn classify_fetch(fetch: &Result<FetchOutcome, FetchError>) -> ClassificationResult {
    match fetch {
        Ok(outcome) => classify_body(&outcome.body),
        Err(e) => {
            warn!(timeout = e.is_timeout(), "classification fetch failed, assuming dynamic: {e}");
            ClassificationResult::dynamic(ClassificationReason::FetchFailed)
        }
    }
}

#[derive(Clone)]
pub struct Classifier {
    http: HttpClient,
}

impl Classifier {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn classify(&self, url: &str) -> ClassificationResult {
        let fetch = self.http.get(url).await;
        let result = classify_fetch(&fetch);
        debug!(url, is_dynamic = result.is_dynamic, reason = ?result.reason, "classified");
        result
    }
}
