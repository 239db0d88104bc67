//! Static extraction path: fetch raw HTML and flatten it to text.

pub mod text;

use crate::acquisition::http_client::{FetchError, HttpClient};
use crate::error::{ExtractionError, ExtractionResult};
use tracing::debug;

pub use text::html_to_text;

#[derive(Clone)]
pub struct StaticExtractor {
    http: HttpClient,
}

impl StaticExtractor {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Fetch `url` afresh and return its visible text.
    pub async fn extract_static(&self, url: &str) -> ExtractionResult<String> {
        let page = self.http.get(url).await.map_err(fetch_error)?;
        let text = html_to_text(&page.body);
        debug!(
            url,
            final_url = %page.final_url,
            html_len = page.body.len(),
            text_len = text.len(),
            "static extraction complete"
        );
        Ok(text)
    }
}

/// Every static-path fetch failure, timeouts included, is a parse failure.
fn fetch_error(e: FetchError) -> ExtractionError {
    ExtractionError::parse_failure(e.to_string())
}
