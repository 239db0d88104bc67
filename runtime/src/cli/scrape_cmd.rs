//! One-shot extraction from the command line.

use crate::cli::build_service;
use crate::config::ServiceConfig;
use crate::service::{ExtractionMode, ExtractionRequest};
use anyhow::{bail, Result};

/// Extract `url` and print the same JSON body `POST /scrape` would return.
pub async fn run(config: &ServiceConfig, url: &str, mode: ExtractionMode) -> Result<()> {
    let service = build_service(config).await;
    match service.extract(ExtractionRequest::new(url).with_mode(mode)).await {
        Ok(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Err(e) => {
            println!("{}", serde_json::to_string_pretty(&e.response_body())?);
            bail!(e)
        }
    }
}
