//! Show how a URL would be classified, without extracting it.

use crate::acquisition::classifier::Classifier;
use crate::acquisition::http_client::HttpClient;
use crate::config::ServiceConfig;
use crate::service::validate_url;
use anyhow::Result;

pub async fn run(config: &ServiceConfig, url: &str) -> Result<()> {
    let url = validate_url(url)?;
    let classifier = Classifier::new(HttpClient::new(config.fetch_timeout));
    let result = classifier.classify(url.as_str()).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
