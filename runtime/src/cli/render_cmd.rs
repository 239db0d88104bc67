//! Built-in rendering collaborator.
//!
//! `smart-scraper render <url>` renders the page in headless Chromium and
//! writes its visible text to stdout. Diagnostics go to stderr and a failed
//! render exits non-zero, which is the contract the subprocess renderer
//! expects from any renderer command.

use crate::config::ServiceConfig;
use crate::renderer::chromium;
use anyhow::Result;
use std::io::Write;

pub async fn run(config: &ServiceConfig, url: &str) -> Result<()> {
    let text =
        chromium::render_once(url, config.render_timeout, config.chromium_path.as_deref()).await?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}")?;
    stdout.flush()?;
    Ok(())
}
