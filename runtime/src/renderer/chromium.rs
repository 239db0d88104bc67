//! Chromium-based renderer using chromiumoxide.
//!
//! One headless browser per [`ChromiumRenderer`], one fresh tab per render.
//! Backs both the in-process dynamic path and the `render` subcommand that
//! the subprocess renderer invokes by default.

use super::DynamicRenderer;
use crate::error::{ExtractionError, ExtractionResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::debug;

/// Script evaluated in the page to read what a user would see.
const VISIBLE_TEXT_JS: &str = "document.body ? document.body.innerText : ''";

/// Find the Chromium binary path.
pub fn find_chromium(explicit: Option<&Path>) -> Option<PathBuf> {
    // 1. Configured path
    if let Some(p) = explicit {
        if p.exists() {
            return Some(p.to_path_buf());
        }
    }

    // 2. ~/.smart-scraper/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".smart-scraper/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".smart-scraper/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".smart-scraper/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".smart-scraper/chromium/chrome-linux64/chrome"),
                home.join(".smart-scraper/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Chromium-based renderer.
pub struct ChromiumRenderer {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl ChromiumRenderer {
    /// Launch a headless Chromium instance.
    pub async fn launch(chromium_path: Option<&Path>) -> Result<Self> {
        let chrome_path = find_chromium(chromium_path)
            .context("Chromium not found. Set SCRAPER_CHROMIUM_PATH or install Chrome.")?;

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Drive the CDP connection.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Self { browser, handler })
    }

    /// Close the browser and wait for its process to exit.
    pub async fn shutdown(mut self) -> Result<()> {
        self.browser.close().await.context("failed to close Chromium")?;
        let _ = self.browser.wait().await;
        self.handler.abort();
        Ok(())
    }
}

#[async_trait]
impl DynamicRenderer for ChromiumRenderer {
    async fn render(&self, url: &str, timeout: Duration) -> ExtractionResult<String> {
        let started = Instant::now();
        let timed_out = || {
            ExtractionError::render_timeout(format!(
                "page did not render within {}ms",
                timeout.as_millis()
            ))
        };

        let page = tokio::time::timeout(timeout, self.browser.new_page("about:blank"))
            .await
            .map_err(|_| timed_out())?
            .map_err(|e| ExtractionError::render_failure(format!("failed to open page: {e}")))?;
        let _close = ClosePageOnDrop(Some(page.clone()));

        let remaining = timeout.saturating_sub(started.elapsed());
        match tokio::time::timeout(remaining, visible_text(&page, url)).await {
            Ok(Ok(text)) => {
                debug!(url, elapsed_ms = started.elapsed().as_millis() as u64, "page rendered");
                Ok(text)
            }
            Ok(Err(e)) => Err(ExtractionError::render_failure(format!("{e:#}"))),
            Err(_) => Err(timed_out()),
        }
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}

async fn visible_text(page: &Page, url: &str) -> Result<String> {
    page.goto(url).await.context("navigation failed")?;
    let _ = page.wait_for_navigation().await;

    let result = page
        .evaluate(VISIBLE_TEXT_JS)
        .await
        .context("failed to read page text")?;

    result
        .into_value::<String>()
        .map_err(|e| anyhow::anyhow!("page text was not a string: {e:?}"))
}

/// Closes the tab when dropped, including when the render is cancelled.
struct ClosePageOnDrop(Option<Page>);

impl Drop for ClosePageOnDrop {
    fn drop(&mut self) {
        if let Some(page) = self.0.take() {
            if let Ok(rt) = tokio::runtime::Handle::try_current() {
                rt.spawn(async move {
                    let _ = page.close().await;
                });
            }
        }
    }
}

/// Render a single page with a short-lived browser.
///
/// Used by the `render` subcommand, which is the default subprocess renderer.
pub async fn render_once(
    url: &str,
    timeout: Duration,
    chromium_path: Option<&Path>,
) -> Result<String> {
    let renderer = ChromiumRenderer::launch(chromium_path).await?;
    let result = renderer.render(url, timeout).await;
    if let Err(e) = renderer.shutdown().await {
        debug!("browser shutdown: {e:#}");
    }
    Ok(result?)
}
