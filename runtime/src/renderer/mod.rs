//! Renderer abstraction for the dynamic extraction path.
//!
//! Defines the [`DynamicRenderer`] trait that the extraction service depends
//! on. Two backends implement it: an isolated subprocess per render
//! ([`process::ProcessRenderer`]) and a shared in-process Chromium
//! ([`chromium::ChromiumRenderer`]).

pub mod chromium;
pub mod process;

use crate::error::ExtractionResult;
use async_trait::async_trait;
use std::time::Duration;

/// A scripting-capable engine that returns a page's visible text.
#[async_trait]
pub trait DynamicRenderer: Send + Sync {
    /// Render `url` and return its visible text.
    ///
    /// `timeout` is a hard upper bound enforced by the implementation on
    /// behalf of the caller. Exceeding it yields `RenderTimeout`; any other
    /// failure yields `RenderFailure`. Dropping the returned future must
    /// release every resource the render acquired.
    async fn render(&self, url: &str, timeout: Duration) -> ExtractionResult<String>;

    /// Short backend name for logs and diagnostics.
    fn name(&self) -> &'static str;
}
