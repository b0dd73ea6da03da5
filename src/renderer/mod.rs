//! Renderer abstraction for browser-based page fetching.
//!
//! Some listing hosts serve real markup only to a full browser. The
//! `Renderer` and `RenderContext` traits abstract the engine (currently
//! Chromium via chromiumoxide) so the extraction pipeline stays
//! renderer-agnostic and unit-testable against static markup fixtures.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;

/// Result of navigating to a URL.
#[derive(Debug, Clone)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// A browser engine that can create rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new browser context (tab).
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Shut down the browser engine.
    async fn shutdown(&self) -> Result<()>;
    /// Number of currently active contexts.
    fn active_contexts(&self) -> usize;
}

/// A single browser context (tab) for loading pages.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL with a timeout.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;
    /// Get the full page HTML.
    async fn get_html(&self) -> Result<String>;
    /// Close this context.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// A no-op renderer used when Chromium is unavailable.
///
/// The plain HTTP path works without a browser; this stub makes the
/// rendered-fetch fallback return errors while everything else functions.
pub struct NoopRenderer;

#[async_trait]
impl Renderer for NoopRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        Err(anyhow::anyhow!("browser not available — HTTP-only mode"))
    }
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
    fn active_contexts(&self) -> usize {
        0
    }
}
