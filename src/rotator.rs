//! Source rotation: the orchestration layer over fetch → extract → validate
//! → select.
//!
//! Sources are attempted strictly in sequence — resilience comes from
//! diversity across sources, not from repeating a failed one, so the rotator
//! never retries a source itself (per-URL retries live in the fetcher). The
//! run stops early once the accumulated pool is large enough, and the whole
//! pass is one awaitable unit of work with a bounded worst-case duration:
//! dropping the future aborts any in-flight fetch, and no partial state
//! survives because the pool dies with the call.
//!
//! Rate-limit spacing, the last-selected-URL memo, and the RNG are all
//! instance fields, so independent rotators (one per guild, say) never
//! cross-talk.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, warn};
use url::Url;

use crate::candidate::VideoCandidate;
use crate::config::ScoutConfig;
use crate::error::ScoutError;
use crate::extractor::Extractor;
use crate::fetcher::HttpFetcher;
use crate::renderer::{RenderContext, Renderer};
use crate::selector;
use crate::validator::Validator;

/// Observable phase of a rotation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotatorState {
    Pending,
    Fetching,
    Extracting,
    Accumulating,
    SourceFailed,
    Done,
    AllFailed,
}

pub struct SourceRotator {
    config: ScoutConfig,
    fetcher: HttpFetcher,
    extractor: Extractor,
    validator: Validator,
    renderer: Option<Box<dyn Renderer>>,
    last_selected_url: Option<String>,
    state: RotatorState,
    rng: StdRng,
}

impl SourceRotator {
    pub fn new(config: ScoutConfig) -> Result<Self, ScoutError> {
        config.validate()?;
        let fetcher = HttpFetcher::new(config.fetch.clone())?;
        let extractor = Extractor::new(&config)?;
        let validator = Validator::new(&config)?;

        Ok(Self {
            config,
            fetcher,
            extractor,
            validator,
            renderer: None,
            last_selected_url: None,
            state: RotatorState::Pending,
            rng: StdRng::from_entropy(),
        })
    }

    /// Wire in a browser engine used as a rendered-fetch fallback when the
    /// plain HTTP fetch for a source fails.
    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Seed the random draws for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn state(&self) -> RotatorState {
        self.state
    }

    /// The URL of the previous pick, if any.
    pub fn last_selected_url(&self) -> Option<&str> {
        self.last_selected_url.as_deref()
    }

    /// Run one full extraction pass and pick a candidate.
    ///
    /// Iterates sources in order (shuffled once when configured), skipping
    /// failed ones, stopping early when enough candidates accumulated. When
    /// everything fails, returns the configured terminal fallback record or
    /// `Exhausted`.
    pub async fn pick(&mut self) -> Result<VideoCandidate, ScoutError> {
        self.state = RotatorState::Pending;

        let mut sources = self.config.sources.clone();
        if self.config.shuffle_sources {
            sources.shuffle(&mut self.rng);
        }

        let mut pool: Vec<VideoCandidate> = Vec::new();
        let mut tried = 0usize;

        for source in &sources {
            tried += 1;
            self.state = RotatorState::Fetching;
            let markup = match self.fetch_markup(source).await {
                Ok(markup) => markup,
                Err(e) => {
                    warn!(source = %source, error = %e, "source failed, moving on");
                    self.state = RotatorState::SourceFailed;
                    continue;
                }
            };

            self.state = RotatorState::Extracting;
            let extracted = match self.extractor.extract(&markup, source) {
                Ok(extracted) => extracted,
                Err(e) => {
                    warn!(source = %source, error = %e, "source unparseable, moving on");
                    self.state = RotatorState::SourceFailed;
                    continue;
                }
            };

            // Source URLs are checked at config load, so this parse holds.
            let Ok(base) = Url::parse(source) else {
                self.state = RotatorState::SourceFailed;
                continue;
            };
            let valid = self.validator.validate(extracted, &base);
            if valid.is_empty() {
                debug!(source = %source, "no valid candidates from this source");
                continue;
            }

            self.state = RotatorState::Accumulating;
            pool.extend(valid);
            info!(source = %source, total = pool.len(), "accumulated candidates");

            if pool.len() >= self.config.min_candidates {
                debug!(total = pool.len(), "enough candidates, stopping early");
                break;
            }
        }

        // Cross-source pass: URLs are already absolute, this only collapses
        // duplicates between sources (validation is idempotent).
        if let Some(first) = sources.first() {
            if let Ok(base) = Url::parse(first) {
                pool = self.validator.validate(pool, &base);
            }
        }

        match selector::select_avoiding(&pool, &mut self.rng, self.last_selected_url.as_deref()) {
            Some(chosen) => {
                let chosen = chosen.clone();
                info!(url = %chosen.url, pool = pool.len(), "selected candidate");
                self.last_selected_url = Some(chosen.url.clone());
                self.state = RotatorState::Done;
                Ok(chosen)
            }
            None => {
                self.state = RotatorState::AllFailed;
                if let Some(fallback) = self.config.fallback.clone() {
                    warn!("all sources failed, returning terminal fallback");
                    return Ok(fallback.into());
                }
                Err(ScoutError::Exhausted {
                    sources_tried: tried,
                })
            }
        }
    }

    /// HTTP fetch with a rendered-fetch fallback when a renderer is wired in.
    async fn fetch_markup(&mut self, url: &str) -> Result<String, ScoutError> {
        let http_err = match self.fetcher.fetch(url).await {
            Ok(markup) => return Ok(markup),
            Err(e) => e,
        };

        let Some(renderer) = &self.renderer else {
            return Err(http_err);
        };

        debug!(url, "HTTP fetch failed, trying rendered fetch");
        match fetch_rendered(renderer.as_ref(), url, self.config.fetch.timeout_ms).await {
            Ok(markup) => Ok(markup),
            Err(render_err) => {
                debug!(url, error = %render_err, "rendered fetch failed too");
                Err(http_err)
            }
        }
    }

    /// Release the browser engine, if one was wired in.
    pub async fn shutdown(&mut self) {
        if let Some(renderer) = self.renderer.take() {
            let _ = renderer.shutdown().await;
        }
    }
}

/// Navigate a fresh context and return its HTML. The context is closed on
/// every exit path so repeated passes do not leak pages.
async fn fetch_rendered(
    renderer: &dyn Renderer,
    url: &str,
    timeout_ms: u64,
) -> anyhow::Result<String> {
    let mut ctx: Box<dyn RenderContext> = renderer.new_context().await?;
    let result = match ctx.navigate(url, timeout_ms).await {
        Ok(_) => ctx.get_html().await,
        Err(e) => Err(e),
    };
    let _ = ctx.close().await;
    result
}
