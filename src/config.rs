//! Typed configuration for the scout pipeline.
//!
//! Defaults are embedded at compile time from `default_config.json` so there
//! is no runtime file I/O on the default path. Site-layout variants are data,
//! not code: a new selector list, code-pattern ranking, or deny fragment
//! ships as a config entry instead of a fork of the extractor.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::candidate::VideoCandidate;
use crate::error::ScoutError;

/// Raw JSON defaults, embedded at compile time.
const DEFAULT_CONFIG: &str = include_str!("default_config.json");

/// One extraction strategy: a named CSS selector, ranked by reliability.
/// Strategies are applied in list order, most specific first.
#[derive(Debug, Clone, Deserialize)]
pub struct Strategy {
    pub name: String,
    pub selector: String,
}

/// Terminal fallback record, returned only when every other mechanism fails.
#[derive(Debug, Clone, Deserialize)]
pub struct FallbackVideo {
    pub title: String,
    pub url: String,
    pub image: Option<String>,
}

impl From<FallbackVideo> for VideoCandidate {
    fn from(fb: FallbackVideo) -> Self {
        VideoCandidate {
            title: fb.title,
            code: None,
            url: fb.url,
            image: fb.image,
        }
    }
}

/// HTTP fetch behavior: deadline, retry budget, backoff, header spoofing.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Per-request deadline in milliseconds.
    pub timeout_ms: u64,
    /// Maximum attempts per URL.
    pub retries: u32,
    /// Delay unit for exponential backoff between attempts.
    pub backoff_base_ms: u64,
    /// Minimum spacing between consecutive requests from one fetcher.
    pub min_request_spacing_ms: u64,
    /// User-Agent pool; one is drawn per attempt.
    pub user_agents: Vec<String>,
    /// Additional spoofed browser headers sent with every request.
    pub headers: BTreeMap<String, String>,
}

/// Full pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoutConfig {
    /// Base listing URLs to attempt, in order.
    pub sources: Vec<String>,
    /// Shuffle the source order once per run.
    pub shuffle_sources: bool,
    /// Ranked extraction strategies.
    pub strategies: Vec<Strategy>,
    /// Ranked regex patterns for the video code, provider formats first.
    pub code_patterns: Vec<String>,
    /// URL paths must match one of these to count as a playable entry.
    pub video_path_patterns: Vec<String>,
    /// URL paths containing any of these fragments are never videos.
    pub exclude_path_fragments: Vec<String>,
    /// Stop applying strategies once this many candidates were extracted
    /// from one page. A cost cutoff, not a correctness rule.
    pub candidate_ceiling: usize,
    /// Stop iterating sources once the accumulated pool reaches this size.
    pub min_candidates: usize,
    /// Title truncation bound for downstream display consumers.
    pub max_title_len: usize,
    /// Terminal fallback record; `null` disables it.
    pub fallback: Option<FallbackVideo>,
    pub fetch: FetchConfig,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        serde_json::from_str(DEFAULT_CONFIG).expect("embedded default config is valid")
    }
}

impl ScoutConfig {
    /// Load a full config from a JSON file, validating it.
    pub fn load(path: &Path) -> Result<Self, ScoutError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ScoutError::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: ScoutConfig = serde_json::from_str(&raw)
            .map_err(|e| ScoutError::Config(format!("cannot parse {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Check structural invariants that the rest of the pipeline relies on.
    pub fn validate(&self) -> Result<(), ScoutError> {
        if self.sources.is_empty() {
            return Err(ScoutError::Config("source list is empty".into()));
        }
        for source in &self.sources {
            let parsed = Url::parse(source)
                .map_err(|e| ScoutError::Config(format!("bad source URL {source}: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ScoutError::Config(format!(
                    "source URL {source} must be http(s)"
                )));
            }
        }
        if self.strategies.is_empty() {
            return Err(ScoutError::Config("strategy list is empty".into()));
        }
        if self.fetch.retries == 0 {
            return Err(ScoutError::Config("fetch.retries must be at least 1".into()));
        }
        if self.candidate_ceiling == 0 || self.min_candidates == 0 {
            return Err(ScoutError::Config(
                "candidate_ceiling and min_candidates must be positive".into(),
            ));
        }
        if self.max_title_len == 0 {
            return Err(ScoutError::Config("max_title_len must be positive".into()));
        }
        Ok(())
    }
}
