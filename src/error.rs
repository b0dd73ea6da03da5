//! Error taxonomy for the scout pipeline.
//!
//! Failures are layered: `Fetch` and `Parse` are local to one source and
//! recovered by the rotator (skip, try the next source); `Exhausted` is the
//! terminal "no video available" signal the caller turns into a user-facing
//! message. A source that parses fine but yields zero valid candidates is
//! not an error at all — just an empty accumulation for that source.

use thiserror::Error;

/// Errors produced by the scout pipeline.
#[derive(Debug, Error)]
pub enum ScoutError {
    /// Network failure, timeout, or terminal non-2xx status for one source.
    #[error("fetch failed for {url}: {message}")]
    Fetch {
        url: String,
        /// Last HTTP status, if any response was received.
        status: Option<u16>,
        message: String,
    },

    /// Markup from one source could not be parsed at all.
    #[error("unparseable markup from {url}: {message}")]
    Parse { url: String, message: String },

    /// Every source failed or the validated pool came back empty.
    #[error("no video candidate available after trying {sources_tried} source(s)")]
    Exhausted { sources_tried: usize },

    /// Malformed configuration: bad selector, bad regex, bad source URL.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ScoutError {
    /// True for per-source errors the rotator recovers from by moving on.
    pub fn is_source_local(&self) -> bool {
        matches!(self, ScoutError::Fetch { .. } | ScoutError::Parse { .. })
    }
}
