//! vidscout — fetch listing pages, extract video candidates, pick one.
//!
//! Pipeline, leaf to root: [`fetcher::HttpFetcher`] loads markup with retry
//! and backoff, [`extractor::Extractor`] applies ranked selection strategies,
//! [`validator::Validator`] normalizes URLs and drops navigation links and
//! duplicates, and [`rotator::SourceRotator`] drives the whole thing across
//! an ordered source list, drawing one candidate at random at the end. The
//! messaging layer that displays the pick is an external collaborator.

pub mod candidate;
pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod renderer;
pub mod rotator;
pub mod selector;
pub mod validator;

pub use candidate::VideoCandidate;
pub use config::{FetchConfig, ScoutConfig, Strategy};
pub use error::ScoutError;
pub use rotator::{RotatorState, SourceRotator};
