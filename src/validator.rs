//! Candidate validation: URL normalization, exclusion, dedup.
//!
//! This is where navigation links die. A candidate survives only if its URL
//! normalizes to an absolute http(s) form, avoids every deny fragment, and
//! matches the site's video-detail path shape. Duplicates collapse to the
//! first occurrence, keyed on the normalized URL with query and fragment
//! stripped, so two listings of the same video with different tracking
//! params count as one.

use std::collections::HashSet;

use regex::Regex;
use url::Url;

use crate::candidate::VideoCandidate;
use crate::config::ScoutConfig;
use crate::error::ScoutError;

pub struct Validator {
    exclude_fragments: Vec<String>,
    video_path_patterns: Vec<Regex>,
}

impl Validator {
    pub fn new(config: &ScoutConfig) -> Result<Self, ScoutError> {
        let video_path_patterns = config
            .video_path_patterns
            .iter()
            .map(|p| {
                Regex::new(p)
                    .map_err(|e| ScoutError::Config(format!("bad video path pattern {p}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            exclude_fragments: config.exclude_path_fragments.clone(),
            video_path_patterns,
        })
    }

    /// Filter, normalize, and deduplicate extracted candidates.
    ///
    /// Order is preserved for the first occurrence of each unique URL.
    /// Idempotent: running it on its own output changes nothing.
    pub fn validate(
        &self,
        candidates: Vec<VideoCandidate>,
        base: &Url,
    ) -> Vec<VideoCandidate> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut out = Vec::new();

        for mut candidate in candidates {
            let Some(url) = normalize_video_url(&candidate.url, base) else {
                continue;
            };
            let Ok(parsed) = Url::parse(&url) else {
                continue;
            };
            let path = parsed.path();

            if self
                .exclude_fragments
                .iter()
                .any(|fragment| path.contains(fragment.as_str()))
            {
                continue;
            }
            if !self.video_path_patterns.iter().any(|p| p.is_match(path)) {
                continue;
            }
            if !seen.insert(url.clone()) {
                continue;
            }

            candidate.url = url;
            candidate.image = candidate
                .image
                .as_deref()
                .and_then(|raw| normalize_image_url(raw, base));
            out.push(candidate);
        }

        out
    }
}

/// Normalize a video link to an absolute URL, stripping query and fragment
/// so equal pages compare equal.
pub fn normalize_video_url(raw: &str, base: &Url) -> Option<String> {
    let mut url = resolve(raw, base)?;
    url.set_query(None);
    url.set_fragment(None);
    Some(url.into())
}

/// Normalize a thumbnail link to an absolute URL. Query strings are kept:
/// CDNs encode sizing in them.
pub fn normalize_image_url(raw: &str, base: &Url) -> Option<String> {
    if raw.starts_with("data:") {
        return None;
    }
    resolve(raw, base).map(Into::into)
}

fn resolve(raw: &str, base: &Url) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let resolved = if let Some(rest) = raw.strip_prefix("//") {
        // Protocol-relative
        Url::parse(&format!("https://{rest}")).ok()?
    } else if raw.starts_with("http://") || raw.starts_with("https://") {
        Url::parse(raw).ok()?
    } else {
        // Root-relative or bare path: resolve against the source page
        base.join(raw).ok()?
    };
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    Some(resolved)
}
