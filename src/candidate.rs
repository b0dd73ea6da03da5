//! Candidate video records extracted from listing markup.
//!
//! A `VideoCandidate` is transient: created per extraction pass, owned by the
//! rotator call that produced it, discarded after selection. There is no
//! persistent store and no identity beyond a single request.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Label used when neither a descriptive title nor a code is available.
pub const GENERIC_TITLE: &str = "Hot Video";

/// One extracted video entry, not necessarily validated yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoCandidate {
    /// Best-effort human-readable label; never empty.
    pub title: String,
    /// Canonical code parsed from the URL path, uppercased.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// URL to the video page; absolute once validated.
    pub url: String,
    /// Thumbnail URL; absolute once validated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl VideoCandidate {
    /// Title used when field extraction found nothing better.
    pub fn fallback_title(code: Option<&str>) -> String {
        match code {
            Some(c) => format!("{c} - {GENERIC_TITLE}"),
            None => GENERIC_TITLE.to_string(),
        }
    }
}

/// Match `text` against a ranked pattern list and return the first hit,
/// uppercased. Provider-specific formats rank before generic ones, so the
/// order of `patterns` decides which form wins on ambiguous paths.
pub fn extract_code(text: &str, patterns: &[Regex]) -> Option<String> {
    for pattern in patterns {
        if let Some(m) = pattern.find(text) {
            return Some(m.as_str().to_uppercase());
        }
    }
    None
}

/// Truncate a title to `max` characters, respecting char boundaries.
/// Downstream display consumers have their own size limits.
pub fn bound_title(title: &str, max: usize) -> String {
    if title.chars().count() <= max {
        return title.to_string();
    }
    title.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> Vec<Regex> {
        [
            r"(?i)fc2-ppv-\d{6,}",
            r"\d{6}_\d{3}",
            r"[A-Z]{2,}-?\d{3,}",
            r"(?i)[a-z]{2,}-\d{3,}",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    }

    #[test]
    fn test_extract_code_prefers_provider_format() {
        // fc2-ppv-1234567 also matches the generic word-digits pattern,
        // but the provider-specific rank must win.
        let code = extract_code("/dm18/vi/fc2-ppv-1234567", &patterns());
        assert_eq!(code.as_deref(), Some("FC2-PPV-1234567"));
    }

    #[test]
    fn test_extract_code_standard_format() {
        let code = extract_code("/vi/ABCD-123", &patterns());
        assert_eq!(code.as_deref(), Some("ABCD-123"));
    }

    #[test]
    fn test_extract_code_numeric_format() {
        let code = extract_code("/vi/123456_789", &patterns());
        assert_eq!(code.as_deref(), Some("123456_789"));
    }

    #[test]
    fn test_extract_code_none() {
        assert_eq!(extract_code("/vi/categories", &patterns()), None);
    }

    #[test]
    fn test_fallback_title() {
        assert_eq!(
            VideoCandidate::fallback_title(Some("ABCD-123")),
            "ABCD-123 - Hot Video"
        );
        assert_eq!(VideoCandidate::fallback_title(None), GENERIC_TITLE);
    }

    #[test]
    fn test_bound_title_truncates_on_char_boundary() {
        let long = "あ".repeat(150);
        let bounded = bound_title(&long, 100);
        assert_eq!(bounded.chars().count(), 100);

        let short = "short title";
        assert_eq!(bound_title(short, 100), short);
    }
}
