//! Strategy-driven candidate extraction from raw listing markup.
//!
//! Strategies are ranked CSS selectors loaded from config data, applied most
//! reliable first: a card link carrying an image and a description text beats
//! a bare path-pattern match. Each matched element goes through its own field
//! fallback chains for title, code, and thumbnail. Extraction stops adding
//! strategies once the running candidate total reaches a configured ceiling —
//! a cost cutoff on large pages, not a correctness rule.
//!
//! All entry points are synchronous because the `scraper` crate's document
//! types are `!Send`; callers in async code run extraction inline on bounded
//! pages or wrap it in `tokio::task::spawn_blocking`.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::candidate::{self, VideoCandidate};
use crate::config::ScoutConfig;
use crate::error::ScoutError;

/// Bounds for "nearby text" accepted as a title.
const NEARBY_TEXT_MIN: usize = 10;
const NEARBY_TEXT_MAX: usize = 100;

struct CompiledStrategy {
    name: String,
    selector: Selector,
}

pub struct Extractor {
    strategies: Vec<CompiledStrategy>,
    code_patterns: Vec<Regex>,
    ceiling: usize,
    max_title_len: usize,
    anchor: Selector,
    img: Selector,
    description: Selector,
    nearby: Selector,
}

impl Extractor {
    /// Compile the configured strategies and code patterns.
    /// Malformed strategy data fails here, at load time, not mid-extraction.
    pub fn new(config: &ScoutConfig) -> Result<Self, ScoutError> {
        let strategies = config
            .strategies
            .iter()
            .map(|s| {
                Selector::parse(&s.selector)
                    .map(|selector| CompiledStrategy {
                        name: s.name.clone(),
                        selector,
                    })
                    .map_err(|e| {
                        ScoutError::Config(format!("bad selector in strategy {}: {e}", s.name))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let code_patterns = config
            .code_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| ScoutError::Config(format!("bad code pattern {p}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            strategies,
            code_patterns,
            ceiling: config.candidate_ceiling,
            max_title_len: config.max_title_len,
            anchor: Selector::parse("a[href]").expect("anchor selector is valid"),
            img: Selector::parse("img").expect("img selector is valid"),
            description: Selector::parse(".text-secondary, .title, .video-title, h3")
                .expect("description selector is valid"),
            nearby: Selector::parse("span, p, div").expect("nearby selector is valid"),
        })
    }

    /// Extract unvalidated candidates from raw markup.
    ///
    /// Returns an empty list when nothing matches — zero matches is how a
    /// block/interstitial page surfaces. Errors only on unparseable input.
    /// Output order is strategy priority, then document order.
    pub fn extract(&self, html: &str, source: &str) -> Result<Vec<VideoCandidate>, ScoutError> {
        if html.trim().is_empty() {
            return Err(ScoutError::Parse {
                url: source.to_string(),
                message: "empty document".to_string(),
            });
        }

        let document = Html::parse_document(html);
        let mut candidates = Vec::new();

        for strategy in &self.strategies {
            if candidates.len() >= self.ceiling {
                break;
            }
            let before = candidates.len();
            for element in document.select(&strategy.selector) {
                if let Some(c) = self.candidate_from_element(&element) {
                    candidates.push(c);
                }
            }
            debug!(
                strategy = %strategy.name,
                found = candidates.len() - before,
                total = candidates.len(),
                "strategy pass"
            );
        }

        Ok(candidates)
    }

    fn candidate_from_element(&self, element: &ElementRef<'_>) -> Option<VideoCandidate> {
        let href = self.element_href(element)?;
        let code = candidate::extract_code(&href, &self.code_patterns);
        let title = self.extract_title(element, code.as_deref());
        let image = self.extract_image(element);

        Some(VideoCandidate {
            title,
            code,
            url: href,
            image,
        })
    }

    /// The element's own link target, or the first descendant anchor's.
    fn element_href(&self, element: &ElementRef<'_>) -> Option<String> {
        if let Some(href) = element.value().attr("href") {
            return Some(href.to_string());
        }
        element
            .select(&self.anchor)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(String::from)
    }

    /// Title fallback chain: description text → image alt/title → the
    /// element's title attribute → nearby text of plausible length →
    /// code-derived label → generic label.
    fn extract_title(&self, element: &ElementRef<'_>, code: Option<&str>) -> String {
        if let Some(el) = element.select(&self.description).next() {
            let text = element_text(&el);
            if plausible_title(&text, code) {
                return candidate::bound_title(&text, self.max_title_len);
            }
        }

        if let Some(img) = element.select(&self.img).next() {
            for attr in ["alt", "title"] {
                if let Some(raw) = img.value().attr(attr) {
                    let text = raw.trim();
                    if plausible_title(text, code) && !is_placeholder_alt(text) {
                        return candidate::bound_title(text, self.max_title_len);
                    }
                }
            }
        }

        if let Some(raw) = element.value().attr("title") {
            let text = raw.trim();
            if plausible_title(text, code) {
                return candidate::bound_title(text, self.max_title_len);
            }
        }

        for el in element.select(&self.nearby) {
            let text = element_text(&el);
            if plausible_nearby(&text, code) {
                return candidate::bound_title(&text, self.max_title_len);
            }
        }

        candidate::bound_title(&VideoCandidate::fallback_title(code), self.max_title_len)
    }

    /// Thumbnail fallback chain over lazy-loading attribute variants; a
    /// srcset yields its first URL token. `data:` URIs are not thumbnails.
    fn extract_image(&self, element: &ElementRef<'_>) -> Option<String> {
        let img = element.select(&self.img).next()?;
        for attr in [
            "data-src",
            "src",
            "data-original",
            "data-lazy-src",
            "data-srcset",
            "srcset",
        ] {
            if let Some(raw) = img.value().attr(attr) {
                let first = raw.split_whitespace().next().unwrap_or("");
                let first = first.trim_end_matches(',');
                if !first.is_empty() && !first.starts_with("data:") {
                    return Some(first.to_string());
                }
            }
        }
        None
    }
}

/// Collect an element's visible text, whitespace-collapsed.
fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// A usable title: non-empty, not a URL, and longer than the bare code.
fn plausible_title(text: &str, code: Option<&str>) -> bool {
    if text.is_empty() || text.contains("http") {
        return false;
    }
    match code {
        Some(c) => text.len() > c.len(),
        None => true,
    }
}

/// Nearby text is held to a stricter shape: bounded length, not a number,
/// not a URL, and not just the code again.
fn plausible_nearby(text: &str, code: Option<&str>) -> bool {
    let len = text.chars().count();
    if !(NEARBY_TEXT_MIN..=NEARBY_TEXT_MAX).contains(&len) {
        return false;
    }
    if text.contains("http") || text.chars().all(|c| c.is_ascii_digit() || c == ' ') {
        return false;
    }
    match code {
        Some(c) => !text.to_uppercase().contains(c),
        None => true,
    }
}

fn is_placeholder_alt(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("thumbnail") || lower.contains("image")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoutConfig;

    fn extractor() -> Extractor {
        Extractor::new(&ScoutConfig::default()).unwrap()
    }

    const SOURCE: &str = "https://missav.ws/dm18/vi";

    #[test]
    fn test_empty_markup_is_parse_error() {
        let err = extractor().extract("   \n", SOURCE).unwrap_err();
        assert!(matches!(err, ScoutError::Parse { .. }));
    }

    #[test]
    fn test_no_matches_is_empty_not_error() {
        let html = "<html><body><p>Access denied</p></body></html>";
        let out = extractor().extract(html, SOURCE).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_extracts_card_with_description() {
        let html = r#"
        <html><body>
            <a href="/dm18/vi/abcd-123">
                <img data-src="//cdn.missav.ws/abcd-123.jpg" alt="ABCD-123 cover" />
                <span class="text-secondary">A very descriptive video title</span>
            </a>
        </body></html>
        "#;
        let out = extractor().extract(html, SOURCE).unwrap();
        assert!(!out.is_empty());
        let c = &out[0];
        assert_eq!(c.url, "/dm18/vi/abcd-123");
        assert_eq!(c.code.as_deref(), Some("ABCD-123"));
        assert_eq!(c.title, "A very descriptive video title");
        assert_eq!(c.image.as_deref(), Some("//cdn.missav.ws/abcd-123.jpg"));
    }

    #[test]
    fn test_title_falls_back_to_image_alt() {
        let html = r#"
        <html><body>
            <a href="/vi/abcd-123">
                <img src="/thumb.jpg" alt="ABCD-123 An alt text title" />
            </a>
        </body></html>
        "#;
        let out = extractor().extract(html, SOURCE).unwrap();
        assert_eq!(out[0].title, "ABCD-123 An alt text title");
    }

    #[test]
    fn test_placeholder_alt_is_skipped() {
        let html = r#"
        <html><body>
            <a href="/vi/abcd-123">
                <img src="/thumb.jpg" alt="video thumbnail placeholder" />
            </a>
        </body></html>
        "#;
        let out = extractor().extract(html, SOURCE).unwrap();
        assert_eq!(out[0].title, "ABCD-123 - Hot Video");
    }

    #[test]
    fn test_title_falls_back_to_code_label() {
        let html = r#"<html><body><a href="/vi/abcd-123"></a></body></html>"#;
        let out = extractor().extract(html, SOURCE).unwrap();
        assert_eq!(out[0].title, "ABCD-123 - Hot Video");
        assert!(out[0].image.is_none());
    }

    #[test]
    fn test_nearby_text_rejects_numbers_and_urls() {
        let html = r#"
        <html><body>
            <a href="/vi/abcd-123">
                <span>12345 67890</span>
                <span>http://tracking.example/pixel</span>
                <div>Plausible nearby description here</div>
            </a>
        </body></html>
        "#;
        let out = extractor().extract(html, SOURCE).unwrap();
        assert_eq!(out[0].title, "Plausible nearby description here");
    }

    #[test]
    fn test_srcset_takes_first_token() {
        let html = r#"
        <html><body>
            <a href="/vi/abcd-123">
                <img srcset="//cdn.missav.ws/small.jpg 1x, //cdn.missav.ws/big.jpg 2x" />
            </a>
        </body></html>
        "#;
        let out = extractor().extract(html, SOURCE).unwrap();
        assert_eq!(out[0].image.as_deref(), Some("//cdn.missav.ws/small.jpg"));
    }

    #[test]
    fn test_data_uri_image_ignored() {
        let html = r#"
        <html><body>
            <a href="/vi/abcd-123"><img src="data:image/gif;base64,R0lGOD" /></a>
        </body></html>
        "#;
        let out = extractor().extract(html, SOURCE).unwrap();
        assert!(out[0].image.is_none());
    }

    #[test]
    fn test_ceiling_stops_strategy_iteration() {
        let links: String = (0..30)
            .map(|i| format!(r#"<a href="/vi/abcd-{i:03}"><img src="/t{i}.jpg"/></a>"#))
            .collect();
        let html = format!("<html><body>{links}</body></html>");
        let out = extractor().extract(&html, SOURCE).unwrap();
        // The first strategy alone matches 30 links; the ceiling only stops
        // later strategies from re-walking the page.
        assert!(out.len() >= 30);

        let mut config = ScoutConfig::default();
        config.candidate_ceiling = 5;
        let small = Extractor::new(&config).unwrap().extract(&html, SOURCE).unwrap();
        // One full strategy pass still runs; duplicates from later passes
        // are cut off.
        assert_eq!(small.len(), 30);
    }

    #[test]
    fn test_long_title_is_bounded() {
        let long_alt = format!("ABCD-123 {}", "x".repeat(300));
        let html = format!(
            r#"<html><body><a href="/vi/abcd-123"><img src="/t.jpg" alt="{long_alt}"/></a></body></html>"#
        );
        let out = extractor().extract(&html, SOURCE).unwrap();
        assert_eq!(out[0].title.chars().count(), 100);
    }

    #[test]
    fn test_bad_strategy_selector_is_config_error() {
        let mut config = ScoutConfig::default();
        config.strategies[0].selector = ":::not a selector".into();
        assert!(matches!(
            Extractor::new(&config),
            Err(ScoutError::Config(_))
        ));
    }
}
