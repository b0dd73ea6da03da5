//! HTTP markup retrieval with spoofed headers, retry, and backoff.
//!
//! Not a browser — plain HTTP requests. Handles redirects, per-request
//! timeouts, retry on failure with exponential backoff, Retry-After on 429,
//! and a minimum spacing between consecutive requests so one fetcher never
//! hammers the upstream. A 2xx block/interstitial page is not detected here;
//! the extractor fails gracefully on it by finding zero candidates.

use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::FetchConfig;
use crate::error::ScoutError;

/// User-Agent used when the configured pool is empty.
const DEFAULT_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                          AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/120.0.0.0 Safari/537.36";

/// Longest delay honored from a Retry-After header.
const MAX_RETRY_AFTER_SECS: u64 = 10;

/// HTTP fetcher for listing pages.
///
/// Rate-limit state is owned by the instance, not a process global, so
/// independent fetchers never cross-talk.
pub struct HttpFetcher {
    client: reqwest::Client,
    /// HTTP/1.1-only fallback client for hosts that reject HTTP/2.
    h1_client: reqwest::Client,
    config: FetchConfig,
    last_request: Option<Instant>,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> Result<Self, ScoutError> {
        let headers = build_header_map(&config)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .default_headers(headers.clone())
            .build()
            .map_err(|e| ScoutError::Config(format!("cannot build HTTP client: {e}")))?;

        let h1_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .default_headers(headers)
            .http1_only()
            .build()
            .map_err(|e| ScoutError::Config(format!("cannot build HTTP/1.1 client: {e}")))?;

        Ok(Self {
            client,
            h1_client,
            config,
            last_request: None,
        })
    }

    /// Fetch the markup for `url`, retrying with exponential backoff.
    ///
    /// Falls back to HTTP/1.1 on protocol errors (some CDNs reject HTTP/2).
    pub async fn fetch(&mut self, url: &str) -> Result<String, ScoutError> {
        self.rate_limit().await;

        match self.fetch_inner(&self.client, url).await {
            Ok(markup) => Ok(markup),
            Err(e) => {
                let err_str = e.to_string();
                if err_str.contains("http2")
                    || err_str.contains("protocol")
                    || err_str.contains("connection closed")
                {
                    debug!(url, "retrying over HTTP/1.1 after protocol error");
                    self.fetch_inner(&self.h1_client, url).await
                } else {
                    Err(e)
                }
            }
        }
    }

    async fn fetch_inner(
        &self,
        client: &reqwest::Client,
        url: &str,
    ) -> Result<String, ScoutError> {
        let mut last_status: Option<u16> = None;
        let mut last_message = String::new();
        let mut retry_after: Option<u64> = None;

        for attempt in 0..self.config.retries {
            if attempt > 0 {
                let delay = if last_status == Some(429) {
                    Duration::from_secs(retry_after.unwrap_or(2).min(MAX_RETRY_AFTER_SECS))
                } else {
                    backoff_delay(self.config.backoff_base_ms, attempt - 1)
                };
                debug!(url, attempt, ?delay, "backing off before retry");
                tokio::time::sleep(delay).await;
            }

            let ua = self.pick_user_agent();
            let result = client.get(url).header(USER_AGENT, ua).send().await;

            match result {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        match resp.text().await {
                            Ok(body) => return Ok(body),
                            Err(e) => {
                                last_status = Some(status.as_u16());
                                last_message = format!("body read failed: {e}");
                            }
                        }
                    } else {
                        last_status = Some(status.as_u16());
                        last_message = format!("HTTP {status}");
                        retry_after = parse_retry_after(&resp);
                    }
                }
                Err(e) => {
                    last_status = None;
                    last_message = e.to_string();
                }
            }
            warn!(url, attempt, message = %last_message, "fetch attempt failed");
        }

        Err(ScoutError::Fetch {
            url: url.to_string(),
            status: last_status,
            message: last_message,
        })
    }

    fn pick_user_agent(&self) -> String {
        self.config
            .user_agents
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| DEFAULT_UA.to_string())
    }

    /// Enforce the minimum spacing between consecutive requests.
    async fn rate_limit(&mut self) {
        if let Some(last) = self.last_request {
            let spacing = Duration::from_millis(self.config.min_request_spacing_ms);
            let elapsed = last.elapsed();
            if elapsed < spacing {
                debug!(wait_ms = (spacing - elapsed).as_millis() as u64, "rate limiting");
                tokio::time::sleep(spacing - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

fn build_header_map(config: &FetchConfig) -> Result<HeaderMap, ScoutError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ScoutError::Config(format!("bad header name {name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ScoutError::Config(format!("bad header value for {name:?}: {e}")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// Delay before the retry following failed attempt number `attempt`
/// (zero-based): `backoff_base_ms * 2^attempt`.
fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    Duration::from_millis(base_ms.saturating_mul(1u64 << attempt.min(16)))
}

fn parse_retry_after(resp: &reqwest::Response) -> Option<u64> {
    resp.headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoutConfig;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(ScoutConfig::default().fetch).unwrap()
    }

    #[test]
    fn test_fetcher_builds_from_defaults() {
        let _ = fetcher();
    }

    #[test]
    fn test_backoff_doubles_per_attempt() {
        assert_eq!(backoff_delay(1000, 0), Duration::from_millis(1000));
        assert_eq!(backoff_delay(1000, 1), Duration::from_millis(2000));
        assert_eq!(backoff_delay(1000, 2), Duration::from_millis(4000));
    }

    #[test]
    fn test_bad_header_is_config_error() {
        let mut config = ScoutConfig::default().fetch;
        config.headers.insert("bad name".into(), "x".into());
        assert!(matches!(
            HttpFetcher::new(config),
            Err(ScoutError::Config(_))
        ));
    }
}
