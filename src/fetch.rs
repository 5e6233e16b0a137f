//! # Resilient Fetch Client
//! Thin wrapper over `reqwest` that owns the upstream-facing policy: a hard
//! per-request timeout, retry with backoff on 429/5xx and transport errors
//! (honoring `Retry-After` when the server sends one), and a cache-aside
//! read-through layer on top of the TTL cache.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use metrics::counter;
use reqwest::header::RETRY_AFTER;
use reqwest::{Method, StatusCode};
use serde_json::Value;

use crate::cache::TtlCache;
use crate::config::AppConfig;

/// Backoff ceiling; a `Retry-After` hint may exceed it.
const BACKOFF_CAP_MS: u64 = 3_000;
const BACKOFF_BASE_MS: u64 = 400;

/// Non-2xx terminal outcome, surfaced so callers can branch on the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamStatus(pub u16);

impl fmt::Display for UpstreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "upstream returned status {}", self.0)
    }
}

impl std::error::Error for UpstreamStatus {}

pub struct FetchClient {
    http: reqwest::Client,
    cache: Arc<TtlCache>,
    cache_ttl: Duration,
    retries: u32,
}

impl FetchClient {
    pub fn new(cfg: &AppConfig, cache: Arc<TtlCache>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("job-market-analyzer/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_millis(cfg.fetch_timeout_ms))
            .build()
            .expect("reqwest client");
        Self {
            http,
            cache,
            cache_ttl: Duration::from_millis(cfg.cache_ttl_ms),
            retries: cfg.fetch_retries,
        }
    }

    pub async fn get_json(&self, url: &str) -> Result<Value> {
        self.request_json(Method::GET, url, None).await
    }

    pub async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        self.request_json(Method::POST, url, Some(body.clone())).await
    }

    /// Cache-aside read-through: a hit skips the network entirely; a miss
    /// fetches and caches the parsed payload. Errors are never cached.
    pub async fn get_json_cached(&self, url: &str) -> Result<Value> {
        if let Some(hit) = self.cache.get(url) {
            return Ok(hit);
        }
        let fresh = self.get_json(url).await?;
        self.cache.set(url, fresh.clone(), self.cache_ttl);
        Ok(fresh)
    }

    async fn request_json(&self, method: Method, url: &str, body: Option<Value>) -> Result<Value> {
        let mut attempt: u32 = 0;
        loop {
            let mut req = self.http.request(method.clone(), url);
            if let Some(ref b) = body {
                req = req.json(b);
            }
            match req.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return resp
                            .json::<Value>()
                            .await
                            .with_context(|| format!("malformed JSON from {url}"));
                    }
                    if retryable(status) && attempt < self.retries {
                        let delay = retry_after_hint(&resp).unwrap_or_else(|| backoff(attempt));
                        counter!("fetch_retries_total").increment(1);
                        tracing::warn!(
                            target: "fetch",
                            url,
                            status = status.as_u16(),
                            delay_ms = delay.as_millis() as u64,
                            attempt,
                            "retryable upstream status"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    // Other statuses (and exhausted budgets) go back to the caller as-is.
                    counter!("fetch_upstream_errors_total").increment(1);
                    return Err(UpstreamStatus(status.as_u16()).into());
                }
                Err(e) => {
                    // Timeouts and connection resets retry like a 5xx.
                    if attempt < self.retries {
                        let delay = backoff(attempt);
                        counter!("fetch_retries_total").increment(1);
                        tracing::warn!(
                            target: "fetch",
                            url,
                            error = ?e,
                            delay_ms = delay.as_millis() as u64,
                            attempt,
                            "transport error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    counter!("fetch_upstream_errors_total").increment(1);
                    return Err(e).with_context(|| format!("request to {url} failed after retries"));
                }
            }
        }
    }
}

fn retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Exponential backoff: 400ms, 800ms, 1600ms, ... capped at 3s.
fn backoff(attempt: u32) -> Duration {
    let ms = BACKOFF_BASE_MS
        .saturating_mul(1u64 << attempt.min(16))
        .min(BACKOFF_CAP_MS);
    Duration::from_millis(ms)
}

fn retry_after_hint(resp: &reqwest::Response) -> Option<Duration> {
    resp.headers()
        .get(RETRY_AFTER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
