//! # TTL Cache
//! In-memory key/value store with per-entry expiry, shared process-wide
//! across concurrent requests. Reads self-evict expired entries; a periodic
//! background sweep bounds memory even for keys that are never read again.
//!
//! Process restart clears the cache; there is no persistence.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use metrics::{counter, gauge};
use serde_json::Value;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    created_at: Instant,
    expires_at: Instant,
}

/// Thread-safe TTL cache keyed by request URL.
#[derive(Debug, Default)]
pub struct TtlCache {
    inner: Mutex<HashMap<String, CacheEntry>>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value, or `None` on miss or expiry.
    /// An expired entry is removed on the spot.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut map = self.inner.lock().expect("cache mutex poisoned");
        match map.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                counter!("cache_hits_total").increment(1);
                tracing::debug!(
                    target: "cache",
                    key,
                    age_ms = entry.created_at.elapsed().as_millis() as u64,
                    "cache hit"
                );
                Some(entry.value.clone())
            }
            Some(_) => {
                map.remove(key);
                counter!("cache_misses_total").increment(1);
                None
            }
            None => {
                counter!("cache_misses_total").increment(1);
                None
            }
        }
    }

    pub fn set(&self, key: impl Into<String>, value: Value, ttl: Duration) {
        let now = Instant::now();
        let mut map = self.inner.lock().expect("cache mutex poisoned");
        map.insert(
            key.into(),
            CacheEntry {
                value,
                created_at: now,
                expires_at: now + ttl,
            },
        );
        gauge!("cache_size").set(map.len() as f64);
    }

    /// Number of live entries (expired-but-unswept entries included).
    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every expired entry; returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut map = self.inner.lock().expect("cache mutex poisoned");
        let before = map.len();
        map.retain(|_, e| e.expires_at > now);
        let dropped = before - map.len();
        if dropped > 0 {
            counter!("cache_evicted_total").increment(dropped as u64);
        }
        gauge!("cache_size").set(map.len() as f64);
        dropped
    }
}

/// Handle for the background sweep task. Dropping it leaves the task
/// running; call [`SweepHandle::stop`] for a clean shutdown (tests, reloads).
pub struct SweepHandle {
    task: JoinHandle<()>,
}

impl SweepHandle {
    pub fn stop(self) {
        self.task.abort();
    }
}

/// Spawns the periodic sweep for `cache`, ticking every `every`.
pub fn start_sweep(cache: Arc<TtlCache>, every: Duration) -> SweepHandle {
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // First tick fires immediately; skip it so a fresh cache isn't swept at boot.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let dropped = cache.purge_expired();
            tracing::debug!(target: "cache", dropped, remaining = cache.len(), "sweep tick");
        }
    });
    SweepHandle { task }
}
