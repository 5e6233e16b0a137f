use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Initialize the Prometheus recorder and register the series the
    /// pipeline emits, so they show up on /metrics before first use.
    pub fn init(cache_ttl_ms: u64) -> Self {
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .expect("prometheus: install recorder");

        describe_counter!("cache_hits_total", "TTL cache hits.");
        describe_counter!("cache_misses_total", "TTL cache misses (expiry included).");
        describe_counter!("cache_evicted_total", "Entries dropped by the sweep.");
        describe_gauge!("cache_size", "Live TTL cache entries.");
        describe_counter!("fetch_retries_total", "Upstream retries (429/5xx/transport).");
        describe_counter!("fetch_upstream_errors_total", "Terminal upstream failures.");
        describe_counter!("pool_item_failures_total", "Worker-pool items dropped.");
        describe_counter!("aggregator_role_skips_total", "Roles skipped on search failure.");
        describe_counter!("recommend_tier_failures_total", "Degradation-chain tier failures.");

        // Static gauge with the configured TTL (absolute, no sliding refresh).
        gauge!("cache_ttl_ms").set(cache_ttl_ms as f64);

        Self { handle }
    }

    /// Returns a router exposing `/metrics` in Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
