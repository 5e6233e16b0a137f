//! Runtime configuration, read once from the environment at startup.
//! Every knob has a sane default; `.env` is honored via `dotenvy` in `main`.

use std::env;

pub const ENV_MARKET_BASE_URL: &str = "MARKET_BASE_URL";
pub const ENV_SEARCH_PAGES: &str = "SEARCH_PAGES";
pub const ENV_SEARCH_PER_PAGE: &str = "SEARCH_PER_PAGE";
pub const ENV_SAMPLE_PER_ROLE: &str = "SAMPLE_PER_ROLE";
pub const ENV_POOL_CONCURRENCY: &str = "POOL_CONCURRENCY";
pub const ENV_FETCH_TIMEOUT_MS: &str = "FETCH_TIMEOUT_MS";
pub const ENV_FETCH_RETRIES: &str = "FETCH_RETRIES";
pub const ENV_CACHE_TTL_MS: &str = "CACHE_TTL_MS";
pub const ENV_CACHE_SWEEP_SECS: &str = "CACHE_SWEEP_SECS";
pub const ENV_EXTERNAL_RECOMMENDER_URL: &str = "EXTERNAL_RECOMMENDER_URL";
pub const ENV_COURSE_LOOKUP_URL: &str = "COURSE_LOOKUP_URL";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";

pub const DEFAULT_MARKET_BASE_URL: &str = "https://api.hh.ru";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Floor applied to `POOL_CONCURRENCY`; see the worker pool contract.
pub const MIN_POOL_CONCURRENCY: usize = 2;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub market_base_url: String,
    /// How many search pages to walk per guessed role.
    pub search_pages: u32,
    pub search_per_page: u32,
    /// Detail-fetch cap per role, after ID deduplication.
    pub sample_per_role: usize,
    pub pool_concurrency: usize,
    pub fetch_timeout_ms: u64,
    pub fetch_retries: u32,
    pub cache_ttl_ms: u64,
    pub cache_sweep_secs: u64,
    pub external_recommender_url: Option<String>,
    pub course_lookup_url: Option<String>,
    pub bind_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            market_base_url: DEFAULT_MARKET_BASE_URL.to_string(),
            search_pages: 2,
            search_per_page: 50,
            sample_per_role: 30,
            pool_concurrency: 6,
            fetch_timeout_ms: 15_000,
            fetch_retries: 2,
            cache_ttl_ms: 600_000,
            cache_sweep_secs: 300,
            external_recommender_url: None,
            course_lookup_url: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            market_base_url: env_string(ENV_MARKET_BASE_URL, &d.market_base_url),
            search_pages: env_parse(ENV_SEARCH_PAGES, d.search_pages),
            search_per_page: env_parse(ENV_SEARCH_PER_PAGE, d.search_per_page),
            sample_per_role: env_parse(ENV_SAMPLE_PER_ROLE, d.sample_per_role),
            pool_concurrency: env_parse(ENV_POOL_CONCURRENCY, d.pool_concurrency)
                .max(MIN_POOL_CONCURRENCY),
            fetch_timeout_ms: env_parse(ENV_FETCH_TIMEOUT_MS, d.fetch_timeout_ms),
            fetch_retries: env_parse(ENV_FETCH_RETRIES, d.fetch_retries),
            cache_ttl_ms: env_parse(ENV_CACHE_TTL_MS, d.cache_ttl_ms),
            cache_sweep_secs: env_parse(ENV_CACHE_SWEEP_SECS, d.cache_sweep_secs),
            external_recommender_url: env_opt(ENV_EXTERNAL_RECOMMENDER_URL),
            course_lookup_url: env_opt(ENV_COURSE_LOOKUP_URL),
            bind_addr: env_string(ENV_BIND_ADDR, &d.bind_addr),
        }
    }
}

fn env_string(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults_apply_without_env() {
        std::env::remove_var(ENV_POOL_CONCURRENCY);
        std::env::remove_var(ENV_SEARCH_PAGES);
        let cfg = AppConfig::from_env();
        assert_eq!(cfg.pool_concurrency, 6);
        assert_eq!(cfg.search_pages, 2);
        assert_eq!(cfg.sample_per_role, 30);
        assert_eq!(cfg.fetch_timeout_ms, 15_000);
    }

    #[test]
    #[serial]
    fn pool_concurrency_has_a_floor_of_two() {
        std::env::set_var(ENV_POOL_CONCURRENCY, "1");
        let cfg = AppConfig::from_env();
        std::env::remove_var(ENV_POOL_CONCURRENCY);
        assert_eq!(cfg.pool_concurrency, 2);
    }

    #[test]
    #[serial]
    fn garbage_env_values_fall_back_to_defaults() {
        std::env::set_var(ENV_SEARCH_PAGES, "not-a-number");
        let cfg = AppConfig::from_env();
        std::env::remove_var(ENV_SEARCH_PAGES);
        assert_eq!(cfg.search_pages, 2);
    }
}
