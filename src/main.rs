//! Job Market Analyzer — Binary Entrypoint
//! Boots the Axum HTTP server: configuration, cache + sweep, degradation
//! chain, metrics, and routes.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use job_market_analyzer::api::{self, AppState};
use job_market_analyzer::cache::{self, TtlCache};
use job_market_analyzer::catalog::{CatalogHandle, SkillCatalog};
use job_market_analyzer::config::AppConfig;
use job_market_analyzer::courses::{CourseLookup, CourseSource, HttpCourseLookup};
use job_market_analyzer::fetch::FetchClient;
use job_market_analyzer::history::History;
use job_market_analyzer::market::aggregator::MarketAggregator;
use job_market_analyzer::market::provider::HttpVacancyProvider;
use job_market_analyzer::metrics::Metrics;
use job_market_analyzer::recommend::external::ExternalRecommender;
use job_market_analyzer::recommend::fallback::StaticFallback;
use job_market_analyzer::recommend::{RecommendStrategy, Recommender};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("job_market_analyzer=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = Arc::new(AppConfig::from_env());
    tracing::info!(
        base_url = %cfg.market_base_url,
        pool = cfg.pool_concurrency,
        pages = cfg.search_pages,
        sample = cfg.sample_per_role,
        "starting job-market-analyzer"
    );

    let metrics = Metrics::init(cfg.cache_ttl_ms);

    let cache = Arc::new(TtlCache::new());
    let _sweep = cache::start_sweep(cache.clone(), Duration::from_secs(cfg.cache_sweep_secs));

    let client = Arc::new(FetchClient::new(&cfg, cache.clone()));
    let catalog = CatalogHandle::new(SkillCatalog::load()?);

    let provider = Arc::new(HttpVacancyProvider::new(
        client.clone(),
        cfg.market_base_url.clone(),
    ));
    let course_lookup: Option<Arc<dyn CourseLookup>> = cfg.course_lookup_url.as_ref().map(|url| {
        Arc::new(HttpCourseLookup::new(client.clone(), url.clone())) as Arc<dyn CourseLookup>
    });
    let courses = Arc::new(CourseSource::new(course_lookup));

    // Degradation chain: external (when configured) -> local -> static.
    let mut tiers: Vec<Arc<dyn RecommendStrategy>> = Vec::new();
    if let Some(url) = cfg.external_recommender_url.as_ref() {
        tiers.push(Arc::new(ExternalRecommender::new(client.clone(), url.clone())));
    }
    tiers.push(Arc::new(MarketAggregator::new(
        provider,
        catalog.clone(),
        courses,
        cfg.clone(),
    )));
    tiers.push(Arc::new(StaticFallback::new(catalog.clone())));

    let state = AppState {
        cfg: cfg.clone(),
        cache,
        catalog,
        recommender: Arc::new(Recommender::new(tiers)),
        history: Arc::new(History::with_capacity(2000)),
    };

    let app = api::router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!(addr = %cfg.bind_addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
