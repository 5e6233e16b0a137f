use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::cache::TtlCache;
use crate::catalog::CatalogHandle;
use crate::config::AppConfig;
use crate::extract;
use crate::history::History;
use crate::profile::ProfileInput;
use crate::recommend::{RecommendOptions, Recommendation, Recommender};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<AppConfig>,
    pub cache: Arc<TtlCache>,
    pub catalog: CatalogHandle,
    pub recommender: Arc<Recommender>,
    pub history: Arc<History>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/recommendations", post(recommendations))
        .route("/debug/extract", post(debug_extract))
        .route("/debug/last", get(debug_last))
        .route("/admin/reload-catalog", get(admin_reload_catalog))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendReq {
    #[serde(default)]
    profile: ProfileInput,
    #[serde(default)]
    area_id: Option<String>,
    #[serde(default)]
    language: Option<String>,
}

async fn recommendations(
    State(state): State<AppState>,
    Json(body): Json<RecommendReq>,
) -> Json<Recommendation> {
    let opts = RecommendOptions {
        area_id: body.area_id,
        language: body.language,
    };
    let started = Instant::now();

    // The chain ends in the static tier, so this only errs if someone wires
    // a partial chain; degrade to a bare fallback shape rather than a 500.
    let mut result = match state.recommender.recommend(&body.profile, &opts).await {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(target: "api", error = ?e, "recommendation chain exhausted");
            empty_fallback(&state, &body.profile)
        }
    };
    result.debug.elapsed_ms = started.elapsed().as_millis() as u64;

    state.history.push(&result);
    Json(result)
}

fn empty_fallback(state: &AppState, profile: &ProfileInput) -> Recommendation {
    let catalog = state.catalog.current();
    let signals = extract::extract(profile, &catalog);
    Recommendation {
        market_fit_score: crate::recommend::fallback::FALLBACK_SCORE,
        roles: Vec::new(),
        grow_skills: Vec::new(),
        courses: Vec::new(),
        debug: crate::recommend::DebugInfo {
            source: "fallback".into(),
            fallback: true,
            skills: signals.skills,
            roles: signals.roles,
            experience: signals.experience,
            sampled: 0,
            elapsed_ms: 0,
        },
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthInfo {
    status: &'static str,
    cache_entries: usize,
    limits: Limits,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Limits {
    pool_concurrency: usize,
    cache_ttl_ms: u64,
    search_pages: u32,
    search_per_page: u32,
    sample_per_role: usize,
    fetch_retries: u32,
}

async fn health(State(state): State<AppState>) -> Json<HealthInfo> {
    Json(HealthInfo {
        status: "ok",
        cache_entries: state.cache.len(),
        limits: Limits {
            pool_concurrency: state.cfg.pool_concurrency,
            cache_ttl_ms: state.cfg.cache_ttl_ms,
            search_pages: state.cfg.search_pages,
            search_per_page: state.cfg.search_per_page,
            sample_per_role: state.cfg.sample_per_role,
            fetch_retries: state.cfg.fetch_retries,
        },
    })
}

/// Extraction preview: what the pipeline would infer, without any network.
async fn debug_extract(
    State(state): State<AppState>,
    Json(profile): Json<ProfileInput>,
) -> Json<extract::CandidateSignals> {
    let catalog = state.catalog.current();
    Json(extract::extract(&profile, &catalog))
}

async fn debug_last(State(state): State<AppState>) -> Json<Vec<crate::history::HistoryEntry>> {
    Json(state.history.snapshot_last_n(10))
}

async fn admin_reload_catalog(State(state): State<AppState>) -> String {
    match state.catalog.reload() {
        Ok(()) => "reloaded".to_string(),
        Err(e) => format!("failed: {e}"),
    }
}
