//! # Recommendation Contract & Degradation Chain
//! The uniform output shape every tier produces, the strategy trait, and the
//! small runner that walks the ordered tier list until one succeeds.

pub mod external;
pub mod fallback;

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use metrics::counter;
use serde::{Deserialize, Serialize};

use crate::experience::Experience;
use crate::profile::ProfileInput;

/// Caller-supplied options alongside the profile.
#[derive(Debug, Clone, Default)]
pub struct RecommendOptions {
    pub area_id: Option<String>,
    pub language: Option<String>,
}

/// Per-role market snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleStat {
    pub role: String,
    /// Raw vacancy count the upstream reported for the query.
    pub found: u64,
    /// How many postings actually made it into the sample.
    pub sampled: usize,
    pub top_skills: Vec<String>,
    pub search_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillGap {
    pub skill: String,
    /// Demand frequency in the sampled market (0 for backfilled entries).
    pub demand: u64,
    /// True when backfilled from the advanced-skill catalog.
    pub advanced: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub provider: String,
    pub title: String,
    pub url: String,
    pub duration: String,
}

/// Provenance and extraction echo for debugging and UI hints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    /// Which tier produced the result: `external`, `smart`, or `fallback`.
    pub source: String,
    pub fallback: bool,
    pub skills: Vec<String>,
    pub roles: Vec<String>,
    pub experience: Experience,
    /// Vacancies that made it into the aggregation sample.
    pub sampled: usize,
    #[serde(default)]
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// Heuristic market fit, always clamped to [10, 95].
    pub market_fit_score: u8,
    pub roles: Vec<RoleStat>,
    pub grow_skills: Vec<SkillGap>,
    pub courses: Vec<Course>,
    pub debug: DebugInfo,
}

/// One degradation tier. Tiers are independent and side-effect free toward
/// each other; the runner owns the ordering.
#[async_trait]
pub trait RecommendStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    async fn recommend(
        &self,
        profile: &ProfileInput,
        opts: &RecommendOptions,
    ) -> Result<Recommendation>;
}

/// Ordered chain-of-responsibility over the tiers: first success wins.
pub struct Recommender {
    tiers: Vec<Arc<dyn RecommendStrategy>>,
}

impl Recommender {
    pub fn new(tiers: Vec<Arc<dyn RecommendStrategy>>) -> Self {
        Self { tiers }
    }

    pub async fn recommend(
        &self,
        profile: &ProfileInput,
        opts: &RecommendOptions,
    ) -> Result<Recommendation> {
        for tier in &self.tiers {
            match tier.recommend(profile, opts).await {
                Ok(result) => {
                    tracing::info!(
                        target: "recommend",
                        tier = tier.name(),
                        score = result.market_fit_score,
                        "tier produced a result"
                    );
                    return Ok(result);
                }
                Err(e) => {
                    counter!("recommend_tier_failures_total", "tier" => tier.name()).increment(1);
                    tracing::warn!(
                        target: "recommend",
                        tier = tier.name(),
                        error = ?e,
                        "tier failed, degrading"
                    );
                }
            }
        }
        // Unreachable with the static tier installed last; kept for tests
        // that assemble partial chains.
        bail!("every recommendation tier failed")
    }
}

/// Shared score clamp: the composite always lands in [10, 95].
pub fn clamp_score(raw: f64) -> u8 {
    raw.round().clamp(10.0, 95.0) as u8
}
