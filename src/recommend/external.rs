//! Optional external recommender tier: delegates the whole computation to a
//! configured collaborator speaking the same request/response contract. Any
//! failure falls through to the local aggregator.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::json;

use crate::fetch::FetchClient;
use crate::profile::ProfileInput;
use crate::recommend::{Recommendation, RecommendOptions, RecommendStrategy};

pub struct ExternalRecommender {
    client: Arc<FetchClient>,
    url: String,
}

impl ExternalRecommender {
    pub fn new(client: Arc<FetchClient>, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl RecommendStrategy for ExternalRecommender {
    fn name(&self) -> &'static str {
        "external"
    }

    async fn recommend(
        &self,
        profile: &ProfileInput,
        opts: &RecommendOptions,
    ) -> Result<Recommendation> {
        let body = json!({
            "profile": profile,
            "areaId": opts.area_id,
            "language": opts.language,
        });
        let raw = self.client.post_json(&self.url, &body).await?;
        let mut result: Recommendation =
            serde_json::from_value(raw).context("external recommender payload mismatch")?;
        // Stamp provenance regardless of what the collaborator claims.
        result.debug.source = "external".into();
        result.debug.fallback = false;
        Ok(result)
    }
}
