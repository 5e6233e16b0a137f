//! Vacancy providers: the search + detail contract the aggregator consumes,
//! and its HTTP implementation over the resilient fetch client.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;

use crate::fetch::FetchClient;
use crate::market::{SearchPage, Vacancy};

#[async_trait]
pub trait VacancyProvider: Send + Sync {
    /// One page of posting IDs for a free-text query.
    async fn search(
        &self,
        query: &str,
        area: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> Result<SearchPage>;

    /// Full posting payload for one ID.
    async fn detail(&self, id: &str) -> Result<Vacancy>;

    /// Human-facing search URL for the query, shown in role stats.
    fn search_url(&self, query: &str, area: Option<&str>) -> String;

    fn name(&self) -> &'static str;
}

/// HH-style JSON API provider. Both endpoints go through the cached fetch
/// path, so identical queries within the TTL window never re-hit upstream.
pub struct HttpVacancyProvider {
    client: Arc<FetchClient>,
    base_url: String,
}

impl HttpVacancyProvider {
    pub fn new(client: Arc<FetchClient>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn search_endpoint(&self, query: &str, area: Option<&str>, page: u32, per_page: u32) -> String {
        let mut params: Vec<(&str, String)> = vec![
            ("text", query.to_string()),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        if let Some(a) = area {
            params.push(("area", a.to_string()));
        }
        let base = format!("{}/vacancies", self.base_url);
        Url::parse_with_params(&base, &params)
            .map(|u| u.to_string())
            .unwrap_or(base)
    }
}

#[async_trait]
impl VacancyProvider for HttpVacancyProvider {
    async fn search(
        &self,
        query: &str,
        area: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> Result<SearchPage> {
        let url = self.search_endpoint(query, area, page, per_page);
        let raw = self.client.get_json_cached(&url).await?;
        serde_json::from_value(raw).context("unexpected search payload shape")
    }

    async fn detail(&self, id: &str) -> Result<Vacancy> {
        let url = format!("{}/vacancies/{}", self.base_url, id);
        let raw = self.client.get_json_cached(&url).await?;
        serde_json::from_value(raw).context("unexpected vacancy payload shape")
    }

    fn search_url(&self, query: &str, area: Option<&str>) -> String {
        self.search_endpoint(query, area, 0, 0)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
