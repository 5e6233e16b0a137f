// src/market/mod.rs
pub mod aggregator;
pub mod provider;
pub mod vacancy;

use serde::{Deserialize, Serialize};

/// One page of the upstream vacancy search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub items: Vec<VacancyRef>,
    #[serde(default)]
    pub pages: u32,
    /// Total raw hit count reported by the upstream for the query.
    #[serde(default)]
    pub found: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacancyRef {
    pub id: String,
}

/// Full posting payload from the detail endpoint. Only the fields the
/// extractor reads are modeled; the rest of the payload is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vacancy {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "title")]
    pub name: Option<String>,
    #[serde(default)]
    pub snippet: Option<Snippet>,
    #[serde(default)]
    pub key_skills: Vec<KeySkill>,
    #[serde(default)]
    pub experience: Option<ExperienceCode>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub alternate_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snippet {
    #[serde(default)]
    pub requirement: Option<String>,
    #[serde(default)]
    pub responsibility: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeySkill {
    pub name: String,
}

/// Upstream experience classification, passed through as an opaque code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExperienceCode {
    #[serde(default)]
    pub id: String,
}
