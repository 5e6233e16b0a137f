//! # Skill Catalog
//! The fixed knowledge the extractors run on: the alias (canonicalization)
//! table, the skill lexicon, ordered role patterns, interest clusters, the
//! per-role advanced-skill sets, course templates, and the generic fallback
//! suggestions. Loaded from TOML — an embedded default ships in the binary,
//! an on-disk copy can override it and be re-read at runtime.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use tracing::info;

pub const DEFAULT_CATALOG_PATH: &str = "config/skills.toml";
pub const ENV_CATALOG_PATH: &str = "CATALOG_PATH";

static EMBEDDED_CATALOG: &str = include_str!("../config/skills.toml");

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    aliases: HashMap<String, String>,
    #[serde(default)]
    lexicon: Vec<String>,
    #[serde(default)]
    roles: Vec<RawRolePattern>,
    #[serde(default)]
    clusters: Vec<Cluster>,
    #[serde(default)]
    default_roles: Vec<String>,
    #[serde(default)]
    advanced: HashMap<String, Vec<String>>,
    #[serde(default)]
    course_providers: Vec<CourseProvider>,
    #[serde(default)]
    fallback: FallbackSkills,
}

#[derive(Debug, Deserialize)]
struct RawRolePattern {
    pattern: String,
    title: String,
}

/// Skill-membership fallback group for role guessing.
#[derive(Debug, Clone, Deserialize)]
pub struct Cluster {
    pub title: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CourseProvider {
    pub provider: String,
    pub url_template: String,
    pub duration: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FallbackSkills {
    #[serde(default)]
    pub common_skills: Vec<String>,
    #[serde(default)]
    pub technical_skills: Vec<String>,
}

pub struct SkillCatalog {
    aliases: HashMap<String, String>,
    pub lexicon: Vec<String>,
    /// Ordered; first match wins its slot in the guess list.
    pub role_patterns: Vec<(Regex, String)>,
    pub clusters: Vec<Cluster>,
    pub default_roles: Vec<String>,
    advanced: HashMap<String, Vec<String>>,
    pub course_providers: Vec<CourseProvider>,
    pub fallback: FallbackSkills,
}

impl SkillCatalog {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let raw: RawCatalog = toml::from_str(raw).context("parsing skill catalog TOML")?;
        let mut role_patterns = Vec::with_capacity(raw.roles.len());
        for r in raw.roles {
            let re = Regex::new(&r.pattern)
                .with_context(|| format!("bad role pattern for '{}'", r.title))?;
            role_patterns.push((re, r.title));
        }
        Ok(Self {
            aliases: raw
                .aliases
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v.to_lowercase()))
                .collect(),
            lexicon: raw.lexicon.into_iter().map(|s| s.to_lowercase()).collect(),
            role_patterns,
            clusters: raw.clusters,
            default_roles: raw.default_roles,
            advanced: raw.advanced,
            course_providers: raw.course_providers,
            fallback: raw.fallback,
        })
    }

    /// Reads `CATALOG_PATH` (default `config/skills.toml`); falls back to the
    /// embedded copy when nothing is on disk.
    pub fn load() -> Result<Self> {
        let path = std::env::var(ENV_CATALOG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CATALOG_PATH));
        match std::fs::read_to_string(&path) {
            Ok(s) => {
                info!(target: "catalog", path = %path.display(), "skill catalog loaded from disk");
                Self::from_toml_str(&s)
            }
            Err(_) => Self::from_toml_str(EMBEDDED_CATALOG),
        }
    }

    /// Lowercases, trims, and resolves aliases; unknown tokens pass through.
    pub fn canonical(&self, token: &str) -> String {
        let t = token.trim().to_lowercase();
        self.aliases.get(&t).cloned().unwrap_or(t)
    }

    pub fn advanced_for(&self, role: &str) -> &[String] {
        self.advanced.get(role).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

/// Shared, reloadable catalog handle for the Axum state.
#[derive(Clone)]
pub struct CatalogHandle {
    inner: Arc<RwLock<Arc<SkillCatalog>>>,
}

impl CatalogHandle {
    pub fn new(catalog: SkillCatalog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    pub fn current(&self) -> Arc<SkillCatalog> {
        self.inner.read().expect("catalog rwlock poisoned").clone()
    }

    /// Re-reads the catalog from disk; on failure the old catalog stays live.
    pub fn reload(&self) -> Result<()> {
        let fresh = SkillCatalog::load()?;
        let mut guard = self.inner.write().expect("catalog rwlock poisoned");
        *guard = Arc::new(fresh);
        Ok(())
    }
}
