//! Static heuristic tier: the last line of the degradation chain. Guesses
//! roles and skills from the profile alone, returns a fixed score and
//! generic suggestions. No network, and it never fails.

use anyhow::Result;
use async_trait::async_trait;

use crate::catalog::CatalogHandle;
use crate::courses::static_courses;
use crate::extract;
use crate::profile::ProfileInput;
use crate::recommend::{
    DebugInfo, Recommendation, RecommendOptions, RecommendStrategy, RoleStat, SkillGap,
};

/// Score reported when the market could not be sampled at all.
pub const FALLBACK_SCORE: u8 = 65;

pub struct StaticFallback {
    catalog: CatalogHandle,
}

impl StaticFallback {
    pub fn new(catalog: CatalogHandle) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl RecommendStrategy for StaticFallback {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn recommend(
        &self,
        profile: &ProfileInput,
        _opts: &RecommendOptions,
    ) -> Result<Recommendation> {
        let catalog = self.catalog.current();
        let signals = extract::extract(profile, &catalog);

        let roles = signals
            .roles
            .iter()
            .map(|role| RoleStat {
                role: role.clone(),
                found: 0,
                sampled: 0,
                top_skills: Vec::new(),
                search_url: String::new(),
            })
            .collect();

        // Generic technical suggestions first, soft skills after; skip what
        // the candidate already listed.
        let mut grow_skills: Vec<SkillGap> = Vec::new();
        for skill in catalog
            .fallback
            .technical_skills
            .iter()
            .chain(catalog.fallback.common_skills.iter())
        {
            let canonical = catalog.canonical(skill);
            if !signals.skills.contains(&canonical) {
                grow_skills.push(SkillGap {
                    skill: canonical,
                    demand: 0,
                    advanced: false,
                });
            }
        }

        let courses = static_courses(&grow_skills, &catalog);

        Ok(Recommendation {
            market_fit_score: FALLBACK_SCORE,
            roles,
            grow_skills,
            courses,
            debug: DebugInfo {
                source: "fallback".into(),
                fallback: true,
                skills: signals.skills,
                roles: signals.roles,
                experience: signals.experience,
                sampled: 0,
                elapsed_ms: 0,
            },
        })
    }
}
