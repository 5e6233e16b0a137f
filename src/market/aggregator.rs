//! # Market Aggregator & Scorer
//! The "smart" tier: per-role vacancy search, capped detail sampling through
//! the worker pool, skill-frequency tallies, gap computation, and the
//! composite market-fit score. Pure policy lives in free functions so it can
//! be unit-tested without I/O.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use metrics::counter;

use crate::catalog::{CatalogHandle, SkillCatalog};
use crate::config::AppConfig;
use crate::courses::CourseSource;
use crate::experience::Experience;
use crate::extract;
use crate::market::provider::VacancyProvider;
use crate::market::vacancy;
use crate::pool;
use crate::profile::ProfileInput;
use crate::recommend::{
    clamp_score, DebugInfo, Recommendation, RecommendOptions, RecommendStrategy, RoleStat, SkillGap,
};

pub const TOP_DEMAND: usize = 20;
pub const MAX_GAPS: usize = 8;
pub const MAX_ADVANCED_GAPS: usize = 6;
pub const TOP_LOCAL_SKILLS: usize = 5;

const SKILL_WEIGHT: f64 = 0.60;
const EXP_WEIGHT: f64 = 0.25;
const ROLE_WEIGHT: f64 = 0.15;

/// Frequency tally with an insertion sequence so ties break on first-seen
/// order rather than hash iteration order.
#[derive(Debug, Default)]
pub struct FreqMap {
    map: HashMap<String, Tally>,
    next_seq: usize,
}

#[derive(Debug, Clone, Copy)]
struct Tally {
    count: u64,
    seq: usize,
}

impl FreqMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bump(&mut self, skill: &str) {
        match self.map.get_mut(skill) {
            Some(t) => t.count += 1,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.map.insert(skill.to_string(), Tally { count: 1, seq });
            }
        }
    }

    /// Top `n` entries by descending count, first-seen order on ties.
    pub fn top(&self, n: usize) -> Vec<(String, u64)> {
        let mut entries: Vec<(&String, Tally)> =
            self.map.iter().map(|(k, v)| (k, *v)).collect();
        entries.sort_by_key(|(_, t)| (std::cmp::Reverse(t.count), t.seq));
        entries
            .into_iter()
            .take(n)
            .map(|(k, t)| (k.clone(), t.count))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

pub struct MarketAggregator {
    provider: Arc<dyn VacancyProvider>,
    catalog: CatalogHandle,
    courses: Arc<CourseSource>,
    cfg: Arc<AppConfig>,
}

impl MarketAggregator {
    pub fn new(
        provider: Arc<dyn VacancyProvider>,
        catalog: CatalogHandle,
        courses: Arc<CourseSource>,
        cfg: Arc<AppConfig>,
    ) -> Self {
        Self {
            provider,
            catalog,
            courses,
            cfg,
        }
    }

    /// Pages through the search for one role, deduplicating IDs and capping
    /// the sample. A failure on the first page skips the role; a failure
    /// mid-pagination keeps the partial ID list.
    async fn sample_role(
        &self,
        role: &str,
        opts: &RecommendOptions,
    ) -> Result<(Vec<String>, u64)> {
        let area = opts.area_id.as_deref();
        let mut seen: HashSet<String> = HashSet::new();
        let mut ids: Vec<String> = Vec::new();
        let mut found: u64 = 0;

        for page in 0..self.cfg.search_pages {
            let result = self
                .provider
                .search(role, area, page, self.cfg.search_per_page)
                .await;
            let sp = match result {
                Ok(sp) => sp,
                Err(e) if page == 0 => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        target: "aggregator",
                        role,
                        page,
                        error = ?e,
                        "pagination failed, keeping partial sample"
                    );
                    break;
                }
            };
            found = found.max(sp.found);
            for item in sp.items {
                if seen.insert(item.id.clone()) {
                    ids.push(item.id);
                }
            }
            if page + 1 >= sp.pages {
                break;
            }
        }

        ids.truncate(self.cfg.sample_per_role);
        Ok((ids, found))
    }
}

#[async_trait]
impl RecommendStrategy for MarketAggregator {
    fn name(&self) -> &'static str {
        "smart"
    }

    async fn recommend(
        &self,
        profile: &ProfileInput,
        opts: &RecommendOptions,
    ) -> Result<Recommendation> {
        let catalog = self.catalog.current();
        let signals = extract::extract(profile, &catalog);

        let mut global = FreqMap::new();
        let mut role_stats: Vec<RoleStat> = Vec::new();
        let mut exp_scores: Vec<f64> = Vec::new();
        let mut sampled_total = 0usize;

        for role in &signals.roles {
            let (ids, found) = match self.sample_role(role, opts).await {
                Ok(v) => v,
                Err(e) => {
                    counter!("aggregator_role_skips_total").increment(1);
                    tracing::warn!(target: "aggregator", role, error = ?e, "role search failed, skipping");
                    continue;
                }
            };

            let provider = self.provider.clone();
            let vacancies = pool::run(ids, self.cfg.pool_concurrency, move |id| {
                let provider = provider.clone();
                async move { provider.detail(&id).await }
            })
            .await;

            let mut local = FreqMap::new();
            for v in &vacancies {
                for skill in vacancy::extract_skills(v, &catalog) {
                    global.bump(&skill);
                    local.bump(&skill);
                }
                exp_scores.push(Experience::match_score(
                    signals.experience,
                    vacancy::experience_bucket(v),
                ));
            }
            sampled_total += vacancies.len();

            role_stats.push(RoleStat {
                role: role.clone(),
                found,
                sampled: vacancies.len(),
                top_skills: local
                    .top(TOP_LOCAL_SKILLS)
                    .into_iter()
                    .map(|(s, _)| s)
                    .collect(),
                search_url: self.provider.search_url(role, opts.area_id.as_deref()),
            });
        }

        if role_stats.is_empty() {
            bail!("vacancy search failed for every guessed role");
        }

        let demand = global.top(TOP_DEMAND);
        let gaps = compute_gaps(&demand, &signals.skills, &signals.roles, &catalog);
        let score = compute_score(&demand, &signals.skills, &exp_scores, &role_stats);
        let courses = self.courses.resolve(&gaps, &signals.roles, &catalog).await;

        Ok(Recommendation {
            market_fit_score: score,
            roles: role_stats,
            grow_skills: gaps,
            courses,
            debug: DebugInfo {
                source: "smart".into(),
                fallback: false,
                skills: signals.skills,
                roles: signals.roles,
                experience: signals.experience,
                sampled: sampled_total,
                elapsed_ms: 0,
            },
        })
    }
}

/// Demand-ranked skills the candidate is missing, capped at eight. When the
/// candidate already covers the sampled demand (or nothing was sampled),
/// backfill from the primary role's advanced-skill set.
pub fn compute_gaps(
    demand: &[(String, u64)],
    candidate_skills: &[String],
    roles: &[String],
    catalog: &SkillCatalog,
) -> Vec<SkillGap> {
    let owned: HashSet<&str> = candidate_skills.iter().map(|s| s.as_str()).collect();
    let mut gaps: Vec<SkillGap> = demand
        .iter()
        .filter(|(skill, _)| !owned.contains(skill.as_str()))
        .take(MAX_GAPS)
        .map(|(skill, count)| SkillGap {
            skill: skill.clone(),
            demand: *count,
            advanced: false,
        })
        .collect();

    if gaps.is_empty() {
        let primary = roles.first().map(|s| s.as_str()).unwrap_or_default();
        gaps = catalog
            .advanced_for(primary)
            .iter()
            .take(MAX_ADVANCED_GAPS)
            .map(|skill| SkillGap {
                skill: skill.to_lowercase(),
                demand: 0,
                advanced: true,
            })
            .collect();
    }

    gaps
}

/// Composite market fit: skill overlap with the demand top-20 (60%), mean
/// experience alignment (25%), and role demand volume (15%), clamped.
pub fn compute_score(
    demand: &[(String, u64)],
    candidate_skills: &[String],
    exp_scores: &[f64],
    role_stats: &[RoleStat],
) -> u8 {
    let skill_fit = if demand.is_empty() {
        0.0
    } else {
        let demanded: HashSet<&str> = demand.iter().map(|(s, _)| s.as_str()).collect();
        let overlap = candidate_skills
            .iter()
            .filter(|s| demanded.contains(s.as_str()))
            .count();
        overlap as f64 / TOP_DEMAND as f64
    };

    let exp_fit = if exp_scores.is_empty() {
        0.5
    } else {
        exp_scores.iter().sum::<f64>() / exp_scores.len() as f64
    };

    let max_found = role_stats.iter().map(|r| r.found).max().unwrap_or(0);
    let role_hit = role_demand_weight(max_found);

    clamp_score(100.0 * (SKILL_WEIGHT * skill_fit + EXP_WEIGHT * exp_fit + ROLE_WEIGHT * role_hit))
}

fn role_demand_weight(max_found: u64) -> f64 {
    if max_found > 50 {
        1.0
    } else if max_found > 20 {
        0.7
    } else if max_found > 5 {
        0.4
    } else {
        0.2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SkillCatalog;
    use crate::market::{KeySkill, Vacancy};

    fn catalog() -> SkillCatalog {
        SkillCatalog::load().expect("catalog")
    }

    fn stat(found: u64) -> RoleStat {
        RoleStat {
            role: "r".into(),
            found,
            sampled: 0,
            top_skills: Vec::new(),
            search_url: String::new(),
        }
    }

    #[test]
    fn freq_map_breaks_ties_by_first_seen() {
        let mut m = FreqMap::new();
        for s in ["b", "a", "b", "c", "a", "d"] {
            m.bump(s);
        }
        // b and a both at 2: b was seen first. c and d both at 1: c first.
        assert_eq!(
            m.top(4),
            vec![
                ("b".to_string(), 2),
                ("a".to_string(), 2),
                ("c".to_string(), 1),
                ("d".to_string(), 1),
            ]
        );
    }

    #[test]
    fn demand_tally_matches_key_skill_sample() {
        // Two postings: ["React"] and ["React", "SQL"].
        let cat = catalog();
        let v1 = Vacancy {
            id: "1".into(),
            key_skills: vec![KeySkill { name: "React".into() }],
            ..Default::default()
        };
        let v2 = Vacancy {
            id: "2".into(),
            key_skills: vec![
                KeySkill { name: "React".into() },
                KeySkill { name: "SQL".into() },
            ],
            ..Default::default()
        };
        let mut global = FreqMap::new();
        for v in [&v1, &v2] {
            for s in vacancy::extract_skills(v, &cat) {
                global.bump(&s);
            }
        }
        let top = global.top(TOP_DEMAND);
        assert_eq!(top[0], ("react".to_string(), 2));
        assert_eq!(top[1], ("sql".to_string(), 1));
    }

    #[test]
    fn gaps_exclude_candidate_skills_and_cap_at_eight() {
        let demand: Vec<(String, u64)> = (0..15)
            .map(|i| (format!("skill{i}"), (20 - i) as u64))
            .collect();
        let mine = vec!["skill0".to_string(), "skill3".to_string()];
        let gaps = compute_gaps(&demand, &mine, &["Backend Developer".into()], &catalog());
        assert_eq!(gaps.len(), MAX_GAPS);
        assert!(gaps.iter().all(|g| !g.advanced));
        assert!(gaps.iter().all(|g| g.skill != "skill0" && g.skill != "skill3"));
        // Demand order preserved.
        assert_eq!(gaps[0].skill, "skill1");
    }

    #[test]
    fn empty_gap_set_backfills_advanced_catalog() {
        let demand = vec![("react".to_string(), 4)];
        let mine = vec!["react".to_string()];
        let gaps = compute_gaps(&demand, &mine, &["Frontend Developer".into()], &catalog());
        assert!(!gaps.is_empty());
        assert!(gaps.len() <= MAX_ADVANCED_GAPS);
        assert!(gaps.iter().all(|g| g.advanced && g.demand == 0));
    }

    #[test]
    fn score_is_clamped_for_empty_inputs() {
        let score = compute_score(&[], &[], &[], &[]);
        assert!((10..=95).contains(&score));
        // 0.6*0 + 0.25*0.5 + 0.15*0.2 = 0.155 -> 15.5 -> 16
        assert_eq!(score, 16);
    }

    #[test]
    fn score_is_clamped_for_perfect_inputs() {
        let demand: Vec<(String, u64)> = (0..20).map(|i| (format!("s{i}"), 10)).collect();
        let mine: Vec<String> = (0..20).map(|i| format!("s{i}")).collect();
        let exp = vec![1.0; 10];
        let score = compute_score(&demand, &mine, &exp, &[stat(100)]);
        assert_eq!(score, 95, "formula max (100) must clamp to 95");
    }

    #[test]
    fn role_demand_thresholds() {
        assert_eq!(role_demand_weight(0), 0.2);
        assert_eq!(role_demand_weight(5), 0.2);
        assert_eq!(role_demand_weight(6), 0.4);
        assert_eq!(role_demand_weight(21), 0.7);
        assert_eq!(role_demand_weight(51), 1.0);
    }

    #[test]
    fn skill_fit_divides_by_twenty_not_demand_len() {
        // 5 demand skills, candidate has all 5: fit = 5/20, not 5/5.
        let demand: Vec<(String, u64)> = (0..5).map(|i| (format!("s{i}"), 2)).collect();
        let mine: Vec<String> = (0..5).map(|i| format!("s{i}")).collect();
        let score = compute_score(&demand, &mine, &[1.0], &[stat(100)]);
        // 0.6*0.25 + 0.25*1.0 + 0.15*1.0 = 0.55 -> 55
        assert_eq!(score, 55);
    }
}
