//! # Profile Signal Extractor
//! Turns a free-form profile into the three signals the aggregator runs on:
//! a canonical skill set, up to three role guesses, and an experience bucket.

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::catalog::SkillCatalog;
use crate::experience::Experience;
use crate::profile::{ExperienceEntry, ProfileInput};

pub const MAX_ROLE_GUESSES: usize = 3;

/// Everything the market pipeline needs to know about the candidate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSignals {
    pub skills: Vec<String>,
    pub roles: Vec<String>,
    pub years: f64,
    pub experience: Experience,
}

pub fn extract(profile: &ProfileInput, catalog: &SkillCatalog) -> CandidateSignals {
    let skills = extract_skills(profile, catalog);
    let roles = guess_roles(profile, &skills, catalog);
    let years = total_experience_years(&profile.experience);
    CandidateSignals {
        skills,
        roles,
        years,
        experience: Experience::from_years(years),
    }
}

/// Canonical skills from explicit tags plus lexicon hits in the free text.
/// Output is deduplicated by canonical form, first-seen order.
pub fn extract_skills(profile: &ProfileInput, catalog: &SkillCatalog) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    let mut push = |canonical: String| {
        if !canonical.is_empty() && seen.insert(canonical.clone()) {
            out.push(canonical);
        }
    };

    for field in &profile.skills {
        for token in split_tokens(field.as_str()) {
            push(catalog.canonical(&token));
        }
    }

    let haystack = free_text(profile).to_lowercase();
    for token in &catalog.lexicon {
        if haystack.contains(token.as_str()) {
            push(catalog.canonical(token));
        }
    }

    out
}

/// Ordered role guessing: regex catalog first, then interest clusters over
/// the skill set, then the fixed two-role default. Capped at three.
pub fn guess_roles(
    profile: &ProfileInput,
    skills: &[String],
    catalog: &SkillCatalog,
) -> Vec<String> {
    let haystack = role_haystack(profile);
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for (re, title) in &catalog.role_patterns {
        if re.is_match(&haystack) && seen.insert(title.clone()) {
            out.push(title.clone());
        }
    }

    if out.is_empty() {
        for cluster in &catalog.clusters {
            let hit = skills.iter().any(|s| cluster.skills.iter().any(|c| c == s));
            if hit && seen.insert(cluster.title.clone()) {
                out.push(cluster.title.clone());
            }
        }
    }

    if out.is_empty() {
        out = catalog.default_roles.clone();
    }

    out.truncate(MAX_ROLE_GUESSES);
    out
}

/// Sums entry durations where both ends resolve and `end > start`.
/// Missing end means "still there" (now); missing start skips the entry.
pub fn total_experience_years(entries: &[ExperienceEntry]) -> f64 {
    let today = Utc::now().date_naive();
    let mut days: i64 = 0;
    for entry in entries {
        let Some(start) = entry.start.as_deref().and_then(parse_date) else {
            continue;
        };
        let end = entry
            .end
            .as_deref()
            .and_then(parse_date)
            .unwrap_or(today);
        let span = end.signed_duration_since(start).num_days();
        if span > 0 {
            days += span;
        }
    }
    let years = days as f64 / 365.25;
    ((years * 10.0).round() / 10.0).max(0.0)
}

/// Accepts full dates, year-month, bare years, and dotted European dates.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d"))
        .or_else(|_| NaiveDate::parse_from_str(&format!("{s}-01-01"), "%Y-%m-%d"))
        .or_else(|_| NaiveDate::parse_from_str(s, "%d.%m.%Y"))
        .ok()
}

fn split_tokens(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split([',', ';', '/', '|'])
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
}

/// Free text used for lexicon scanning.
fn free_text(profile: &ProfileInput) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(s) = profile.summary.as_deref() {
        parts.push(s);
    }
    for e in &profile.experience {
        if let Some(t) = e.title.as_deref() {
            parts.push(t);
        }
        if let Some(d) = e.description.as_deref() {
            parts.push(d);
        }
    }
    for e in &profile.education {
        if let Some(n) = e.name.as_deref() {
            parts.push(n);
        }
        if let Some(o) = e.organization.as_deref() {
            parts.push(o);
        }
        if let Some(f) = e.field.as_deref() {
            parts.push(f);
        }
    }
    parts.join(" ")
}

/// Haystack for role patterns: explicit hints, summary, experience titles.
fn role_haystack(profile: &ProfileInput) -> String {
    let mut parts: Vec<&str> = profile.target_roles.iter().map(|s| s.as_str()).collect();
    if let Some(s) = profile.summary.as_deref() {
        parts.push(s);
    }
    for e in &profile.experience {
        if let Some(t) = e.title.as_deref() {
            parts.push(t);
        }
    }
    parts.join(" ")
}
