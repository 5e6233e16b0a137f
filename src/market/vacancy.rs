//! # Vacancy Signal Extractor
//! Canonical skills and an experience bucket from a single posting payload.
//! Mirrors the profile-side normalization so the two sides compare cleanly.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalog::SkillCatalog;
use crate::experience::Experience;
use crate::market::Vacancy;

/// Skills from the explicit key-skills list plus lexicon hits in the text
/// fields. Deduplicated by canonical form, first-seen order.
pub fn extract_skills(vacancy: &Vacancy, catalog: &SkillCatalog) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    let mut push = |canonical: String| {
        if !canonical.is_empty() && seen.insert(canonical.clone()) {
            out.push(canonical);
        }
    };

    for ks in &vacancy.key_skills {
        push(catalog.canonical(&ks.name));
    }

    let haystack = clean_markup(&text_blob(vacancy)).to_lowercase();
    for token in &catalog.lexicon {
        if haystack.contains(token.as_str()) {
            push(catalog.canonical(token));
        }
    }

    out
}

/// The upstream's own experience classification; absent or unrecognized
/// codes become `None` and score neutrally downstream.
pub fn experience_bucket(vacancy: &Vacancy) -> Option<Experience> {
    vacancy
        .experience
        .as_ref()
        .and_then(|code| Experience::parse(&code.id))
}

fn text_blob(vacancy: &Vacancy) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(n) = vacancy.name.as_deref() {
        parts.push(n);
    }
    if let Some(snippet) = vacancy.snippet.as_ref() {
        if let Some(r) = snippet.requirement.as_deref() {
            parts.push(r);
        }
        if let Some(r) = snippet.responsibility.as_deref() {
            parts.push(r);
        }
    }
    if let Some(d) = vacancy.description.as_deref() {
        parts.push(d);
    }
    parts.join(" ")
}

/// Strips the HTML the upstream embeds in snippets (highlight tags, entity
/// escapes) and collapses whitespace.
pub fn clean_markup(raw: &str) -> String {
    static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("ws regex"));

    let decoded = html_escape::decode_html_entities(raw).to_string();
    let stripped = RE_TAGS.replace_all(&decoded, " ");
    RE_WS.replace_all(&stripped, " ").trim().to_string()
}
