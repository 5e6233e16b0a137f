//! Course suggestions for the top skill gaps: deterministic catalog
//! templates by default, with an optional external lookup collaborator that
//! replaces the list when configured and reachable.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::json;

use crate::catalog::SkillCatalog;
use crate::fetch::FetchClient;
use crate::recommend::{Course, SkillGap};

/// How many gaps feed course generation.
pub const COURSE_GAP_COUNT: usize = 3;
/// Upper bound on the returned list, external lookups included.
pub const MAX_COURSES: usize = 9;

#[async_trait]
pub trait CourseLookup: Send + Sync {
    async fn lookup(&self, gaps: &[SkillGap], keywords: &[String]) -> Result<Vec<Course>>;
}

/// POSTs `{skillGaps, keywords}` to a configured collaborator and expects a
/// list of course entries back.
pub struct HttpCourseLookup {
    client: Arc<FetchClient>,
    url: String,
}

impl HttpCourseLookup {
    pub fn new(client: Arc<FetchClient>, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl CourseLookup for HttpCourseLookup {
    async fn lookup(&self, gaps: &[SkillGap], keywords: &[String]) -> Result<Vec<Course>> {
        let body = json!({
            "skillGaps": gaps,
            "keywords": keywords,
        });
        let raw = self.client.post_json(&self.url, &body).await?;
        let mut courses: Vec<Course> =
            serde_json::from_value(raw).context("unexpected course lookup payload")?;
        courses.truncate(MAX_COURSES);
        Ok(courses)
    }
}

/// Resolves the course list for a gap set: external lookup first when
/// configured, catalog templates otherwise (and on lookup failure).
pub struct CourseSource {
    lookup: Option<Arc<dyn CourseLookup>>,
}

impl CourseSource {
    pub fn new(lookup: Option<Arc<dyn CourseLookup>>) -> Self {
        Self { lookup }
    }

    pub async fn resolve(
        &self,
        gaps: &[SkillGap],
        keywords: &[String],
        catalog: &SkillCatalog,
    ) -> Vec<Course> {
        if let Some(lookup) = &self.lookup {
            match lookup.lookup(gaps, keywords).await {
                Ok(courses) if !courses.is_empty() => return courses,
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(target: "courses", error = ?e, "course lookup failed, using templates");
                }
            }
        }
        static_courses(gaps, catalog)
    }
}

/// Deterministic provider templates for the top gaps.
pub fn static_courses(gaps: &[SkillGap], catalog: &SkillCatalog) -> Vec<Course> {
    let mut out = Vec::new();
    for gap in gaps.iter().take(COURSE_GAP_COUNT) {
        for provider in &catalog.course_providers {
            out.push(Course {
                provider: provider.provider.clone(),
                title: format!("{} essentials", gap.skill),
                url: provider
                    .url_template
                    .replace("{skill}", &urlencode(&gap.skill)),
                duration: provider.duration.clone(),
            });
        }
    }
    out.truncate(MAX_COURSES);
    out
}

/// Minimal query-component escaping; catalog skills are plain ASCII tokens.
fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            ' ' => out.push_str("%20"),
            '+' => out.push_str("%2B"),
            '#' => out.push_str("%23"),
            '&' => out.push_str("%26"),
            '/' => out.push_str("%2F"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SkillCatalog;

    fn gap(skill: &str) -> SkillGap {
        SkillGap {
            skill: skill.into(),
            demand: 5,
            advanced: false,
        }
    }

    #[test]
    fn templates_cover_top_three_gaps_only() {
        let catalog = SkillCatalog::load().unwrap();
        let gaps = vec![gap("react"), gap("sql"), gap("docker"), gap("kafka")];
        let courses = static_courses(&gaps, &catalog);
        assert!(!courses.is_empty());
        assert!(courses.len() <= MAX_COURSES);
        assert!(courses.iter().all(|c| !c.title.contains("kafka")));
    }

    #[test]
    fn urls_are_escaped() {
        let catalog = SkillCatalog::load().unwrap();
        let courses = static_courses(&[gap("machine learning")], &catalog);
        assert!(courses[0].url.contains("machine%20learning"));
    }

    #[tokio::test]
    async fn resolve_falls_back_to_templates_without_lookup() {
        let catalog = SkillCatalog::load().unwrap();
        let source = CourseSource::new(None);
        let courses = source.resolve(&[gap("sql")], &[], &catalog).await;
        assert!(!courses.is_empty());
        assert!(courses[0].url.contains("sql"));
    }
}
