//! Inbound profile shapes. Every field is optional; the extractor is the
//! single normalization boundary, so nothing downstream trusts raw input.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileInput {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub skills: Vec<SkillField>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    /// Explicit role hints ("I want to be a ...").
    #[serde(default, alias = "roles")]
    pub target_roles: Vec<String>,
}

/// Skills arrive either as bare strings or `{ "name": ... }` objects,
/// depending on which form version produced the profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillField {
    Name(String),
    Tagged { name: String },
}

impl SkillField {
    pub fn as_str(&self) -> &str {
        match self {
            SkillField::Name(s) => s,
            SkillField::Tagged { name } => name,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default, alias = "start_date", alias = "from")]
    pub start: Option<String>,
    #[serde(default, alias = "end_date", alias = "to")]
    pub end: Option<String>,
    #[serde(default, alias = "position")]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default, alias = "degree")]
    pub name: Option<String>,
    #[serde(default, alias = "institution", alias = "university")]
    pub organization: Option<String>,
    #[serde(default, alias = "specialty")]
    pub field: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skills_accept_strings_and_objects() {
        let p: ProfileInput = serde_json::from_str(
            r#"{"skills": ["React", {"name": "Node.js"}]}"#,
        )
        .unwrap();
        let names: Vec<&str> = p.skills.iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["React", "Node.js"]);
    }

    #[test]
    fn experience_dates_accept_aliases() {
        let p: ProfileInput = serde_json::from_str(
            r#"{"experience": [
                {"start_date": "2020-01", "to": "2022-06", "position": "Developer"},
                {"from": "2019-03"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(p.experience[0].start.as_deref(), Some("2020-01"));
        assert_eq!(p.experience[0].end.as_deref(), Some("2022-06"));
        assert_eq!(p.experience[0].title.as_deref(), Some("Developer"));
        assert_eq!(p.experience[1].start.as_deref(), Some("2019-03"));
        assert!(p.experience[1].end.is_none());
    }

    #[test]
    fn empty_object_is_a_valid_profile() {
        let p: ProfileInput = serde_json::from_str("{}").unwrap();
        assert!(p.summary.is_none());
        assert!(p.skills.is_empty());
        assert!(p.experience.is_empty());
    }
}
