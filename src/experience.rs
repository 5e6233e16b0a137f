//! Experience buckets on the ordered scale none < 1-3 < 3-6 < 6+.
//! This enum is the single canonical representation; both label families
//! found in the wild ("between1And3" and "1-3") parse onto it at the
//! boundary.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Experience {
    NoExperience,
    Between1And3,
    Between3And6,
    MoreThan6,
}

impl Experience {
    /// Position on the ordered scale, for distance scoring.
    pub fn rank(self) -> u8 {
        match self {
            Experience::NoExperience => 0,
            Experience::Between1And3 => 1,
            Experience::Between3And6 => 2,
            Experience::MoreThan6 => 3,
        }
    }

    pub fn from_years(years: f64) -> Self {
        if years < 1.0 {
            Experience::NoExperience
        } else if years < 3.0 {
            Experience::Between1And3
        } else if years < 6.0 {
            Experience::Between3And6
        } else {
            Experience::MoreThan6
        }
    }

    /// Accepts both the camelCase codes and the short "1-3" style labels.
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim() {
            "noExperience" | "none" | "0" => Some(Experience::NoExperience),
            "between1And3" | "1-3" => Some(Experience::Between1And3),
            "between3And6" | "3-6" => Some(Experience::Between3And6),
            "moreThan6" | "6+" | "6" => Some(Experience::MoreThan6),
            _ => None,
        }
    }

    /// Candidate-vs-vacancy alignment: exact 1.0, adjacent 0.7, distance two
    /// 0.4, further 0.1. A vacancy without a bucket scores a neutral 0.5.
    pub fn match_score(candidate: Self, vacancy: Option<Self>) -> f64 {
        let Some(v) = vacancy else { return 0.5 };
        match candidate.rank().abs_diff(v.rank()) {
            0 => 1.0,
            1 => 0.7,
            2 => 0.4,
            _ => 0.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_thresholds() {
        assert_eq!(Experience::from_years(0.0), Experience::NoExperience);
        assert_eq!(Experience::from_years(0.9), Experience::NoExperience);
        assert_eq!(Experience::from_years(1.0), Experience::Between1And3);
        assert_eq!(Experience::from_years(2.9), Experience::Between1And3);
        assert_eq!(Experience::from_years(3.0), Experience::Between3And6);
        assert_eq!(Experience::from_years(5.9), Experience::Between3And6);
        assert_eq!(Experience::from_years(6.0), Experience::MoreThan6);
        assert_eq!(Experience::from_years(40.0), Experience::MoreThan6);
    }

    #[test]
    fn bucket_is_monotonic_in_years() {
        let samples = [0.0, 0.5, 1.0, 2.0, 3.0, 4.5, 6.0, 12.0];
        let ranks: Vec<u8> = samples
            .iter()
            .map(|&y| Experience::from_years(y).rank())
            .collect();
        assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn parse_accepts_both_label_families() {
        assert_eq!(Experience::parse("between1And3"), Some(Experience::Between1And3));
        assert_eq!(Experience::parse("1-3"), Some(Experience::Between1And3));
        assert_eq!(Experience::parse("moreThan6"), Some(Experience::MoreThan6));
        assert_eq!(Experience::parse("6+"), Some(Experience::MoreThan6));
        assert_eq!(Experience::parse("senior"), None);
    }

    #[test]
    fn match_score_by_distance() {
        use Experience::*;
        assert_eq!(Experience::match_score(Between1And3, Some(Between1And3)), 1.0);
        assert_eq!(Experience::match_score(Between1And3, Some(Between3And6)), 0.7);
        assert_eq!(Experience::match_score(NoExperience, Some(Between3And6)), 0.4);
        assert_eq!(Experience::match_score(NoExperience, Some(MoreThan6)), 0.1);
        assert_eq!(Experience::match_score(MoreThan6, None), 0.5);
    }

    #[test]
    fn serde_codes_are_camel_case() {
        let json = serde_json::to_string(&Experience::Between1And3).unwrap();
        assert_eq!(json, "\"between1And3\"");
        let back: Experience = serde_json::from_str("\"noExperience\"").unwrap();
        assert_eq!(back, Experience::NoExperience);
    }
}
