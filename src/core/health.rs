//! Keyword classifier for free-text donor health summaries.
//!
//! Matching is plain substring containment on whitespace-normalized,
//! lowercased text: no stemming and no negation handling, so "no illness"
//! still raises `recent_illness`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete risk category derived from a health summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthFlag {
    RecentIllness,
    Diabetes,
    Anemia,
    /// Blood-pressure related
    Bp,
    Medication,
}

impl HealthFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthFlag::RecentIllness => "recent_illness",
            HealthFlag::Diabetes => "diabetes",
            HealthFlag::Anemia => "anemia",
            HealthFlag::Bp => "bp",
            HealthFlag::Medication => "medication",
        }
    }
}

impl fmt::Display for HealthFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword table, checked in order. Keywords are stored already normalized.
pub static HEALTH_RULES: [(HealthFlag, &[&str]); 5] = [
    (
        HealthFlag::RecentIllness,
        &["ill", "sick", "fever", "cold", "cough", "infection", "flu", "unwell", "recently ill"],
    ),
    (
        HealthFlag::Diabetes,
        &["diabetes", "diabetic", "sugar", "blood sugar", "glucose"],
    ),
    (
        HealthFlag::Anemia,
        &["anemia", "anaemia", "low haemoglobin", "low hemoglobin", "hb low"],
    ),
    (
        HealthFlag::Bp,
        &["blood pressure", "hypertension", "high bp", "low bp", "hypotension"],
    ),
    (
        HealthFlag::Medication,
        &["medication", "medicines", "on drugs", "antibiotics", "treatment"],
    ),
];

/// Collapse whitespace runs to single spaces, trim and lowercase
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Map a free-text health summary to its risk flags.
///
/// Returns an empty list for a missing or blank summary. Each flag appears at
/// most once, in [`HEALTH_RULES`] order.
pub fn classify_health_summary(summary: Option<&str>) -> Vec<HealthFlag> {
    let text = match summary.map(normalize_text) {
        Some(text) if !text.is_empty() => text,
        _ => return Vec::new(),
    };

    let flags: Vec<HealthFlag> = HEALTH_RULES
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| text.contains(kw)))
        .map(|(flag, _)| *flag)
        .collect();

    tracing::trace!("Classified health summary into {} flags", flags.len());

    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_missing() {
        assert!(classify_health_summary(None).is_empty());
        assert!(classify_health_summary(Some("")).is_empty());
        assert!(classify_health_summary(Some("   \t\n ")).is_empty());
    }

    #[test]
    fn test_recent_illness_synonyms() {
        for text in ["I was ill last week", "had fever", "Feeling UNWELL", "slight cough"] {
            assert!(
                classify_health_summary(Some(text)).contains(&HealthFlag::RecentIllness),
                "{:?} should flag recent_illness",
                text
            );
        }
    }

    #[test]
    fn test_negation_is_not_understood() {
        assert_eq!(
            classify_health_summary(Some("no illness")),
            vec![HealthFlag::RecentIllness]
        );
    }

    #[test]
    fn test_whitespace_is_collapsed_before_matching() {
        assert_eq!(
            classify_health_summary(Some("High\n\n   BP since 2019")),
            vec![HealthFlag::Bp]
        );
        assert!(classify_health_summary(Some("blood   sugar")).contains(&HealthFlag::Diabetes));
    }

    #[test]
    fn test_multiple_flags_in_table_order() {
        assert_eq!(
            classify_health_summary(Some("diabetes and fever")),
            vec![HealthFlag::RecentIllness, HealthFlag::Diabetes]
        );
        assert_eq!(
            classify_health_summary(Some("on antibiotics for anaemia")),
            vec![HealthFlag::Anemia, HealthFlag::Medication]
        );
    }

    #[test]
    fn test_healthy_summary_has_no_flags() {
        assert!(classify_health_summary(Some("Fit and healthy, regular runner")).is_empty());
    }

    #[test]
    fn test_keywords_are_normalized() {
        for (_, keywords) in HEALTH_RULES.iter() {
            for kw in keywords.iter() {
                assert_eq!(normalize_text(kw), *kw);
            }
        }
    }

    #[test]
    fn test_flag_names() {
        assert_eq!(serde_json::to_string(&HealthFlag::RecentIllness).unwrap(), "\"recent_illness\"");
        assert_eq!(HealthFlag::Bp.to_string(), "bp");
    }
}
