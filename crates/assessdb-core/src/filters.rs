//! Structured filters pulled out of query text with fixed keyword/regex rules.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::AssessmentRecord;

pub const JOB_LEVELS: [&str; 6] = ["entry", "mid", "senior", "executive", "graduate", "manager"];

/// Query keyword to decoded test-type label. Several keywords share a label.
pub const TEST_TYPE_KEYWORDS: [(&str, &str); 12] = [
    ("ability", "Ability & Aptitude"),
    ("aptitude", "Ability & Aptitude"),
    ("biodata", "Biodata & Situational Judgement"),
    ("situational", "Biodata & Situational Judgement"),
    ("competency", "Competencies"),
    ("development", "Development & 360"),
    ("exercise", "Assessment Exercises"),
    ("skills", "Knowledge & Skills"),
    ("knowledge", "Knowledge & Skills"),
    ("personality", "Personality & Behavior"),
    ("behavior", "Personality & Behavior"),
    ("simulation", "Simulations"),
];

fn duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\s*minutes?").expect("static regex"))
}

/// Per-query predicates. `None` / empty set means the predicate always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    pub max_duration: Option<u32>,
    pub job_levels: BTreeSet<String>,
    pub test_types: BTreeSet<String>,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self.max_duration.is_none() && self.job_levels.is_empty() && self.test_types.is_empty()
    }
}

/// Digits to whole minutes; values past `u32::MAX` saturate instead of
/// dropping the ceiling.
fn parse_minutes(digits: &str) -> Option<u32> {
    match digits.parse::<u64>() {
        Ok(n) => Some(u32::try_from(n).unwrap_or(u32::MAX)),
        Err(_) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => Some(u32::MAX),
        Err(_) => None,
    }
}

/// Derive a [`FilterSet`] from query text. Pure and deterministic.
pub fn extract_filters(text: &str) -> FilterSet {
    let text = text.to_lowercase();

    let max_duration = duration_regex()
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_minutes(m.as_str()));

    let job_levels = JOB_LEVELS
        .iter()
        .filter(|level| text.contains(*level))
        .map(ToString::to_string)
        .collect();

    let test_types = TEST_TYPE_KEYWORDS
        .iter()
        .filter(|(keyword, _)| text.contains(keyword))
        .map(|(_, label)| (*label).to_string())
        .collect();

    FilterSet { max_duration, job_levels, test_types }
}

/// True when the record satisfies every present predicate.
///
/// A record whose duration is unknown (or zero) is never excluded by the
/// duration ceiling.
pub fn passes_filters(record: &AssessmentRecord, filters: &FilterSet) -> bool {
    if let (Some(max), Some(duration)) = (filters.max_duration, record.duration_minutes) {
        if duration > 0 && duration > max {
            return false;
        }
    }

    if !filters.job_levels.is_empty() {
        let levels = record.job_levels.to_lowercase();
        if !filters.job_levels.iter().any(|level| levels.contains(level.as_str())) {
            return false;
        }
    }

    if !filters.test_types.is_empty() {
        let types = record.test_types_joined().to_lowercase();
        if !filters.test_types.iter().any(|t| types.contains(&t.to_lowercase())) {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(duration: Option<u32>, job_levels: &str, test_types: &[&str]) -> AssessmentRecord {
        AssessmentRecord {
            name: "Sample".into(),
            url: "https://example.com/sample".into(),
            remote_support: true,
            adaptive_support: false,
            irt_support: false,
            test_type_codes: Vec::new(),
            test_types: test_types.iter().map(ToString::to_string).collect(),
            job_levels: job_levels.into(),
            languages: vec!["English (USA)".into()],
            duration_minutes: duration,
            duration_text: duration.map_or_else(|| "N/A".into(), |d| d.to_string()),
            description: "A sample assessment.".into(),
        }
    }

    #[test]
    fn extracts_first_duration_only() {
        let f = extract_filters("Need a test under 30 minutes, max 60 minutes total");
        assert_eq!(f.max_duration, Some(30));
        assert_eq!(extract_filters("about 1 minute").max_duration, Some(1));
        assert_eq!(extract_filters("an hour long").max_duration, None);
    }

    #[test]
    fn oversized_duration_saturates() {
        assert_eq!(extract_filters("within 99999999999 minutes").max_duration, Some(u32::MAX));
        assert_eq!(extract_filters("within 99999999999999999999999 minutes").max_duration, Some(u32::MAX));
        assert!(passes_filters(&record(Some(45), "", &[]), &extract_filters("99999999999 minutes")));
    }

    #[test]
    fn collects_every_job_level_substring() {
        let f = extract_filters("Senior or mid-level MANAGER");
        let levels: Vec<_> = f.job_levels.iter().map(String::as_str).collect();
        assert_eq!(levels, vec!["manager", "mid", "senior"]);
    }

    #[test]
    fn synonyms_collapse_to_one_label() {
        let f = extract_filters("ability and aptitude, knowledge skills");
        assert_eq!(f.test_types.len(), 2);
        assert!(f.test_types.contains("Ability & Aptitude"));
        assert!(f.test_types.contains("Knowledge & Skills"));
    }

    #[test]
    fn extraction_is_deterministic() {
        let q = "Entry level personality test within 40 minutes";
        let first = extract_filters(q);
        let _ = extract_filters("something else entirely senior simulation");
        assert_eq!(first, extract_filters(q));
    }

    #[test]
    fn empty_filters_pass_everything() {
        let f = FilterSet::default();
        assert!(f.is_empty());
        assert!(passes_filters(&record(Some(500), "", &[]), &f));
        assert!(passes_filters(&record(None, "N/A", &["Simulations"]), &f));
    }

    #[test]
    fn duration_ceiling_from_thirty_minutes() {
        let f = extract_filters("looking for something that takes 30 minutes");
        assert_eq!(f.max_duration, Some(30));
        assert!(!passes_filters(&record(Some(45), "", &[]), &f));
        assert!(passes_filters(&record(Some(20), "", &[]), &f));
        assert!(passes_filters(&record(Some(30), "", &[]), &f));
        assert!(passes_filters(&record(None, "", &[]), &f));
    }

    #[test]
    fn personality_and_entry_filters() {
        let f = extract_filters("personality test for entry hires");
        let good = record(None, "Entry-Level, Graduate", &["Personality & Behavior"]);
        assert!(passes_filters(&good, &f));

        let senior_only = record(None, "Senior", &["Personality & Behavior"]);
        assert!(!passes_filters(&senior_only, &f));
    }

    #[test]
    fn test_type_filter_rejects_other_categories() {
        let f = extract_filters("simulation exercise");
        assert!(!passes_filters(&record(None, "", &["Knowledge & Skills"]), &f));
        assert!(passes_filters(&record(None, "", &["Knowledge & Skills", "Simulations"]), &f));
    }
}
