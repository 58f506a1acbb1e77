//! Catalog normalization: scraped CSV rows to typed [`AssessmentRecord`]s, plus
//! the text preprocessing shared by index build and query embedding.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::AssessmentRecord;

const NOT_AVAILABLE: &str = "N/A";
const DURATION_PREFIX: &str = "Approximate Completion Time in minutes = ";

/// Fixed code table used by the catalog's "Test Type(s)" column.
pub const TEST_TYPE_CODES: [(&str, &str); 8] = [
    ("A", "Ability & Aptitude"),
    ("B", "Biodata & Situational Judgement"),
    ("C", "Competencies"),
    ("D", "Development & 360"),
    ("E", "Assessment Exercises"),
    ("K", "Knowledge & Skills"),
    ("P", "Personality & Behavior"),
    ("S", "Simulations"),
];

/// Expand one code to its label. Unknown codes come back verbatim.
pub fn decode_test_type(code: &str) -> &str {
    TEST_TYPE_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map_or(code, |(_, label)| *label)
}

/// Split a comma-joined code string (e.g. `"A, K"`) and decode every code.
pub fn decode_test_types(codes: &str) -> Vec<String> {
    split_list(codes)
        .into_iter()
        .map(|code| decode_test_type(&code).to_string())
        .collect()
}

/// Lower-case, replace every non `[a-z0-9]` character with a space, collapse
/// whitespace and trim. Embedding-only; display metadata is never passed through this.
pub fn preprocess(text: &str) -> String {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    let re = NON_ALNUM.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static regex"));
    let lowered = text.to_lowercase();
    re.replace_all(&lowered, " ").trim().to_string()
}

/// Text embedded for a record: name, decoded types, job levels and description.
pub fn embedding_text(record: &AssessmentRecord) -> String {
    let combined = [
        record.name.as_str(),
        &record.test_types_joined(),
        record.job_levels.as_str(),
        record.description.as_str(),
    ]
    .join(" | ");
    preprocess(&combined)
}

/// First whitespace token as whole minutes, after dropping the scraper's prefix.
pub fn parse_duration(text: &str) -> Option<u32> {
    let text = text.trim();
    let text = text.strip_prefix(DURATION_PREFIX).unwrap_or(text);
    text.split_whitespace().next()?.parse().ok()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn yes(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("yes")
}

fn or_na(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() { NOT_AVAILABLE.to_string() } else { trimmed.to_string() }
}

/// One row of the scraped catalog, as written by the scraping job.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCatalogRow {
    #[serde(rename = "Assessment Name")]
    pub name: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Remote Testing Support")]
    pub remote_support: String,
    #[serde(rename = "Adaptive Support")]
    pub adaptive_support: String,
    #[serde(rename = "IRT Support")]
    pub irt_support: String,
    #[serde(rename = "Test Type(s)")]
    pub test_types: String,
    #[serde(rename = "Duration")]
    pub duration: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Job Levels")]
    pub job_levels: String,
    #[serde(rename = "Languages")]
    pub languages: String,
}

impl RawCatalogRow {
    pub fn normalize(self) -> AssessmentRecord {
        let codes = if self.test_types.trim() == NOT_AVAILABLE {
            Vec::new()
        } else {
            split_list(&self.test_types)
        };
        let test_types = codes.iter().map(|c| decode_test_type(c).to_string()).collect();
        let duration_text = self.duration.trim();
        let duration_text = duration_text
            .strip_prefix(DURATION_PREFIX)
            .unwrap_or(duration_text)
            .to_string();
        let languages = if self.languages.trim() == NOT_AVAILABLE {
            Vec::new()
        } else {
            split_list(&self.languages)
        };

        AssessmentRecord {
            name: self.name.trim().to_string(),
            url: self.url.trim().to_string(),
            remote_support: yes(&self.remote_support),
            adaptive_support: yes(&self.adaptive_support),
            irt_support: yes(&self.irt_support),
            test_type_codes: codes,
            test_types,
            job_levels: or_na(self.job_levels),
            languages,
            duration_minutes: parse_duration(&duration_text),
            duration_text: or_na(duration_text),
            description: self.description.trim().to_string(),
        }
    }
}

#[derive(Default)]
pub struct CatalogReader;

impl CatalogReader {
    pub fn new() -> Self { Self }

    /// Read and normalize every row of one catalog CSV.
    pub fn read_csv(&self, path: &Path) -> Result<Vec<AssessmentRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| Error::Catalog(format!("{}: {e}", path.display())))?;
        let mut records = Vec::new();
        for (row_index, row) in reader.deserialize::<RawCatalogRow>().enumerate() {
            let row = row.map_err(|e| Error::Catalog(format!("{} row {}: {e}", path.display(), row_index + 1)))?;
            if row.name.trim().is_empty() {
                tracing::warn!(path = %path.display(), row = row_index + 1, "skipping catalog row without a name");
                continue;
            }
            records.push(row.normalize());
        }
        tracing::info!(path = %path.display(), records = records.len(), "read catalog file");
        Ok(records)
    }

    /// Concatenate several catalog files in order; missing files are skipped
    /// with a warning, but an empty overall catalog is an error.
    pub fn read_all<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<AssessmentRecord>> {
        let mut all = Vec::new();
        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                tracing::warn!(path = %path.display(), "catalog file not found");
                continue;
            }
            all.extend(self.read_csv(path)?);
        }
        if all.is_empty() {
            return Err(Error::Catalog("no catalog records found to index".into()));
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_known_codes_and_keeps_unknown() {
        assert_eq!(decode_test_types("A, K"), vec!["Ability & Aptitude", "Knowledge & Skills"]);
        assert_eq!(decode_test_types("P,Z, "), vec!["Personality & Behavior", "Z"]);
        assert!(decode_test_types("").is_empty());
    }

    #[test]
    fn decoding_is_idempotent() {
        let once = decode_test_types("A, B, C, D, E, K, P, S, X");
        let twice = decode_test_types(&once.join(", "));
        assert_eq!(once, twice);
    }

    #[test]
    fn preprocess_collapses_punctuation_to_spaces() {
        assert_eq!(preprocess("  Java-8 (New)!!  Entry-Level "), "java 8 new entry level");
        assert_eq!(preprocess("A&B\tC\n"), "a b c");
    }

    #[test]
    fn duration_parsing_handles_prefix_and_junk() {
        assert_eq!(parse_duration("30"), Some(30));
        assert_eq!(parse_duration("Approximate Completion Time in minutes = 45"), Some(45));
        assert_eq!(parse_duration("Untimed"), None);
        assert_eq!(parse_duration("N/A"), None);
        assert_eq!(parse_duration(""), None);
    }

    #[test]
    fn normalize_defaults_missing_fields() {
        let row = RawCatalogRow {
            name: " Verify Numerical ".into(),
            remote_support: "Yes".into(),
            test_types: "N/A".into(),
            duration: "N/A".into(),
            ..RawCatalogRow::default()
        };
        let record = row.normalize();
        assert_eq!(record.name, "Verify Numerical");
        assert!(record.remote_support);
        assert!(!record.adaptive_support);
        assert!(record.test_types.is_empty());
        assert_eq!(record.job_levels, "N/A");
        assert_eq!(record.duration_minutes, None);
        assert_eq!(record.duration_text, "N/A");
    }

    #[test]
    fn embedding_text_uses_decoded_types() {
        let record = RawCatalogRow {
            name: "Core Java".into(),
            test_types: "K".into(),
            job_levels: "Mid-Professional".into(),
            description: "Tests Java.".into(),
            ..RawCatalogRow::default()
        }
        .normalize();
        assert_eq!(embedding_text(&record), "core java knowledge skills mid professional tests java");
    }
}
