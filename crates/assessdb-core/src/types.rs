//! Domain types shared by the index, the engine and the serving shells.

use serde::{Deserialize, Serialize};

/// Position of a record in the metadata sequence; the only join key between a
/// vector hit and its metadata.
pub type RecordId = usize;

/// One catalog assessment as persisted next to the vector index.
///
/// - `test_type_codes`/`test_types`: raw codes and their decoded labels, same order
/// - `job_levels`: free text as scraped (`"N/A"` when absent)
/// - `duration_minutes`: parsed from `duration_text`, `None` when unparseable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub name: String,
    pub url: String,
    pub remote_support: bool,
    pub adaptive_support: bool,
    pub irt_support: bool,
    pub test_type_codes: Vec<String>,
    pub test_types: Vec<String>,
    pub job_levels: String,
    pub languages: Vec<String>,
    pub duration_minutes: Option<u32>,
    pub duration_text: String,
    pub description: String,
}

impl AssessmentRecord {
    /// Decoded test types joined the way they are shown and filtered on.
    pub fn test_types_joined(&self) -> String {
        self.test_types.join(", ")
    }
}

/// A scored copy of a catalog record.
///
/// `score` is the squared Euclidean distance from the query vector; lower is
/// more relevant. `rerank_position` is 1-based and only set when the external
/// reranker produced a usable ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub record: AssessmentRecord,
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerank_position: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl SearchResult {
    pub fn new(record: AssessmentRecord, score: f32) -> Self {
        Self { record, score, rerank_position: None, explanation: None }
    }
}

/// Why a response carries a fallback message instead of (or next to) results.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DegradedReason {
    IndexUnavailable,
    EmbeddingModelUnavailable,
    NoMatches,
    /// The pipeline itself did not finish (panicked or was cancelled).
    PipelineFailed,
}

/// Per-request knobs accepted at the serving boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SearchOptions {
    pub top_k: usize,
    pub rerank: bool,
    pub explain: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { top_k: 10, rerank: true, explain: false }
    }
}

/// Always well-formed outcome of a search; "no results" and "service degraded"
/// are both expressed here rather than as errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub rewritten_query: String,
    pub results: Vec<SearchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<DegradedReason>,
}

impl SearchResponse {
    pub fn degraded(rewritten_query: String, reason: DegradedReason, fallback: String) -> Self {
        Self { rewritten_query, results: Vec::new(), fallback: Some(fallback), degraded: Some(reason) }
    }
}
