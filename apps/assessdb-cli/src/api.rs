//! JSON shapes of the HTTP serving boundary.

use serde::{Deserialize, Serialize};

use assessdb_core::types::{DegradedReason, SearchOptions, SearchResponse, SearchResult};

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub rerank: Option<bool>,
    #[serde(default)]
    pub explain: Option<bool>,
}

impl RecommendRequest {
    pub fn options(&self, default_top_k: usize) -> SearchOptions {
        let defaults = SearchOptions::default();
        SearchOptions {
            top_k: self.top_k.unwrap_or(default_top_k),
            rerank: self.rerank.unwrap_or(defaults.rerank),
            explain: self.explain.unwrap_or(defaults.explain),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendedAssessment {
    pub name: String,
    pub url: String,
    pub adaptive_support: String,
    pub description: String,
    /// Minutes; `0` when the catalog has no usable duration.
    pub duration: u32,
    pub remote_support: String,
    pub test_type: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

fn yes_no(flag: bool) -> String {
    if flag { "Yes" } else { "No" }.to_string()
}

impl From<SearchResult> for RecommendedAssessment {
    fn from(result: SearchResult) -> Self {
        let record = result.record;
        Self {
            name: record.name,
            url: record.url,
            adaptive_support: yes_no(record.adaptive_support),
            description: record.description,
            duration: record.duration_minutes.unwrap_or(0),
            remote_support: yes_no(record.remote_support),
            test_type: record.test_types,
            explanation: result.explanation,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub recommended_assessments: Vec<RecommendedAssessment>,
    pub rewritten_query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<DegradedReason>,
}

impl RecommendResponse {
    /// Response for a pipeline that did not finish (panic or cancelled task).
    pub fn failure(query: String, message: String) -> Self {
        Self { recommended_assessments: Vec::new(), rewritten_query: query, fallback: Some(message), degraded: Some(DegradedReason::PipelineFailed) }
    }
}

impl From<SearchResponse> for RecommendResponse {
    fn from(response: SearchResponse) -> Self {
        Self {
            recommended_assessments: response.results.into_iter().map(Into::into).collect(),
            rewritten_query: response.rewritten_query,
            fallback: response.fallback,
            degraded: response.degraded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assessdb_core::catalog::RawCatalogRow;
    use serde_json::json;

    #[test]
    fn request_defaults() {
        let req: RecommendRequest = serde_json::from_value(json!({ "query": "java" })).unwrap();
        let options = req.options(10);
        assert_eq!(options.top_k, 10);
        assert!(options.rerank);
        assert!(!options.explain);

        let req: RecommendRequest =
            serde_json::from_value(json!({ "query": "java", "top_k": 3, "rerank": false })).unwrap();
        let options = req.options(10);
        assert_eq!(options.top_k, 3);
        assert!(!options.rerank);
    }

    #[test]
    fn renders_flags_and_unknown_duration() {
        let record = RawCatalogRow {
            name: "Java Frameworks".into(),
            url: "https://www.shl.com/java-frameworks".into(),
            remote_support: "Yes".into(),
            adaptive_support: "No".into(),
            test_types: "K, S".into(),
            duration: "Untimed".into(),
            description: "Spring".into(),
            ..RawCatalogRow::default()
        }
        .normalize();
        let response = SearchResponse {
            rewritten_query: "java".into(),
            results: vec![SearchResult::new(record, 0.5)],
            fallback: None,
            degraded: None,
        };

        let value = serde_json::to_value(RecommendResponse::from(response)).unwrap();
        assert_eq!(
            value,
            json!({
                "recommended_assessments": [{
                    "name": "Java Frameworks",
                    "url": "https://www.shl.com/java-frameworks",
                    "adaptive_support": "No",
                    "description": "Spring",
                    "duration": 0,
                    "remote_support": "Yes",
                    "test_type": ["Knowledge & Skills", "Simulations"]
                }],
                "rewritten_query": "java"
            })
        );
    }

    #[test]
    fn degraded_response_keeps_fallback() {
        let response = SearchResponse::degraded("q".into(), DegradedReason::NoMatches, "Try again".into());
        let value = serde_json::to_value(RecommendResponse::from(response)).unwrap();
        assert_eq!(value["recommended_assessments"], json!([]));
        assert_eq!(value["fallback"], "Try again");
        assert_eq!(value["degraded"], "no_matches");
    }

    #[test]
    fn failed_pipeline_is_marked_degraded() {
        let response = RecommendResponse::failure("java".into(), "Search failed: task panicked".into());
        let value = serde_json::to_value(response).unwrap();
        assert_eq!(value["recommended_assessments"], json!([]));
        assert_eq!(value["rewritten_query"], "java");
        assert_eq!(value["fallback"], "Search failed: task panicked");
        assert_eq!(value["degraded"], "pipeline_failed");
    }
}
