use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use assessdb_core::config::LlmConfig;
use assessdb_core::traits::TextGenerator;

/// Blocking client for the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    api_key: String,
    endpoint: String,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .context("failed to build Gemini HTTP client")?;
        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );
        Ok(Self { api_key, endpoint, client })
    }

    pub fn endpoint(&self) -> &str { &self.endpoint }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(self.api_key.trim()).context("invalid Gemini API key")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let body = GenerateRequest { contents: vec![Content { parts: vec![Part { text: prompt }] }] };

        let resp = self
            .client
            .post(&self.endpoint)
            .headers(headers)
            .json(&body)
            .send()
            .context("failed to call Gemini generateContent")?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_else(|_| "<body unavailable>".to_string());
            bail!("Gemini returned {}: {}", status, text);
        }
        let parsed: GenerateResponse = resp.json().context("failed to parse Gemini response")?;
        let Some(candidate) = parsed.candidates.into_iter().next() else {
            bail!("Gemini returned no candidates");
        };
        let text: String = candidate.content.parts.into_iter().filter_map(|p| p.text).collect();
        Ok(text)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}
