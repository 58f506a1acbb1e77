//! Job-description pages given by URL instead of pasted text.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use scraper::Html;

const FETCH_TIMEOUT: Duration = Duration::from_secs(5);
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Fetch `url` and return its visible text, whitespace-joined.
pub fn fetch_page_text(url: &str) -> Result<String> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("Please enter a valid URL (with http:// or https://): {url}");
    }
    let client = Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .context("failed to build HTTP client")?;
    let body = client
        .get(url)
        .send()
        .with_context(|| format!("failed to fetch {url}"))?
        .text()
        .with_context(|| format!("failed to read body of {url}"))?;
    let text = visible_text(&body);
    if text.is_empty() {
        bail!("no readable text found at {url}");
    }
    tracing::info!(url, chars = text.len(), "extracted page text");
    Ok(text)
}

/// Text nodes outside script-like elements, each trimmed, joined by spaces.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts = Vec::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else { continue };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        let text = text.trim();
        if !hidden && !text.is_empty() {
            parts.push(text.split_whitespace().collect::<Vec<_>>().join(" "));
        }
    }
    parts.join(" ")
}
