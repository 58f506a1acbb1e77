//! Query rewrite, rerank, explanation and fallback text.
//!
//! Each step calls the generator once per unit of work and falls back to a
//! fixed substitution on any failure, so callers never see an error.

use assessdb_core::traits::TextGenerator;
use assessdb_core::types::{AssessmentRecord, SearchResult};

pub const EXPLANATION_PLACEHOLDER: &str =
    "This assessment aligns well with the job requirements based on type, level, and content.";
pub const NO_MATCHES_MESSAGE: &str =
    "Sorry, no matching assessments were found. Please try rephrasing your input.";

fn rewrite_prompt(query: &str) -> String {
    format!(
        "You are a helpful assistant. Rewrite this vague or ambiguous hiring query into a more specific and structured version suited for matching with assessment tests.\n\n\
Original Query:\n{query}\n\n\
Rewritten Query:"
    )
}

fn rerank_prompt(query: &str, results: &[SearchResult], description_chars: usize) -> String {
    let listing = results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let desc: String = r.record.description.chars().take(description_chars).collect();
            format!("{}. {} - {}...", i + 1, r.record.name, desc)
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "You are an AI that reranks test assessments based on how relevant they are to a given hiring query.\n\n\
Query: {query}\n\n\
Here are the current top results:\n{listing}\n\n\
Return a new ranking as a list of assessment names from most to least relevant.\n\
Output Format (just list):\n\
1. Assessment A\n\
2. Assessment B\n\
...\n\n\
Reranked List:"
    )
}

fn explain_prompt(query: &str, record: &AssessmentRecord) -> String {
    format!(
        "Explain in 2-3 lines why the following assessment is suitable for this hiring query.\n\n\
Query: {query}\n\n\
Assessment:\n\
Name: {}\n\
Description: {}\n\
Test Type: {}\n\
Job Levels: {}\n\n\
Explanation:",
        record.name,
        record.description,
        record.test_types_joined(),
        record.job_levels
    )
}

fn fallback_prompt(query: &str) -> String {
    format!(
        "No relevant assessments were found for the query below. Provide a helpful message or alternative suggestion.\n\n\
Query: {query}\n\n\
Response:"
    )
}

/// Trimmed, non-empty generator output or `None`, logging the failure.
fn generate_trimmed(generator: &dyn TextGenerator, call: &str, prompt: &str) -> Option<String> {
    match generator.generate(prompt) {
        Ok(text) => {
            let text = text.trim();
            if text.is_empty() {
                tracing::warn!(call, "language service returned an empty response");
                None
            } else {
                Some(text.to_string())
            }
        }
        Err(err) => {
            tracing::warn!(call, error = %err, "language service call failed");
            None
        }
    }
}

/// A more specific version of `query`, or `query` unchanged.
pub fn rewrite_query(generator: &dyn TextGenerator, query: &str) -> String {
    match generate_trimmed(generator, "rewrite", &rewrite_prompt(query)) {
        Some(rewritten) => {
            tracing::info!(original = query, rewritten = %rewritten, "rewrote query");
            rewritten
        }
        None => query.to_string(),
    }
}

/// Names from a numbered list: every line containing `". "` is split once and
/// the trimmed right side kept.
pub fn parse_ranked_names(response: &str) -> Vec<String> {
    response
        .trim()
        .lines()
        .filter_map(|line| line.split_once(". "))
        .map(|(_, name)| name.trim().to_string())
        .collect()
}

/// Reorder `results` by the generator's ranking.
///
/// Unknown names are skipped; candidates the ranking omitted are appended in
/// their original order. If nothing usable comes back the input order is kept
/// and no rerank positions are set.
pub fn rerank(
    generator: &dyn TextGenerator,
    query: &str,
    results: Vec<SearchResult>,
    description_chars: usize,
) -> Vec<SearchResult> {
    if results.is_empty() {
        return results;
    }
    let Some(response) = generate_trimmed(generator, "rerank", &rerank_prompt(query, &results, description_chars)) else {
        return results;
    };

    let mut slots: Vec<Option<SearchResult>> = results.into_iter().map(Some).collect();
    let mut reranked = Vec::with_capacity(slots.len());
    for name in parse_ranked_names(&response) {
        let found = slots
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|r| r.record.name == name))
            .and_then(Option::take);
        match found {
            Some(result) => reranked.push(result),
            None => tracing::warn!(name = %name, "reranker returned an unknown or repeated assessment name"),
        }
    }

    if reranked.is_empty() {
        tracing::warn!("reranker produced no usable ordering; keeping retrieval order");
        return slots.into_iter().flatten().collect();
    }
    reranked.extend(slots.into_iter().flatten());
    for (position, result) in reranked.iter_mut().enumerate() {
        result.rerank_position = Some(position + 1);
    }
    reranked
}

/// Short justification of `record` for `query`, or the fixed placeholder.
pub fn explain(generator: &dyn TextGenerator, query: &str, record: &AssessmentRecord) -> String {
    generate_trimmed(generator, "explain", &explain_prompt(query, record))
        .unwrap_or_else(|| EXPLANATION_PLACEHOLDER.to_string())
}

pub fn explain_all(generator: &dyn TextGenerator, query: &str, results: &mut [SearchResult]) {
    for result in results.iter_mut() {
        result.explanation = Some(explain(generator, query, &result.record));
    }
}

/// User-facing message for a query that matched nothing; never empty.
pub fn fallback_message(generator: &dyn TextGenerator, query: &str) -> String {
    generate_trimmed(generator, "fallback", &fallback_prompt(query))
        .unwrap_or_else(|| NO_MATCHES_MESSAGE.to_string())
}
