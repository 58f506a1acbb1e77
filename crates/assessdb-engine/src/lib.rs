//! Query-time pipeline: cached index, query rewrite, filtered dense
//! retrieval, then optional rerank and explanations.

use anyhow::Result;

use assessdb_core::catalog::preprocess;
use assessdb_core::config::{RetrievalConfig, Settings};
use assessdb_core::error::Error;
use assessdb_core::filters::{extract_filters, passes_filters, FilterSet};
use assessdb_core::traits::{Embedder, TextGenerator};
use assessdb_core::types::{DegradedReason, SearchOptions, SearchResponse, SearchResult};
use assessdb_index::{l2_normalize, IndexStore};
use assessdb_llm::refine;

mod cache;

pub use cache::{IndexCache, LoadedIndex};

pub const EMBEDDING_MODEL_UNAVAILABLE: &str = "Sentence embedding model not loaded.";

pub struct Recommender {
    cache: IndexCache,
    embedder: Option<Box<dyn Embedder>>,
    generator: Box<dyn TextGenerator>,
    retrieval: RetrievalConfig,
    description_chars: usize,
}

impl Recommender {
    pub fn new(
        cache: IndexCache,
        embedder: Option<Box<dyn Embedder>>,
        generator: Box<dyn TextGenerator>,
        retrieval: RetrievalConfig,
        description_chars: usize,
    ) -> Self {
        Self { cache, embedder, generator, retrieval, description_chars }
    }

    /// Wire the production pipeline from settings. A model that fails to load
    /// leaves the recommender serving degraded responses rather than failing.
    pub fn from_settings(settings: &Settings) -> Self {
        let index_dir = assessdb_core::config::expand_path(&settings.data.index_dir);
        let cache = IndexCache::new(IndexStore::new(index_dir));
        let embedder = match assessdb_embed::get_default_embedder(&settings.embedding) {
            Ok(embedder) => Some(embedder),
            Err(err) => {
                tracing::error!(error = %err, "embedding model unavailable");
                None
            }
        };
        let generator = assessdb_llm::generator_from_config(&settings.llm);
        Self::new(cache, embedder, generator, settings.retrieval.clone(), settings.llm.description_chars)
    }

    pub fn cache(&self) -> &IndexCache { &self.cache }

    pub fn default_top_k(&self) -> usize { self.retrieval.default_top_k }

    /// Run the full pipeline. Every failure is folded into the response.
    pub fn search(&self, query: &str, options: SearchOptions) -> SearchResponse {
        let top_k = options.top_k.clamp(1, self.retrieval.max_top_k.max(1));

        let loaded = match self.cache.get() {
            Ok(loaded) => loaded,
            Err(err) => {
                tracing::error!(error = %err, "index load failed");
                return SearchResponse::degraded(
                    query.to_string(),
                    DegradedReason::IndexUnavailable,
                    format!("Could not load index or metadata: {err}"),
                );
            }
        };
        let Some(embedder) = self.embedder.as_deref() else {
            return SearchResponse::degraded(
                query.to_string(),
                DegradedReason::EmbeddingModelUnavailable,
                EMBEDDING_MODEL_UNAVAILABLE.to_string(),
            );
        };
        if loaded.index.dim() != embedder.dim() {
            let err = Error::DimensionMismatch { expected: loaded.index.dim(), actual: embedder.dim() };
            tracing::error!(error = %err, "index was built with a different embedding model; rebuild it");
            return SearchResponse::degraded(
                query.to_string(),
                DegradedReason::IndexUnavailable,
                format!("Could not load index or metadata: {err}"),
            );
        }

        let rewritten = refine::rewrite_query(self.generator.as_ref(), query);
        let filters = extract_filters(&rewritten);
        tracing::debug!(?filters, "extracted filters");

        let mut results = match self.retrieve(embedder, &loaded, &rewritten, &filters, top_k) {
            Ok(results) => results,
            Err(err) => {
                tracing::error!(error = %err, "vector search failed");
                Vec::new()
            }
        };

        if results.is_empty() {
            let fallback = refine::fallback_message(self.generator.as_ref(), query);
            return SearchResponse::degraded(rewritten, DegradedReason::NoMatches, fallback);
        }

        if options.rerank {
            results = refine::rerank(self.generator.as_ref(), &rewritten, results, self.description_chars);
        }
        if options.explain {
            refine::explain_all(self.generator.as_ref(), &rewritten, &mut results);
        }
        results.truncate(top_k);
        tracing::info!(results = results.len(), top_k, "search complete");
        SearchResponse { rewritten_query: rewritten, results, fallback: None, degraded: None }
    }

    /// Over-fetch nearest neighbours, then keep the first `top_k` that pass
    /// the filters, in distance order.
    fn retrieve(
        &self,
        embedder: &dyn Embedder,
        loaded: &LoadedIndex,
        query: &str,
        filters: &FilterSet,
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let mut vector = embedder
            .embed_batch(&[preprocess(query)])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector for the query"))?;
        l2_normalize(&mut vector);

        let candidates = top_k.saturating_mul(self.retrieval.overfetch_factor.max(1));
        let hits = loaded.index.search(&vector, candidates)?;

        let mut results = Vec::with_capacity(top_k);
        for hit in hits {
            let Some(record) = loaded.records.get(hit.id) else {
                tracing::debug!(id = hit.id, records = loaded.records.len(), "skipping hit without metadata");
                continue;
            };
            if passes_filters(record, filters) {
                results.push(SearchResult::new(record.clone(), hit.distance));
            }
            if results.len() >= top_k {
                break;
            }
        }
        Ok(results)
    }
}
