pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Text-completion capability of the external language service.
///
/// Callers must treat every invocation as fallible and non-deterministic.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}
