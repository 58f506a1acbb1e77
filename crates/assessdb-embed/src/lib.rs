use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;

use assessdb_core::config::EmbeddingConfig;
use assessdb_core::traits::Embedder;

mod device;
mod pool;
mod tokenize;

pub use device::select_device;
pub use pool::masked_mean_l2;
pub use tokenize::tokenize_batch;

/// Output width of all-MiniLM-L6-v2, the model the catalog index is built with.
pub const MINILM_DIM: usize = 384;

/// Sentence-transformer (BERT encoder, mean pooled, L2 normalised) loaded from
/// a local model directory containing `config.json`, `tokenizer.json` and
/// `model.safetensors` or `pytorch_model.bin`.
pub struct SentenceEmbedder { model: BertModel, tokenizer: Tokenizer, device: Device, dim: usize, max_len: usize }

impl SentenceEmbedder {
    pub fn load(model_dir: &Path, max_len: usize) -> Result<Self> {
        let device = select_device();
        tracing::info!(dir = %model_dir.display(), "loading sentence embedding model");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;

        let config_path = model_dir.join("config.json");
        let raw_config = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: BertConfig = serde_json::from_str(&raw_config)?;
        let dim = serde_json::from_str::<serde_json::Value>(&raw_config)?
            .get("hidden_size")
            .and_then(serde_json::Value::as_u64)
            .map_or(MINILM_DIM, |d| d as usize);

        let weights = load_weights(model_dir, &device)?;
        let vb = VarBuilder::from_tensors(weights, DType::F32, &device);
        let model = BertModel::load(vb, &config).context("Failed to build BERT model")?;
        tracing::info!(dim, max_len, "sentence embedding model loaded");
        Ok(Self { model, tokenizer, device, dim, max_len })
    }

    fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let start = Instant::now();
        let (input_ids, attention_mask) = tokenize_batch(&self.tokenizer, texts, self.max_len, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let vectors: Vec<Vec<f32>> = pooled.to_device(&Device::Cpu)?.to_vec2()?;
        tracing::debug!(batch = texts.len(), elapsed_ms = start.elapsed().as_millis() as u64, "embedded batch");
        Ok(vectors)
    }
}

impl Embedder for SentenceEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { self.max_len }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() { return Ok(Vec::new()); }
        self.embed_chunk(texts)
    }
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        return candle_core::safetensors::load(&safetensors, device)
            .with_context(|| format!("Failed to read {}", safetensors.display()));
    }
    let pickle = model_dir.join("pytorch_model.bin");
    let weights = candle_core::pickle::read_all(&pickle)
        .with_context(|| format!("Failed to read {}", pickle.display()))?;
    Ok(weights.into_iter().collect())
}

/// Token-hashing embedder: deterministic, unit length, no model files needed.
pub struct FakeEmbedder { dim: usize }

impl FakeEmbedder { pub fn new(dim: usize) -> Self { Self { dim } } }

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { 512 }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;
        Ok(texts
            .iter()
            .map(|text| {
                let mut v = vec![0f32; self.dim];
                for (i, token) in text.split_whitespace().enumerate() {
                    let mut hasher = XxHash64::with_seed(0);
                    token.hash(&mut hasher);
                    let h = hasher.finish();
                    let idx = (h as usize) % self.dim;
                    let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
                    v[idx] += val + (i as f32 % 3.0) * 0.01;
                }
                let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
                for x in &mut v { *x /= norm; }
                v
            })
            .collect())
    }
}

fn use_fake_embeddings() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// The embedder used by rebuild and serving. `APP_USE_FAKE_EMBEDDINGS=1`
/// switches to [`FakeEmbedder`] for tests and offline development.
pub fn get_default_embedder(config: &EmbeddingConfig) -> Result<Box<dyn Embedder>> {
    if use_fake_embeddings() {
        tracing::info!("using FakeEmbedder");
        return Ok(Box::new(FakeEmbedder::new(MINILM_DIM)));
    }
    let model_dir = resolve_model_dir(config.model_dir.as_deref())?;
    Ok(Box::new(SentenceEmbedder::load(&model_dir, config.max_len)?))
}

fn resolve_model_dir(configured: Option<&str>) -> Result<PathBuf> {
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) {
            let p = PathBuf::from(&dir);
            if p.exists() { tracing::info!(dir = %p.display(), "using {var}"); return Ok(p); }
        }
    }
    if let Some(dir) = configured {
        let p = assessdb_core::config::expand_path(dir);
        if p.exists() { return Ok(p); }
        tracing::warn!(dir = %p.display(), "configured embedding.model_dir does not exist");
    }
    for candidate in ["models/all-MiniLM-L6-v2", "local_model"] {
        let p = Path::new(candidate);
        if p.exists() { tracing::info!(dir = %p.display(), "using model dir"); return Ok(p.to_path_buf()); }
    }
    Err(anyhow!("Could not locate the sentence embedding model directory"))
}
