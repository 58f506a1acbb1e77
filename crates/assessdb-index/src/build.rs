//! Offline rebuild: embed every catalog record and assemble the flat index.
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use assessdb_core::catalog::embedding_text;
use assessdb_core::traits::Embedder;
use assessdb_core::types::AssessmentRecord;

use crate::flat::{l2_normalize, FlatIndex};

/// Embed `records` in batches and return the index together with the
/// metadata sequence in the same positional order.
pub fn build(records: Vec<AssessmentRecord>, embedder: &dyn Embedder, batch_size: usize) -> Result<(FlatIndex, Vec<AssessmentRecord>)> {
    let mut index = FlatIndex::new(embedder.dim());
    if records.is_empty() { tracing::warn!("no records to index"); return Ok((index, records)); }

    tracing::info!(records = records.len(), dim = embedder.dim(), "embedding catalog");
    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} records ({percent}%) {msg}")?.progress_chars("#>-"));

    let texts: Vec<String> = records.iter().map(embedding_text).collect();
    for batch in texts.chunks(batch_size.max(1)) {
        let embeddings = embedder.embed_batch(batch)?;
        anyhow::ensure!(embeddings.len() == batch.len(), "embedder returned {} vectors for {} texts", embeddings.len(), batch.len());
        for mut vector in embeddings {
            l2_normalize(&mut vector);
            index.add(&vector)?;
        }
        pb.inc(batch.len() as u64);
    }
    pb.finish_with_message("done");

    anyhow::ensure!(index.len() == records.len(), "index/metadata length mismatch after build");
    Ok((index, records))
}
