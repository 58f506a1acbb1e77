//! Exact (brute-force) nearest-neighbour index over L2-normalised vectors.

use assessdb_core::error::{Error, Result};
use assessdb_core::types::RecordId;

/// A search hit: the record position and its squared Euclidean distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub id: RecordId,
    pub distance: f32,
}

/// Row-major vector store. Vector `i` belongs to metadata record `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dim: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    pub fn new(dim: usize) -> Self {
        Self { dim, data: Vec::new() }
    }

    pub(crate) fn from_raw(dim: usize, data: Vec<f32>) -> Self {
        debug_assert!(dim > 0 && data.len() % dim == 0);
        Self { dim, data }
    }

    pub fn dim(&self) -> usize { self.dim }

    pub fn len(&self) -> usize {
        if self.dim == 0 { 0 } else { self.data.len() / self.dim }
    }

    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    pub(crate) fn raw(&self) -> &[f32] { &self.data }

    /// Append one vector; its id is the previous `len()`.
    pub fn add(&mut self, vector: &[f32]) -> Result<RecordId> {
        if vector.len() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: vector.len() });
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(Error::IndexCorrupt("vector contains non-finite values".into()));
        }
        let id = self.len();
        self.data.extend_from_slice(vector);
        Ok(id)
    }

    /// The `k` nearest vectors by ascending squared Euclidean distance. Equal
    /// distances keep index-scan order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Hit>> {
        if query.len() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: query.len() });
        }
        if self.dim == 0 { return Ok(Vec::new()); }
        let mut hits: Vec<Hit> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(id, row)| Hit { id, distance: squared_l2(query, row) })
            .collect();
        // sort_by is stable
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);
        Ok(hits)
    }
}

pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Scale to unit length in place; the zero vector is left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in vector.iter_mut() { *x /= norm; }
    }
}
