use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("index artifact not found at {}", path.display())]
    IndexNotFound { path: PathBuf },

    #[error("index artifacts are corrupt or mismatched: {0}")]
    IndexCorrupt(String),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedding model unavailable: {0}")]
    EmbeddingModelUnavailable(String),

    #[error("{call} call to external service failed: {message}")]
    ExternalService { call: &'static str, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for the failures that mean the persisted index pair cannot be served.
    pub fn is_index_unavailable(&self) -> bool {
        matches!(self, Self::IndexNotFound { .. } | Self::IndexCorrupt(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
