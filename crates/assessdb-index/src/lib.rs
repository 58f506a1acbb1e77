//! Embedding index: offline build, paired persistence and exact L2 search.
pub mod build;
pub mod flat;
pub mod store;

pub use build::build;
pub use flat::{l2_normalize, squared_l2, FlatIndex, Hit};
pub use store::{IndexStatus, IndexStore, INDEX_FILE, METADATA_FILE};
