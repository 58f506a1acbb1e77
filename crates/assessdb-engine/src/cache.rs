use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use assessdb_core::error::Result;
use assessdb_core::types::AssessmentRecord;
use assessdb_index::{FlatIndex, IndexStore};

/// The index/metadata pair as served: read-only and shared across requests.
#[derive(Debug)]
pub struct LoadedIndex {
    pub index: FlatIndex,
    pub records: Vec<AssessmentRecord>,
}

/// Loads the persisted pair on first use and hands out the same `Arc` after
/// that. A failed load is not remembered, so the next request retries.
pub struct IndexCache {
    store: IndexStore,
    slot: RwLock<Option<Arc<LoadedIndex>>>,
    loads: AtomicUsize,
}

impl IndexCache {
    pub fn new(store: IndexStore) -> Self {
        Self { store, slot: RwLock::new(None), loads: AtomicUsize::new(0) }
    }

    /// A cache that starts out holding `loaded`; the store is only read again
    /// after [`IndexCache::invalidate`].
    pub fn preloaded(store: IndexStore, loaded: LoadedIndex) -> Self {
        Self { store, slot: RwLock::new(Some(Arc::new(loaded))), loads: AtomicUsize::new(0) }
    }

    pub fn store(&self) -> &IndexStore { &self.store }

    pub fn get(&self) -> Result<Arc<LoadedIndex>> {
        if let Some(loaded) = self.slot.read().as_ref() {
            return Ok(Arc::clone(loaded));
        }
        let mut slot = self.slot.write();
        if let Some(loaded) = slot.as_ref() {
            return Ok(Arc::clone(loaded));
        }
        let (index, records) = self.store.load()?;
        self.loads.fetch_add(1, Ordering::Relaxed);
        let loaded = Arc::new(LoadedIndex { index, records });
        *slot = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Drop the cached pair; the next `get` reads the artifacts again.
    pub fn invalidate(&self) {
        self.slot.write().take();
        tracing::info!(dir = %self.store.dir().display(), "index cache invalidated");
    }

    /// Successful loads from disk so far.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}
