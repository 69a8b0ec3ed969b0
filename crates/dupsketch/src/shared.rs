//! A similarity index shared between threads.
//!
//! Sketching runs outside the lock; only the check-then-insert step holds
//! it, so two concurrent near-duplicates can never both be inserted.

use crate::config::SimilarityConfig;
use crate::lsh::{IndexStats, SimilarityIndex};
use crate::minhash::MinHasher;
use dupsketch_core::Result;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cloneable handle to one [`SimilarityIndex`] behind an exclusive lock.
#[derive(Clone, Debug)]
pub struct SharedSimilarityIndex {
    hasher: Arc<MinHasher>,
    inner: Arc<Mutex<SimilarityIndex>>,
}

impl SharedSimilarityIndex {
    /// Wrap an existing index.
    #[must_use]
    pub fn new(index: SimilarityIndex) -> Self {
        Self {
            hasher: Arc::new(index.hasher().clone()),
            inner: Arc::new(Mutex::new(index)),
        }
    }

    /// Build a new shared index from a configuration.
    pub fn from_config(config: &SimilarityConfig) -> Result<Self> {
        SimilarityIndex::from_config(config).map(Self::new)
    }

    fn lock(&self) -> MutexGuard<'_, SimilarityIndex> {
        // A poisoned lock still guards a consistent index.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// See [`SimilarityIndex::look_for_similar_documents`].
    pub fn look_for_similar_documents(&self, document: &str) -> bool {
        let sketch = self.hasher.sketch_text(document);
        self.lock().check_and_insert(sketch)
    }

    /// See [`SimilarityIndex::clear_documents`].
    pub fn clear_documents(&self) {
        self.lock().clear_documents();
    }

    /// Get the number of stored documents.
    #[must_use]
    pub fn num_documents(&self) -> usize {
        self.lock().num_documents()
    }

    /// Counters since construction or the last clear.
    #[must_use]
    pub fn stats(&self) -> IndexStats {
        self.lock().stats()
    }
}
