//! L1 embedding cache on `moka`.
//!
//! Keys are blake3 digests of the raw text, so equal texts share an entry
//! regardless of where they appear in a batch. Values are shared slices;
//! a hit costs one copy into the caller's `Vec`.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;

/// blake3 digest of a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextKey([u8; 32]);

impl TextKey {
    pub fn of(text: &str) -> Self {
        Self(*blake3::hash(text.as_bytes()).as_bytes())
    }
}

/// Bounded cache of embeddings from the primary provider.
pub struct L1MemoryCache {
    entries: Cache<TextKey, Arc<[f32]>>,
}

impl L1MemoryCache {
    /// `capacity` is the number of vectors kept. Idle entries expire after an hour.
    pub fn new(capacity: u64) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .time_to_idle(Duration::from_secs(3600))
                .build(),
        }
    }

    pub fn get(&self, key: &TextKey) -> Option<Vec<f32>> {
        self.entries.get(key).map(|v| v.to_vec())
    }

    pub fn insert(&self, key: TextKey, embedding: &[f32]) {
        self.entries.insert(key, Arc::from(embedding));
    }

    /// Approximate; moka applies writes lazily.
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}
