//! In-memory embedding cache keyed by text digest.

pub mod l1_memory;

pub use l1_memory::{L1MemoryCache, TextKey};
