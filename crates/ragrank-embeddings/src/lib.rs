//! # ragrank-embeddings
//!
//! Turns text into dense fixed-length vectors.
//! Provider chain (ONNX → remote → TF-IDF), L1 moka cache, and a
//! process-wide registry so each model is loaded once and reused.

pub mod cache;
pub mod degradation;
pub mod engine;
pub mod providers;
pub mod registry;
pub mod vector_ops;

pub use engine::EmbeddingEngine;
pub use registry::ModelRegistry;
