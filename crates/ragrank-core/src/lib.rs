//! # ragrank-core
//!
//! Foundation crate for the ragrank retrieval pipeline.
//! Defines the data model, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::RagConfig;
pub use errors::{RagError, RagResult};
pub use models::{
    Candidate, CandidateSet, Document, IndexId, RelevanceScore, RescoredCandidate, RescoredSet,
};
