//! Data model shared across the pipeline.

pub mod candidate;
pub mod degradation_event;
pub mod document;
pub mod index_id;
pub mod manifest;
pub mod metric;
pub mod rescored;

pub use candidate::{Candidate, CandidateSet};
pub use degradation_event::DegradationEvent;
pub use document::Document;
pub use index_id::IndexId;
pub use manifest::ArtifactManifest;
pub use metric::Metric;
pub use rescored::{RelevanceScore, RescoredCandidate, RescoredSet};
