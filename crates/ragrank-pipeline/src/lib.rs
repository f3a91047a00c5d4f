//! # ragrank-pipeline
//!
//! Orchestrates corpus loading, index builds and query answering on top of
//! the embedding, index and rerank crates.

pub mod corpus;
pub mod models;
pub mod observability;
pub mod pipeline;

pub use corpus::{ColumnSelector, KeywordColumnSelector};
pub use models::{QueryAnswer, RankedDocument};
pub use pipeline::{generation_prompt, LoadedIndex, Pipeline};
