//! Seams between the pipeline and its collaborators.

pub mod cancellation;
pub mod embedding;
pub mod generator;
pub mod oracle;

pub use cancellation::{Cancellable, CancellationToken};
pub use embedding::IEmbeddingProvider;
pub use generator::IAnswerGenerator;
pub use oracle::IRelevanceOracle;
