//! Configuration system for ragrank.
//! TOML-based, layered: CLI > env > file > defaults.

pub mod defaults;
pub mod embedding_config;
pub mod index_config;
pub mod observability_config;
pub mod pipeline_config;
pub mod ragrank_config;
pub mod rerank_config;

pub use embedding_config::EmbeddingConfig;
pub use index_config::IndexConfig;
pub use observability_config::ObservabilityConfig;
pub use pipeline_config::PipelineConfig;
pub use ragrank_config::{CliOverrides, RagConfig};
pub use rerank_config::RerankConfig;
