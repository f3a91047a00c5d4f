//! Top-level ragrank configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{EmbeddingConfig, IndexConfig, ObservabilityConfig, PipelineConfig, RerankConfig};
use crate::errors::ConfigError;
use crate::models::Metric;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`RAGRANK_*`)
/// 3. Config file (`ragrank.toml`)
/// 4. Compiled defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RagConfig {
    pub embedding: EmbeddingConfig,
    pub index: IndexConfig,
    pub rerank: RerankConfig,
    pub pipeline: PipelineConfig,
    pub observability: ObservabilityConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub artifact_dir: Option<String>,
    pub text_column: Option<String>,
    pub target_dimension: Option<usize>,
    pub n_clusters: Option<usize>,
    pub nprobe: Option<usize>,
    pub rerank_enabled: Option<bool>,
    pub log_level: Option<String>,
}

impl RagConfig {
    /// Parse a TOML string. Missing sections and fields take their defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Load configuration: file (if given and present), then env, then CLI.
    /// The result is validated before it is returned.
    pub fn load(path: Option<&Path>, cli: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) if p.exists() => {
                let content = std::fs::read_to_string(p).map_err(|e| ConfigError::Io {
                    path: p.display().to_string(),
                    message: e.to_string(),
                })?;
                toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                    path: p.display().to_string(),
                    message: e.to_string(),
                })?
            }
            _ => Self::default(),
        };

        Self::apply_env_overrides(&mut config);
        if let Some(cli) = cli {
            Self::apply_cli_overrides(&mut config, cli);
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, message: &str| ConfigError::InvalidValue {
            field: field.to_string(),
            message: message.to_string(),
        };

        if self.index.target_dimension == 0 {
            return Err(invalid("index.target_dimension", "must be > 0"));
        }
        if self.index.n_clusters == Some(0) {
            return Err(invalid("index.n_clusters", "must be > 0"));
        }
        if self.index.nprobe == 0 {
            return Err(invalid("index.nprobe", "must be > 0"));
        }
        if self.index.kmeans_max_iterations == 0 {
            return Err(invalid("index.kmeans_max_iterations", "must be > 0"));
        }
        if !self.index.kmeans_tolerance.is_finite() || self.index.kmeans_tolerance < 0.0 {
            return Err(invalid("index.kmeans_tolerance", "must be a finite value >= 0"));
        }
        if self.embedding.dimensions == 0 {
            return Err(invalid("embedding.dimensions", "must be > 0"));
        }
        if self.embedding.batch_size == 0 {
            return Err(invalid("embedding.batch_size", "must be > 0"));
        }
        if !matches!(self.embedding.provider.as_str(), "onnx" | "remote" | "tfidf") {
            return Err(invalid(
                "embedding.provider",
                "expected one of \"onnx\", \"remote\", \"tfidf\"",
            ));
        }
        if self.rerank.workers == 0 {
            return Err(invalid("rerank.workers", "must be > 0"));
        }
        Ok(())
    }

    /// Apply environment variable overrides.
    /// Pattern: `RAGRANK_INDEX_TARGET_DIMENSION`, `RAGRANK_RERANK_MODEL`, etc.
    fn apply_env_overrides(config: &mut RagConfig) {
        if let Ok(val) = std::env::var("RAGRANK_EMBEDDING_PROVIDER") {
            config.embedding.provider = val;
        }
        if let Ok(val) = std::env::var("RAGRANK_EMBEDDING_MODEL_PATH") {
            config.embedding.model_path = Some(val);
        }
        if let Ok(val) = std::env::var("RAGRANK_EMBEDDING_DIMENSIONS") {
            if let Ok(v) = val.parse::<usize>() {
                config.embedding.dimensions = v;
            }
        }
        if let Ok(val) = std::env::var("RAGRANK_INDEX_TARGET_DIMENSION") {
            if let Ok(v) = val.parse::<usize>() {
                config.index.target_dimension = v;
            }
        }
        if let Ok(val) = std::env::var("RAGRANK_INDEX_N_CLUSTERS") {
            if let Ok(v) = val.parse::<usize>() {
                config.index.n_clusters = Some(v);
            }
        }
        if let Ok(val) = std::env::var("RAGRANK_INDEX_NPROBE") {
            if let Ok(v) = val.parse::<usize>() {
                config.index.nprobe = v;
            }
        }
        if let Ok(val) = std::env::var("RAGRANK_INDEX_METRIC") {
            match val.to_ascii_lowercase().as_str() {
                "l2" => config.index.metric = Metric::L2,
                "inner_product" | "ip" => config.index.metric = Metric::InnerProduct,
                _ => {}
            }
        }
        if let Ok(val) = std::env::var("RAGRANK_RERANK_MODEL") {
            config.rerank.model = val;
        }
        if let Ok(val) = std::env::var("RAGRANK_RERANK_ENDPOINT") {
            config.rerank.endpoint = val;
        }
        if let Ok(val) = std::env::var("RAGRANK_RERANK_WORKERS") {
            if let Ok(v) = val.parse::<usize>() {
                config.rerank.workers = v;
            }
        }
        if let Ok(val) = std::env::var("RAGRANK_RERANK_ENABLED") {
            if let Ok(v) = val.parse::<bool>() {
                config.rerank.enabled = v;
            }
        }
        if let Ok(val) = std::env::var("RAGRANK_ARTIFACT_DIR") {
            config.pipeline.artifact_dir = val;
        }
        if let Ok(val) = std::env::var("RAGRANK_LOG_LEVEL") {
            config.observability.log_level = val;
        }
    }

    /// Apply CLI overrides (highest priority).
    pub fn apply_cli_overrides(config: &mut RagConfig, cli: &CliOverrides) {
        if let Some(ref v) = cli.artifact_dir {
            config.pipeline.artifact_dir = v.clone();
        }
        if let Some(ref v) = cli.text_column {
            config.pipeline.text_column = Some(v.clone());
        }
        if let Some(v) = cli.target_dimension {
            config.index.target_dimension = v;
        }
        if let Some(v) = cli.n_clusters {
            config.index.n_clusters = Some(v);
        }
        if let Some(v) = cli.nprobe {
            config.index.nprobe = v;
        }
        if let Some(v) = cli.rerank_enabled {
            config.rerank.enabled = v;
        }
        if let Some(ref v) = cli.log_level {
            config.observability.log_level = v.clone();
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}
