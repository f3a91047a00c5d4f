use serde::{Deserialize, Serialize};

use super::defaults;

/// Embedding subsystem configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Primary provider: `"onnx"`, `"remote"` or `"tfidf"`.
    pub provider: String,
    /// Path to the ONNX model file (onnx provider only).
    pub model_path: Option<String>,
    /// Model name sent to the remote provider, and recorded in manifests.
    pub model_name: String,
    /// Embeddings endpoint (remote provider only).
    pub endpoint: String,
    /// Native embedding dimensions.
    pub dimensions: usize,
    /// Documents embedded per batch; cancellation is checked between batches.
    pub batch_size: usize,
    /// Max entries in the in-memory embedding cache.
    pub l1_cache_size: u64,
    /// Remote request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: defaults::DEFAULT_EMBEDDING_PROVIDER.to_string(),
            model_path: None,
            model_name: defaults::DEFAULT_EMBEDDING_MODEL.to_string(),
            endpoint: defaults::DEFAULT_EMBEDDING_ENDPOINT.to_string(),
            dimensions: defaults::DEFAULT_EMBEDDING_DIMENSIONS,
            batch_size: defaults::DEFAULT_EMBEDDING_BATCH_SIZE,
            l1_cache_size: defaults::DEFAULT_L1_CACHE_SIZE,
            timeout_secs: defaults::DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl EmbeddingConfig {
    /// Identity of the model a provider built from this config would load.
    /// Two configs with the same key share one loaded model.
    pub fn model_key(&self) -> String {
        match self.provider.as_str() {
            "onnx" => format!(
                "onnx:{}:{}",
                self.model_path.as_deref().unwrap_or(""),
                self.dimensions
            ),
            "remote" => format!("remote:{}:{}:{}", self.endpoint, self.model_name, self.dimensions),
            other => format!("{other}:{}", self.dimensions),
        }
    }
}
