use serde::{Deserialize, Serialize};

use super::defaults;

/// Orchestrator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding one sub-directory of artifacts per index id.
    pub artifact_dir: String,
    /// CSV column to embed. `None` lets the column selector decide.
    pub text_column: Option<String>,
    /// Only the first N surviving rows are indexed.
    pub max_documents: Option<usize>,
    pub default_top_k: usize,
    /// Loaded artifact sets kept in memory.
    pub index_cache_size: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            artifact_dir: defaults::DEFAULT_ARTIFACT_DIR.to_string(),
            text_column: None,
            max_documents: None,
            default_top_k: defaults::DEFAULT_TOP_K,
            index_cache_size: defaults::DEFAULT_INDEX_CACHE_SIZE,
        }
    }
}
