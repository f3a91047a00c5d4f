use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{IndexId, Metric};

/// Describes one persisted artifact set. Written inside the index file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub format_version: u32,
    pub index_id: IndexId,
    pub created_at: DateTime<Utc>,
    pub document_count: usize,
    pub input_dim: usize,
    pub output_dim: usize,
    pub n_clusters: usize,
    pub metric: Metric,
    /// blake3 of the serialized projection this index was built with.
    pub projection_fingerprint: String,
    /// Provider/model key of the embedder used at build time.
    pub embedder: String,
}
