use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::Metric;

/// Projection and IVF index configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Working dimension after PCA.
    pub target_dimension: usize,
    /// Inverted lists. `None` picks a size from the corpus (see `effective_n_clusters`).
    pub n_clusters: Option<usize>,
    /// Lists probed per query before widening.
    pub nprobe: usize,
    pub metric: Metric,
    pub kmeans_max_iterations: usize,
    /// Stop k-means when no centroid moves further than this.
    pub kmeans_tolerance: f32,
    pub pca_max_iterations: usize,
    pub pca_tolerance: f64,
    /// Seed for k-means++ initialisation.
    pub seed: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            target_dimension: defaults::DEFAULT_TARGET_DIMENSION,
            n_clusters: None,
            nprobe: defaults::DEFAULT_NPROBE,
            metric: Metric::L2,
            kmeans_max_iterations: defaults::DEFAULT_KMEANS_MAX_ITERATIONS,
            kmeans_tolerance: defaults::DEFAULT_KMEANS_TOLERANCE,
            pca_max_iterations: defaults::DEFAULT_PCA_MAX_ITERATIONS,
            pca_tolerance: defaults::DEFAULT_PCA_TOLERANCE,
            seed: defaults::DEFAULT_SEED,
        }
    }
}

impl IndexConfig {
    /// Cluster count for a corpus of `n_vectors`.
    ///
    /// Explicit config wins. Otherwise aim for a few dozen vectors per list,
    /// capped at `MAX_DEFAULT_CLUSTERS`.
    pub fn effective_n_clusters(&self, n_vectors: usize) -> usize {
        self.n_clusters.unwrap_or_else(|| default_n_clusters(n_vectors))
    }
}

/// Default cluster count: `N / VECTORS_PER_CLUSTER`, clamped to `[1, MAX_DEFAULT_CLUSTERS]`.
pub fn default_n_clusters(n_vectors: usize) -> usize {
    (n_vectors / crate::constants::VECTORS_PER_CLUSTER).clamp(1, crate::constants::MAX_DEFAULT_CLUSTERS)
}
