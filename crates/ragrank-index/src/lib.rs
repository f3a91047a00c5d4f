//! # ragrank-index
//!
//! Reduces embeddings with PCA, clusters them with seeded k-means and serves
//! approximate nearest-neighbour search from an inverted-file (IVF) index.
//! Artifact sets (index, projection, documents) are persisted and verified
//! together.

pub mod ivf;
pub mod kmeans;
pub mod persistence;
pub mod projection;

pub use ivf::IvfIndex;
pub use kmeans::{KMeans, KMeansResult};
pub use persistence::IndexArtifacts;
pub use projection::{PcaParams, ProjectionModel};

use ragrank_core::errors::{IndexError, RagResult};

/// Check that every vector has `dim` finite components.
pub(crate) fn validate_vectors(vectors: &[Vec<f32>], dim: usize) -> RagResult<()> {
    for (row, v) in vectors.iter().enumerate() {
        if v.len() != dim {
            return Err(IndexError::DimensionMismatch {
                expected: dim,
                actual: v.len(),
            }
            .into());
        }
        if v.iter().any(|x| !x.is_finite()) {
            return Err(IndexError::NonFiniteInput { row }.into());
        }
    }
    Ok(())
}
