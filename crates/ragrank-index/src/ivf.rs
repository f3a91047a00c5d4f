//! Inverted-file (IVF) vector index.
//!
//! Vectors are partitioned into `n_clusters` inverted lists by k-means. A
//! query scans only the lists whose centroids are nearest to it: `nprobe`
//! lists up front, then further lists in centroid order while fewer than
//! `min(top_k, len)` candidates have been gathered.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ragrank_core::config::{defaults, IndexConfig};
use ragrank_core::errors::{IndexError, RagResult};
use ragrank_core::models::{CandidateSet, Metric};

use crate::kmeans::{nearest_centroid, KMeans};
use crate::validate_vectors;

/// One stored vector. `row_id` is the document's position in the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IvfEntry {
    pub row_id: usize,
    pub vector: Vec<f32>,
}

/// Build-once, read-many IVF index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IvfIndex {
    dim: usize,
    metric: Metric,
    centroids: Vec<Vec<f32>>,
    lists: Vec<Vec<IvfEntry>>,
    len: usize,
    #[serde(default = "default_nprobe")]
    nprobe: usize,
}

fn default_nprobe() -> usize {
    defaults::DEFAULT_NPROBE
}

impl IvfIndex {
    /// Cluster `vectors` into `n_clusters` lists. Row ids are vector positions.
    ///
    /// # Errors
    /// - `InvalidParameter` when `n_clusters` is zero.
    /// - `InsufficientData { parameter: "n_clusters" }` when there are fewer vectors than clusters.
    /// - `DimensionMismatch` / `NonFiniteInput` for ragged or non-finite input.
    pub fn build(vectors: &[Vec<f32>], n_clusters: usize, config: &IndexConfig) -> RagResult<Self> {
        let result = KMeans::new(n_clusters, config).fit(vectors)?;
        let dim = vectors[0].len();

        // Clustering is Euclidean; storage follows the search metric so a row
        // always lives in the list `route` sends it to.
        let lists_of: Vec<usize> = match config.metric {
            Metric::L2 => result.assignments,
            metric => vectors
                .par_iter()
                .map(|v| nearest_centroid(v, &result.centroids, metric))
                .collect(),
        };
        let mut lists: Vec<Vec<IvfEntry>> = vec![Vec::new(); n_clusters];
        for (row_id, (vector, &list)) in vectors.iter().zip(&lists_of).enumerate() {
            lists[list].push(IvfEntry {
                row_id,
                vector: vector.clone(),
            });
        }

        let index = Self {
            dim,
            metric: config.metric,
            centroids: result.centroids,
            lists,
            len: vectors.len(),
            nprobe: config.nprobe.max(1),
        };
        info!(
            vectors = index.len,
            dim,
            n_clusters,
            metric = index.metric.as_str(),
            largest_list = index.list_sizes().into_iter().max().unwrap_or(0),
            "IVF index built"
        );
        Ok(index)
    }

    /// Top-`top_k` nearest rows to `query`, ascending distance, ties by row id.
    ///
    /// Returns `min(top_k, len)` candidates; an empty set when `top_k == 0`
    /// or the index is empty.
    pub fn search(&self, query: &[f32], top_k: usize) -> RagResult<CandidateSet> {
        self.search_with_nprobe(query, top_k, self.nprobe)
    }

    /// Like `search`, probing at least `nprobe` lists.
    pub fn search_with_nprobe(&self, query: &[f32], top_k: usize, nprobe: usize) -> RagResult<CandidateSet> {
        if query.len() != self.dim {
            return Err(IndexError::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            }
            .into());
        }
        if query.iter().any(|x| !x.is_finite()) {
            return Err(IndexError::NonFiniteInput { row: 0 }.into());
        }

        let wanted = top_k.min(self.len);
        if wanted == 0 {
            return Ok(CandidateSet::empty());
        }

        let mut order: Vec<(usize, f32)> = self
            .centroids
            .iter()
            .enumerate()
            .map(|(i, c)| (i, self.metric.distance(query, c)))
            .collect();
        order.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

        let mut hits: Vec<(usize, f32)> = Vec::with_capacity(wanted);
        let mut probed = 0;
        for (list, _) in &order {
            if probed >= nprobe.max(1) && hits.len() >= wanted {
                break;
            }
            hits.extend(
                self.lists[*list]
                    .iter()
                    .map(|e| (e.row_id, self.metric.distance(query, &e.vector))),
            );
            probed += 1;
        }

        debug!(top_k, probed, scanned = hits.len(), "IVF search");
        Ok(CandidateSet::from_hits(hits, wanted))
    }

    /// Inverted list a vector would be routed to.
    pub fn route(&self, vector: &[f32]) -> usize {
        nearest_centroid(vector, &self.centroids, self.metric)
    }

    /// Check internal consistency after deserialization.
    pub fn validate(&self) -> RagResult<()> {
        if self.centroids.len() != self.lists.len() {
            return Err(IndexError::InvalidParameter {
                parameter: "n_clusters",
                reason: format!(
                    "{} centroids but {} inverted lists",
                    self.centroids.len(),
                    self.lists.len()
                ),
            }
            .into());
        }
        validate_vectors(&self.centroids, self.dim)?;

        let mut seen = vec![false; self.len];
        for entry in self.lists.iter().flatten() {
            if entry.vector.len() != self.dim {
                return Err(IndexError::DimensionMismatch {
                    expected: self.dim,
                    actual: entry.vector.len(),
                }
                .into());
            }
            match seen.get_mut(entry.row_id) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(IndexError::InvalidParameter {
                        parameter: "row_id",
                        reason: format!("row {} is duplicated or out of range", entry.row_id),
                    }
                    .into())
                }
            }
        }
        if seen.iter().any(|s| !s) {
            return Err(IndexError::InvalidParameter {
                parameter: "row_id",
                reason: "inverted lists do not cover every row".to_string(),
            }
            .into());
        }
        Ok(())
    }

    pub fn nprobe(&self) -> usize {
        self.nprobe
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn n_clusters(&self) -> usize {
        self.centroids.len()
    }

    pub fn centroids(&self) -> &[Vec<f32>] {
        &self.centroids
    }

    pub fn list_sizes(&self) -> Vec<usize> {
        self.lists.iter().map(|l| l.len()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragrank_core::RagError;

    fn grid(n: usize) -> Vec<Vec<f32>> {
        (0..n)
            .map(|i| vec![(i % 10) as f32, (i / 10) as f32])
            .collect()
    }

    fn config() -> IndexConfig {
        IndexConfig {
            kmeans_max_iterations: 50,
            ..IndexConfig::default()
        }
    }

    fn brute_force(vectors: &[Vec<f32>], query: &[f32], k: usize, metric: Metric) -> Vec<usize> {
        let hits = vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, metric.distance(query, v)))
            .collect();
        CandidateSet::from_hits(hits, k).row_ids()
    }

    #[test]
    fn each_row_lands_in_exactly_one_list() {
        let index = IvfIndex::build(&grid(100), 7, &config()).unwrap();
        assert_eq!(index.list_sizes().iter().sum::<usize>(), 100);
        index.validate().unwrap();
    }

    #[test]
    fn exact_match_is_first() {
        let data = grid(100);
        let index = IvfIndex::build(&data, 5, &config()).unwrap();
        for row in [0, 37, 99] {
            let hits = index.search(&data[row], 3).unwrap();
            assert_eq!(hits.get(0).unwrap().row_id, row);
            assert_eq!(hits.get(0).unwrap().distance, 0.0);
        }
    }

    #[test]
    fn returns_min_of_top_k_and_len() {
        let data = grid(12);
        let index = IvfIndex::build(&data, 4, &config()).unwrap();
        assert_eq!(index.search(&[0.0, 0.0], 50).unwrap().len(), 12);
        assert_eq!(index.search(&[0.0, 0.0], 5).unwrap().len(), 5);
    }

    #[test]
    fn widening_finds_enough_candidates() {
        // One probe cannot hold 40 rows when lists average 10.
        let data = grid(100);
        let index = IvfIndex::build(&data, 10, &config()).unwrap();
        let hits = index.search(&[4.5, 4.5], 40).unwrap();
        assert_eq!(hits.len(), 40);
    }

    #[test]
    fn full_probe_matches_brute_force() {
        let data = grid(100);
        let index = IvfIndex::build(&data, 8, &config()).unwrap();
        let query = [3.3, 6.1];
        let hits = index.search_with_nprobe(&query, 10, 8).unwrap();
        assert_eq!(hits.row_ids(), brute_force(&data, &query, 10, Metric::L2));
    }

    #[test]
    fn results_sorted_and_ranked() {
        let data = grid(100);
        let index = IvfIndex::build(&data, 6, &config()).unwrap();
        let hits = index.search(&[2.0, 2.0], 15).unwrap();
        for (i, pair) in hits.as_slice().windows(2).enumerate() {
            assert!(pair[0].distance <= pair[1].distance);
            if pair[0].distance == pair[1].distance {
                assert!(pair[0].row_id < pair[1].row_id);
            }
            assert_eq!(pair[0].rank, i);
        }
    }

    #[test]
    fn top_k_zero_is_empty() {
        let index = IvfIndex::build(&grid(20), 2, &config()).unwrap();
        assert!(index.search(&[1.0, 1.0], 0).unwrap().is_empty());
    }

    #[test]
    fn query_dimension_mismatch_is_error() {
        let index = IvfIndex::build(&grid(20), 2, &config()).unwrap();
        assert!(matches!(
            index.search(&[1.0, 1.0, 1.0], 3).unwrap_err(),
            RagError::IndexError(IndexError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn inner_product_prefers_aligned_vectors() {
        let data = vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![-1.0, 0.0],
            vec![0.7, 0.7],
        ];
        let cfg = IndexConfig {
            metric: Metric::InnerProduct,
            ..config()
        };
        let index = IvfIndex::build(&data, 1, &cfg).unwrap();
        let hits = index.search(&[1.0, 0.1], 4).unwrap();
        assert_eq!(hits.get(0).unwrap().row_id, 0);
        assert_eq!(hits.get(3).unwrap().row_id, 2);
        assert!(hits.get(0).unwrap().distance < 0.0);
    }

    #[test]
    fn rows_are_stored_where_route_sends_them() {
        // Varying norms make inner-product and Euclidean routing disagree.
        let data: Vec<Vec<f32>> = (0..40)
            .map(|i| {
                let angle = i as f32 * 0.37;
                let norm = 0.5 + (i % 7) as f32;
                vec![norm * angle.cos(), norm * angle.sin()]
            })
            .collect();
        for metric in [Metric::L2, Metric::InnerProduct] {
            let cfg = IndexConfig { metric, ..config() };
            let index = IvfIndex::build(&data, 4, &cfg).unwrap();
            for (list, entries) in index.lists.iter().enumerate() {
                for entry in entries {
                    assert_eq!(index.route(&entry.vector), list, "{metric:?} row {}", entry.row_id);
                }
            }
            index.validate().unwrap();
        }
    }

    #[test]
    fn duplicate_vectors_tie_break_by_row_id() {
        let data = vec![vec![1.0, 1.0]; 6];
        let index = IvfIndex::build(&data, 2, &config()).unwrap();
        let hits = index.search(&[1.0, 1.0], 4).unwrap();
        assert_eq!(hits.row_ids(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn too_many_clusters_is_insufficient_data() {
        let err = IvfIndex::build(&grid(3), 4, &config()).unwrap_err();
        assert!(err.is_insufficient_data());
    }
}
