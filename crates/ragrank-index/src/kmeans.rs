//! Seeded k-means clustering (k-means++ initialisation + Lloyd iterations).
//!
//! Clustering always runs in squared Euclidean space. Given the same vectors
//! and seed the result is bit-for-bit reproducible: the assignment step is
//! parallel but every point is assigned independently, and all reductions
//! run sequentially in point order.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use ragrank_core::config::IndexConfig;
use ragrank_core::errors::{IndexError, RagResult};
use ragrank_core::models::Metric;

use crate::validate_vectors;

/// k-means parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeans {
    pub n_clusters: usize,
    pub max_iterations: usize,
    /// Stop once no centroid moves further than this (Euclidean).
    pub tolerance: f32,
    pub seed: u64,
}

/// Output of `KMeans::fit`.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansResult {
    pub centroids: Vec<Vec<f32>>,
    /// Nearest-centroid index for every input vector.
    pub assignments: Vec<usize>,
    pub iterations: usize,
    pub converged: bool,
    /// Within-cluster sum of squared distances.
    pub inertia: f64,
}

impl KMeansResult {
    /// Number of vectors assigned to each cluster.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centroids.len()];
        for &a in &self.assignments {
            sizes[a] += 1;
        }
        sizes
    }
}

impl KMeans {
    pub fn new(n_clusters: usize, config: &IndexConfig) -> Self {
        Self {
            n_clusters,
            max_iterations: config.kmeans_max_iterations,
            tolerance: config.kmeans_tolerance,
            seed: config.seed,
        }
    }

    /// Cluster `vectors`.
    ///
    /// # Errors
    /// - `InvalidParameter` when `n_clusters` is zero.
    /// - `InsufficientData` when there are fewer vectors than clusters.
    pub fn fit(&self, vectors: &[Vec<f32>]) -> RagResult<KMeansResult> {
        let k = self.n_clusters;
        if k == 0 {
            return Err(IndexError::InvalidParameter {
                parameter: "n_clusters",
                reason: "must be > 0".to_string(),
            }
            .into());
        }
        if vectors.len() < k {
            return Err(IndexError::InsufficientData {
                parameter: "n_clusters",
                required: k,
                available: vectors.len(),
            }
            .into());
        }
        let dim = vectors[0].len();
        validate_vectors(vectors, dim)?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centroids = plus_plus_init(vectors, k, &mut rng);
        let mut assignments = assign(vectors, &centroids);
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            iterations += 1;
            let mut updated = recompute_centroids(vectors, &assignments, &centroids);
            reseed_empty(vectors, &mut assignments, &mut updated);

            let shift = centroids
                .iter()
                .zip(&updated)
                .map(|(a, b)| Metric::L2.distance(a, b).sqrt())
                .fold(0.0f32, f32::max);
            centroids = updated;
            assignments = assign(vectors, &centroids);

            if shift <= self.tolerance {
                converged = true;
                break;
            }
        }

        let inertia = assignments
            .iter()
            .zip(vectors)
            .map(|(&c, v)| Metric::L2.distance(v, &centroids[c]) as f64)
            .sum();

        debug!(
            k,
            n = vectors.len(),
            iterations,
            converged,
            inertia,
            "k-means finished"
        );

        Ok(KMeansResult {
            centroids,
            assignments,
            iterations,
            converged,
            inertia,
        })
    }
}

/// k-means++: the first centre uniformly, the rest with probability
/// proportional to the squared distance to the nearest chosen centre.
fn plus_plus_init(vectors: &[Vec<f32>], k: usize, rng: &mut StdRng) -> Vec<Vec<f32>> {
    let n = vectors.len();
    let mut chosen = Vec::with_capacity(k);
    chosen.push(rng.gen_range(0..n));

    let mut nearest = vec![f64::INFINITY; n];
    while chosen.len() < k {
        let last = &vectors[chosen[chosen.len() - 1]];
        for (d, v) in nearest.iter_mut().zip(vectors) {
            *d = d.min(Metric::L2.distance(v, last) as f64);
        }

        let total: f64 = nearest.iter().sum();
        let next = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            let mut pick = nearest.iter().rposition(|&d| d > 0.0).unwrap_or(n - 1);
            for (i, &d) in nearest.iter().enumerate() {
                if d > 0.0 && target < d {
                    pick = i;
                    break;
                }
                target -= d;
            }
            pick
        } else {
            // Every point coincides with a centre: take the first unused index.
            (0..n).find(|i| !chosen.contains(i)).unwrap_or(0)
        };
        chosen.push(next);
    }

    chosen.into_iter().map(|i| vectors[i].clone()).collect()
}

/// Index of the nearest centroid for every vector. Ties go to the lower index.
pub(crate) fn assign(vectors: &[Vec<f32>], centroids: &[Vec<f32>]) -> Vec<usize> {
    vectors
        .par_iter()
        .map(|v| nearest_centroid(v, centroids, Metric::L2))
        .collect()
}

pub(crate) fn nearest_centroid(v: &[f32], centroids: &[Vec<f32>], metric: Metric) -> usize {
    let mut best = 0;
    let mut best_dist = f32::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = metric.distance(v, c);
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Mean of each cluster. Empty clusters keep their previous centroid here and
/// are handled by `reseed_empty`.
fn recompute_centroids(vectors: &[Vec<f32>], assignments: &[usize], previous: &[Vec<f32>]) -> Vec<Vec<f32>> {
    let dim = previous.first().map(|c| c.len()).unwrap_or(0);
    let mut sums = vec![vec![0.0f64; dim]; previous.len()];
    let mut counts = vec![0usize; previous.len()];
    for (v, &c) in vectors.iter().zip(assignments) {
        counts[c] += 1;
        for (s, x) in sums[c].iter_mut().zip(v) {
            *s += *x as f64;
        }
    }
    sums.into_iter()
        .zip(counts)
        .zip(previous)
        .map(|((sum, count), prev)| {
            if count == 0 {
                prev.clone()
            } else {
                sum.into_iter().map(|s| (s / count as f64) as f32).collect()
            }
        })
        .collect()
}

/// Give every empty cluster the point farthest from the centre of the
/// currently largest cluster.
fn reseed_empty(vectors: &[Vec<f32>], assignments: &mut [usize], centroids: &mut [Vec<f32>]) {
    loop {
        let mut sizes = vec![0usize; centroids.len()];
        for &a in assignments.iter() {
            sizes[a] += 1;
        }
        let Some(empty) = sizes.iter().position(|&s| s == 0) else {
            return;
        };
        let largest = sizes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
            .map(|(i, _)| i)
            .unwrap_or(0);
        if sizes[largest] < 2 {
            return;
        }

        let mut far = None;
        let mut far_dist = f32::NEG_INFINITY;
        for (i, v) in vectors.iter().enumerate() {
            if assignments[i] != largest {
                continue;
            }
            let d = Metric::L2.distance(v, &centroids[largest]);
            if d > far_dist {
                far_dist = d;
                far = Some(i);
            }
        }
        let Some(far) = far else {
            return;
        };
        centroids[empty] = vectors[far].clone();
        assignments[far] = empty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragrank_core::RagError;

    fn params(k: usize) -> KMeans {
        KMeans {
            n_clusters: k,
            max_iterations: 50,
            tolerance: 1e-6,
            seed: 42,
        }
    }

    /// Three tight blobs around distinct centres.
    fn blobs() -> Vec<Vec<f32>> {
        let centres = [[0.0f32, 0.0], [10.0, 10.0], [-10.0, 10.0]];
        let mut out = Vec::new();
        for c in &centres {
            for i in 0..10 {
                let jitter = (i as f32 - 4.5) * 0.05;
                out.push(vec![c[0] + jitter, c[1] - jitter]);
            }
        }
        out
    }

    #[test]
    fn zero_clusters_is_invalid() {
        let err = params(0).fit(&blobs()).unwrap_err();
        assert!(matches!(
            err,
            RagError::IndexError(IndexError::InvalidParameter {
                parameter: "n_clusters",
                ..
            })
        ));
    }

    #[test]
    fn fewer_vectors_than_clusters_names_n_clusters() {
        let err = params(5).fit(&blobs()[..3]).unwrap_err();
        match err {
            RagError::IndexError(IndexError::InsufficientData {
                parameter,
                required,
                available,
            }) => {
                assert_eq!(parameter, "n_clusters");
                assert_eq!((required, available), (5, 3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn separates_well_spaced_blobs() {
        let data = blobs();
        let result = params(3).fit(&data).unwrap();
        assert!(result.converged);
        assert_eq!(result.cluster_sizes().iter().filter(|&&s| s == 10).count(), 3);
        for blob in data.chunks(10) {
            let first = nearest_centroid(&blob[0], &result.centroids, Metric::L2);
            for v in blob {
                assert_eq!(nearest_centroid(v, &result.centroids, Metric::L2), first);
            }
        }
    }

    #[test]
    fn same_seed_same_result() {
        let data = blobs();
        assert_eq!(params(4).fit(&data).unwrap(), params(4).fit(&data).unwrap());
    }

    #[test]
    fn every_vector_has_exactly_one_nearest_assignment() {
        let data = blobs();
        let result = params(6).fit(&data).unwrap();
        assert_eq!(result.assignments.len(), data.len());
        for (v, &a) in data.iter().zip(&result.assignments) {
            assert_eq!(a, nearest_centroid(v, &result.centroids, Metric::L2));
        }
    }

    #[test]
    fn identical_points_do_not_panic() {
        let data = vec![vec![1.0f32, 1.0]; 8];
        let result = params(3).fit(&data).unwrap();
        assert_eq!(result.centroids.len(), 3);
        assert_eq!(result.assignments.len(), 8);
        assert!(result.inertia.abs() < 1e-9);
    }

    #[test]
    fn k_equal_to_n_puts_one_point_per_cluster() {
        let data = blobs();
        let result = params(data.len()).fit(&data).unwrap();
        assert!(result.cluster_sizes().iter().all(|&s| s == 1));
    }
}
