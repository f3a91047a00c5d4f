//! PCA dimensionality reduction.
//!
//! The covariance matrix of the mean-centred training vectors is reduced to
//! its dominant subspace by block power iteration, orthonormalised with
//! modified Gram–Schmidt after every step. A Rayleigh–Ritz pass (Jacobi on the
//! small projected matrix) then rotates that basis onto the individual
//! principal axes, ordered by explained variance.
//!
//! Rank-deficient data does not shrink the output: a direction that collapses
//! is replaced by the standard basis vector with the largest component
//! outside the span already kept, so a model always has exactly
//! `output_dim` orthonormal rows.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use ragrank_core::config::{defaults, IndexConfig};
use ragrank_core::errors::{ArtifactError, IndexError, RagResult};

use crate::validate_vectors;

/// Relative norm below which an orthogonalised column counts as collapsed.
const DEGENERATE_EPS: f64 = 1e-10;
const JACOBI_MAX_SWEEPS: usize = 64;

/// Iteration controls for `ProjectionModel::fit`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PcaParams {
    pub max_iterations: usize,
    /// Relative change of the captured variance that counts as converged.
    pub tolerance: f64,
    /// Seed for the starting basis.
    pub seed: u64,
}

impl Default for PcaParams {
    fn default() -> Self {
        Self {
            max_iterations: defaults::DEFAULT_PCA_MAX_ITERATIONS,
            tolerance: defaults::DEFAULT_PCA_TOLERANCE,
            seed: defaults::DEFAULT_SEED,
        }
    }
}

impl From<&IndexConfig> for PcaParams {
    fn from(config: &IndexConfig) -> Self {
        Self {
            max_iterations: config.pca_max_iterations,
            tolerance: config.pca_tolerance,
            seed: config.seed,
        }
    }
}

/// A fitted linear projection `x -> components · (x - mean)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionModel {
    pub input_dim: usize,
    pub output_dim: usize,
    pub mean: Vec<f32>,
    /// Row-major `output_dim × input_dim`. Rows are orthonormal.
    pub components: Vec<Vec<f32>>,
    /// Variance captured by each component, descending.
    pub explained_variance: Vec<f64>,
}

impl ProjectionModel {
    /// Fit a projection onto the top `target_dimension` principal components.
    ///
    /// # Errors
    /// - `InsufficientData` when there are fewer vectors than `target_dimension`.
    /// - `InvalidParameter` when `target_dimension` is zero or exceeds the input dimension.
    /// - `DimensionMismatch` / `NonFiniteInput` for ragged or non-finite input.
    pub fn fit(vectors: &[Vec<f32>], target_dimension: usize, params: &PcaParams) -> RagResult<Self> {
        if target_dimension == 0 {
            return Err(IndexError::InvalidParameter {
                parameter: "target_dimension",
                reason: "must be > 0".to_string(),
            }
            .into());
        }
        if vectors.len() < target_dimension {
            return Err(IndexError::InsufficientData {
                parameter: "target_dimension",
                required: target_dimension,
                available: vectors.len(),
            }
            .into());
        }

        let input_dim = vectors[0].len();
        validate_vectors(vectors, input_dim)?;
        if target_dimension > input_dim {
            return Err(IndexError::InvalidParameter {
                parameter: "target_dimension",
                reason: format!("{target_dimension} exceeds input dimension {input_dim}"),
            }
            .into());
        }

        let n = vectors.len();
        let mean: Vec<f64> = (0..input_dim)
            .map(|i| vectors.iter().map(|v| v[i] as f64).sum::<f64>() / n as f64)
            .collect();
        let mean_f32: Vec<f32> = mean.iter().map(|&m| m as f32).collect();

        // Column-major centred data: one row per input dimension.
        let columns: Vec<Vec<f64>> = (0..input_dim)
            .into_par_iter()
            .map(|i| vectors.iter().map(|v| (v[i] - mean_f32[i]) as f64).collect())
            .collect();
        let cov = covariance(&columns, (n.max(2) - 1) as f64);

        let (basis, iterations, converged) = dominant_subspace(&cov, target_dimension, params);
        if !converged {
            warn!(
                iterations,
                target_dimension, "PCA power iteration did not converge, using best basis"
            );
        }

        let (variances, axes) = rayleigh_ritz(&cov, &basis);
        let components: Vec<Vec<f32>> = axes
            .into_iter()
            .map(|mut axis| {
                normalize_sign(&mut axis);
                axis.into_iter().map(|x| x as f32).collect()
            })
            .collect();

        debug!(
            n,
            input_dim,
            output_dim = target_dimension,
            iterations,
            top_variance = variances.first().copied().unwrap_or(0.0),
            "PCA fitted"
        );

        Ok(Self {
            input_dim,
            output_dim: target_dimension,
            mean: mean_f32,
            components,
            explained_variance: variances,
        })
    }

    /// Project a batch of vectors. Pure and deterministic.
    pub fn apply(&self, vectors: &[Vec<f32>]) -> RagResult<Vec<Vec<f32>>> {
        vectors.par_iter().map(|v| self.apply_one(v)).collect()
    }

    /// Project a single vector.
    pub fn apply_one(&self, vector: &[f32]) -> RagResult<Vec<f32>> {
        if vector.len() != self.input_dim {
            return Err(IndexError::DimensionMismatch {
                expected: self.input_dim,
                actual: vector.len(),
            }
            .into());
        }
        let centred: Vec<f64> = vector
            .iter()
            .zip(&self.mean)
            .map(|(x, m)| (x - m) as f64)
            .collect();
        Ok(self
            .components
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&centred)
                    .map(|(c, x)| *c as f64 * x)
                    .sum::<f64>() as f32
            })
            .collect())
    }

    /// Check that the stored shapes agree with the declared dimensions.
    pub fn validate_shape(&self) -> RagResult<()> {
        let mismatch = |expected: usize, actual: usize| -> RagResult<()> {
            Err(IndexError::DimensionMismatch { expected, actual }.into())
        };
        if self.mean.len() != self.input_dim {
            return mismatch(self.input_dim, self.mean.len());
        }
        if self.components.len() != self.output_dim {
            return mismatch(self.output_dim, self.components.len());
        }
        if let Some(row) = self.components.iter().find(|r| r.len() != self.input_dim) {
            return mismatch(self.input_dim, row.len());
        }
        Ok(())
    }

    /// blake3 hex digest of the serialized model.
    pub fn fingerprint(&self) -> RagResult<String> {
        let bytes = serde_json::to_vec(self).map_err(|e| ArtifactError::Serialization {
            path: "<projection>".to_string(),
            reason: e.to_string(),
        })?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}

fn dot64(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn norm64(a: &[f64]) -> f64 {
    dot64(a, a).sqrt()
}

fn mat_vec(m: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    m.iter().map(|row| dot64(row, v)).collect()
}

/// Sample covariance from column-major centred data.
fn covariance(columns: &[Vec<f64>], denom: f64) -> Vec<Vec<f64>> {
    let d = columns.len();
    let upper: Vec<Vec<f64>> = (0..d)
        .into_par_iter()
        .map(|i| {
            (i..d)
                .map(|j| dot64(&columns[i], &columns[j]) / denom)
                .collect()
        })
        .collect();

    let mut cov = vec![vec![0.0; d]; d];
    for (i, row) in upper.into_iter().enumerate() {
        for (offset, value) in row.into_iter().enumerate() {
            let j = i + offset;
            cov[i][j] = value;
            cov[j][i] = value;
        }
    }
    cov
}

/// Block power iteration. Returns `k` orthonormal columns spanning the
/// dominant subspace, the iteration count and whether it converged.
fn dominant_subspace(cov: &[Vec<f64>], k: usize, params: &PcaParams) -> (Vec<Vec<f64>>, usize, bool) {
    let d = cov.len();
    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut basis: Vec<Vec<f64>> = (0..k)
        .map(|_| (0..d).map(|_| rng.gen::<f64>() - 0.5).collect())
        .collect();
    orthonormalize(&mut basis);

    let mut previous = f64::NAN;
    for iteration in 1..=params.max_iterations {
        let mut next: Vec<Vec<f64>> = basis.par_iter().map(|col| mat_vec(cov, col)).collect();
        // Variance captured by the current basis.
        let captured: f64 = basis.iter().zip(&next).map(|(q, z)| dot64(q, z)).sum();
        orthonormalize(&mut next);
        basis = next;

        if previous.is_finite()
            && (captured - previous).abs() <= params.tolerance * captured.abs().max(f64::MIN_POSITIVE)
        {
            return (basis, iteration, true);
        }
        previous = captured;
    }
    (basis, params.max_iterations, params.max_iterations == 0)
}

/// Modified Gram–Schmidt in place. Collapsed columns are replaced by a
/// deterministic basis direction orthogonal to the columns before them.
fn orthonormalize(columns: &mut [Vec<f64>]) {
    let scale = columns.iter().map(|c| norm64(c)).fold(0.0, f64::max);
    let threshold = DEGENERATE_EPS * scale;

    for j in 0..columns.len() {
        let (kept, rest) = columns.split_at_mut(j);
        let column = &mut rest[0];
        // Two passes keep the result orthogonal to working precision.
        for _ in 0..2 {
            for q in kept.iter() {
                let p = dot64(q, column);
                column.iter_mut().zip(q).for_each(|(c, qi)| *c -= p * qi);
            }
        }
        let norm = norm64(column);
        if norm > threshold && norm > 0.0 {
            column.iter_mut().for_each(|c| *c /= norm);
        } else {
            *column = replacement_direction(kept, column.len());
        }
    }
}

/// The standard basis vector least covered by `kept`, orthogonalised against it.
fn replacement_direction(kept: &[Vec<f64>], d: usize) -> Vec<f64> {
    let mut best = 0;
    let mut best_residual = f64::NEG_INFINITY;
    for e in 0..d {
        let covered: f64 = kept.iter().map(|q| q[e] * q[e]).sum();
        let residual = 1.0 - covered;
        if residual > best_residual {
            best_residual = residual;
            best = e;
        }
    }

    let mut v = vec![0.0; d];
    v[best] = 1.0;
    for _ in 0..2 {
        for q in kept {
            let p = dot64(q, &v);
            v.iter_mut().zip(q).for_each(|(c, qi)| *c -= p * qi);
        }
    }
    let norm = norm64(&v);
    if norm > 0.0 {
        v.iter_mut().for_each(|c| *c /= norm);
    }
    v
}

/// Rotate an orthonormal basis onto the principal axes it spans.
/// Returns variances (descending) and the matching axes.
fn rayleigh_ritz(cov: &[Vec<f64>], basis: &[Vec<f64>]) -> (Vec<f64>, Vec<Vec<f64>>) {
    let k = basis.len();
    let images: Vec<Vec<f64>> = basis.par_iter().map(|q| mat_vec(cov, q)).collect();
    let mut small = vec![vec![0.0; k]; k];
    for a in 0..k {
        for b in a..k {
            let v = 0.5 * (dot64(&basis[a], &images[b]) + dot64(&basis[b], &images[a]));
            small[a][b] = v;
            small[b][a] = v;
        }
    }

    let (eigenvalues, rotation) = jacobi_eigen(small);
    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by(|&x, &y| eigenvalues[y].total_cmp(&eigenvalues[x]).then(x.cmp(&y)));

    let d = basis.first().map(|q| q.len()).unwrap_or(0);
    let axes = order
        .iter()
        .map(|&c| {
            let mut axis = vec![0.0; d];
            for (a, q) in basis.iter().enumerate() {
                let w = rotation[a][c];
                axis.iter_mut().zip(q).for_each(|(x, qi)| *x += w * qi);
            }
            axis
        })
        .collect();
    let variances = order.iter().map(|&c| eigenvalues[c].max(0.0)).collect();
    (variances, axes)
}

/// Cyclic Jacobi eigen-decomposition of a symmetric matrix.
/// Eigenvector `c` is column `c` of the returned matrix.
fn jacobi_eigen(mut a: Vec<Vec<f64>>) -> (Vec<f64>, Vec<Vec<f64>>) {
    let n = a.len();
    let mut v: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    let total: f64 = a.iter().flatten().map(|x| x * x).sum();
    for _ in 0..JACOBI_MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|p| ((p + 1)..n).map(move |q| (p, q)))
            .map(|(p, q)| a[p][q] * a[p][q])
            .sum();
        if off <= 1e-24 * total.max(f64::MIN_POSITIVE) {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[p][q];
                if apq == 0.0 {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for row in a.iter_mut() {
                    let (akp, akq) = (row[p], row[q]);
                    row[p] = c * akp - s * akq;
                    row[q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let (apk, aqk) = (a[p][k], a[q][k]);
                    a[p][k] = c * apk - s * aqk;
                    a[q][k] = s * apk + c * aqk;
                }
                for row in v.iter_mut() {
                    let (vkp, vkq) = (row[p], row[q]);
                    row[p] = c * vkp - s * vkq;
                    row[q] = s * vkp + c * vkq;
                }
            }
        }
    }

    let eigenvalues = (0..n).map(|i| a[i][i]).collect();
    (eigenvalues, v)
}

/// Flip `axis` so its largest-magnitude coordinate is positive.
fn normalize_sign(axis: &mut [f64]) {
    let mut pivot = 0;
    for (i, x) in axis.iter().enumerate() {
        if x.abs() > axis[pivot].abs() {
            pivot = i;
        }
    }
    if axis.get(pivot).is_some_and(|&x| x < 0.0) {
        axis.iter_mut().for_each(|x| *x = -*x);
    }
}
