//! Randomized truncated SVD over a sparse feature matrix.
//!
//! A seeded Gaussian test matrix samples the range of `X`, a few power
//! iterations sharpen it, and the small projected problem `B = Q^T X` is
//! solved exactly through the eigendecomposition of `B B^T`.

use super::sparse::CsrMatrix;
use crate::error::FeatureBuildError;
use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct TruncatedSvd {
    pub n_components: usize,
    pub oversamples: usize,
    pub power_iterations: usize,
    pub random_seed: u64,
}

impl Default for TruncatedSvd {
    fn default() -> Self {
        Self {
            n_components: 2000,
            oversamples: 10,
            power_iterations: 5,
            random_seed: 42,
        }
    }
}

/// Frozen projection learned from the combined feature space.
#[derive(Debug, Clone)]
pub struct FittedSvd {
    /// `n_features x k`, one column per component.
    components: DMatrix<f64>,
    singular_values: Vec<f64>,
    explained_variance_ratio: Vec<f64>,
}

impl FittedSvd {
    pub fn n_components(&self) -> usize {
        self.singular_values.len()
    }

    pub fn singular_values(&self) -> &[f64] {
        &self.singular_values
    }

    pub fn explained_variance_ratio(&self) -> &[f64] {
        &self.explained_variance_ratio
    }

    pub fn total_explained_variance(&self) -> f64 {
        self.explained_variance_ratio.iter().sum()
    }

    /// Projects feature rows with the same column layout as the fit input.
    pub fn transform(&self, x: &CsrMatrix) -> Array2<f64> {
        to_array(&x.mul_dense(&self.components))
    }
}

fn gaussian_matrix(rows: usize, cols: usize, rng: &mut StdRng) -> DMatrix<f64> {
    DMatrix::from_fn(rows, cols, |_, _| {
        let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
        let u2: f64 = rng.gen();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    })
}

fn orthonormalize(m: DMatrix<f64>) -> DMatrix<f64> {
    m.qr().q()
}

fn to_array(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

fn population_variance(column: &[f64]) -> f64 {
    if column.is_empty() {
        return 0.0;
    }
    let n = column.len() as f64;
    let mean = column.iter().sum::<f64>() / n;
    column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

impl TruncatedSvd {
    pub fn new(n_components: usize) -> Self {
        Self {
            n_components,
            ..Self::default()
        }
    }

    /// Fits the projection and returns it with the reduced representation
    /// `U * Sigma` of the input rows. The component count is clamped to
    /// `min(n_rows, n_cols)`.
    pub fn fit_transform(&self, x: &CsrMatrix) -> Result<(FittedSvd, Array2<f64>), FeatureBuildError> {
        if self.n_components == 0 {
            return Err(FeatureBuildError::InvalidComponents);
        }
        let (n_rows, n_cols) = x.shape();
        if n_rows == 0 {
            return Err(FeatureBuildError::EmptyCorpus);
        }
        if n_cols == 0 {
            return Err(FeatureBuildError::EmptyFeatureSpace);
        }

        let rank = n_rows.min(n_cols);
        let k = self.n_components.min(rank);
        let sketch = (k + self.oversamples).min(rank);
        debug!("Randomized SVD: k={}, sketch={}, input {}x{}", k, sketch, n_rows, n_cols);

        let mut rng = StdRng::seed_from_u64(self.random_seed);
        let omega = gaussian_matrix(n_cols, sketch, &mut rng);

        let mut q = orthonormalize(x.mul_dense(&omega));
        for _ in 0..self.power_iterations {
            let z = orthonormalize(x.transpose_mul_dense(&q));
            q = orthonormalize(x.mul_dense(&z));
        }

        // B^T = X^T Q, so B B^T is a sketch x sketch Gram matrix.
        let bt = x.transpose_mul_dense(&q);
        let gram = bt.transpose() * &bt;
        let eigen = SymmetricEigen::try_new(gram, f64::EPSILON, 0)
            .ok_or_else(|| FeatureBuildError::Decomposition("eigendecomposition did not converge".to_string()))?;

        let mut order: Vec<usize> = (0..eigen.eigenvalues.len()).collect();
        order.sort_by(|&a, &b| {
            eigen.eigenvalues[b]
                .partial_cmp(&eigen.eigenvalues[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut reduced = DMatrix::zeros(n_rows, k);
        let mut components = DMatrix::zeros(n_cols, k);
        let mut singular_values = Vec::with_capacity(k);

        for (c, &idx) in order.iter().take(k).enumerate() {
            let sigma = eigen.eigenvalues[idx].max(0.0).sqrt();
            let ub = eigen.eigenvectors.column(idx);
            let mut u = &q * &ub;
            let mut v = if sigma > f64::EPSILON {
                (&bt * &ub) / sigma
            } else {
                nalgebra::DVector::zeros(n_cols)
            };

            // Deterministic sign: the largest |u| entry is positive.
            let pivot = u.iamax();
            if u[pivot] < 0.0 {
                u.neg_mut();
                v.neg_mut();
            }

            reduced.set_column(c, &(u * sigma));
            components.set_column(c, &v);
            singular_values.push(sigma);
        }

        let total_variance = x.total_variance();
        let explained_variance_ratio = (0..k)
            .map(|c| {
                let column: Vec<f64> = reduced.column(c).iter().copied().collect();
                let variance = population_variance(&column);
                if total_variance > 0.0 { variance / total_variance } else { 0.0 }
            })
            .collect();

        let fitted = FittedSvd {
            components,
            singular_values,
            explained_variance_ratio,
        };
        Ok((fitted, to_array(&reduced)))
    }
}
