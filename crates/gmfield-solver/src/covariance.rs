//! Observation covariance assembly and factorization.
//!
//! `C_ij = rho_ij * phi_i * phi_j` off the diagonal and
//! `C_ii = phi_i^2 + sigma_i^2` on it: the within-event covariance of the
//! observations plus their own measurement variance. The bias estimator
//! uses the prior `phi`; the field solver uses `phi` widened by the
//! remaining bias uncertainty.
//!
//! Factoring `C` is the O(n^3) step of a run. It happens once per event and
//! the factor is shared read-only by every query afterwards.

use gmfield_correlation::CorrelationModel;
use gmfield_error::{FieldError, Result, ValidationError};
use gmfield_types::ObservationSet;
use nalgebra::{Cholesky, DMatrix, DVector, Dyn, SymmetricEigen};
use tracing::{debug, warn};

use crate::config::RegularizationConfig;

/// Build `C` for an observation set from per-observation within-event
/// (`phi`) and measurement (`sigma`) standard deviations.
///
/// Rejects correlation values outside `[0, 1]`; a model that produces them
/// is a configuration bug, not a property of the data.
pub fn assemble(
    observations: &ObservationSet,
    phi: &DVector<f64>,
    sigma: &DVector<f64>,
    correlation: &dyn CorrelationModel,
) -> Result<DMatrix<f64>, ValidationError> {
    let obs = observations.as_slice();
    let metric = observations.metric();
    let n = obs.len();
    let mut matrix = DMatrix::zeros(n, n);
    for i in 0..n {
        let phi_i = phi[i];
        matrix[(i, i)] = phi_i * phi_i + sigma[i] * sigma[i];
        for j in (i + 1)..n {
            let distance = metric.distance(obs[i].location(), obs[j].location());
            let rho = correlation.correlation(distance, obs[i].imt(), obs[j].imt());
            if !(0.0..=1.0).contains(&rho) {
                return Err(ValidationError::InvalidConfig(format!(
                    "correlation model {} returned {rho} between observations {} and {}",
                    correlation.name(),
                    obs[i].id(),
                    obs[j].id()
                )));
            }
            let c = rho * phi_i * phi[j];
            matrix[(i, j)] = c;
            matrix[(j, i)] = c;
        }
    }
    Ok(matrix)
}

#[derive(Debug, Clone)]
enum Inverse {
    Empty,
    Cholesky(Cholesky<f64, Dyn>),
    /// `C^+ = W W^T` with `W = V_r diag(lambda_r)^-1/2`.
    Spectral(DMatrix<f64>),
}

/// Factored observation covariance.
///
/// Either an exact Cholesky factor or, for singular and near-singular
/// matrices, a truncated eigen-decomposition acting as a pseudo-inverse.
/// Both expose the same `solve`/`quadratic_form` operations.
#[derive(Debug, Clone)]
pub struct CovarianceFactor {
    inverse: Inverse,
    dim: usize,
    rank: usize,
}

impl CovarianceFactor {
    pub fn factor(matrix: DMatrix<f64>, config: &RegularizationConfig) -> Result<Self> {
        let dim = matrix.nrows();
        if dim == 0 {
            return Ok(Self {
                inverse: Inverse::Empty,
                dim,
                rank: 0,
            });
        }
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(FieldError::Factorization {
                observations: dim,
                reason: "non-finite covariance entry".to_owned(),
            });
        }

        let diag = matrix.diagonal();
        if let Some(chol) = Cholesky::new(matrix.clone()) {
            let worst = min_pivot_ratio(&chol, &diag);
            if worst >= config.min_pivot_ratio {
                debug!(observations = dim, worst_pivot_ratio = worst, "observation covariance factored");
                return Ok(Self {
                    inverse: Inverse::Cholesky(chol),
                    dim,
                    rank: dim,
                });
            }
            debug!(worst_pivot_ratio = worst, "near-singular cholesky factor rejected");
        }

        let eigen = SymmetricEigen::new(matrix);
        let largest = eigen.eigenvalues.max();
        if !(largest.is_finite() && largest > 0.0) {
            return Err(FieldError::Factorization {
                observations: dim,
                reason: format!("largest eigenvalue is {largest}"),
            });
        }
        let cutoff = config.pinv_rcond * largest;
        let kept: Vec<usize> = (0..dim).filter(|&i| eigen.eigenvalues[i] > cutoff).collect();
        let mut whitening = DMatrix::zeros(dim, kept.len());
        for (col, &i) in kept.iter().enumerate() {
            let scale = eigen.eigenvalues[i].sqrt().recip();
            whitening.set_column(col, &(eigen.eigenvectors.column(i) * scale));
        }
        warn!(
            observations = dim,
            rank = kept.len(),
            cutoff,
            "observation covariance is singular, using pseudo-inverse"
        );
        Ok(Self {
            inverse: Inverse::Spectral(whitening),
            dim,
            rank: kept.len(),
        })
    }

    /// `C^-1 rhs` (or `C^+ rhs` after the fallback).
    #[must_use]
    pub fn solve(&self, rhs: &DVector<f64>) -> DVector<f64> {
        match &self.inverse {
            Inverse::Empty => DVector::zeros(0),
            Inverse::Cholesky(chol) => chol.solve(rhs),
            Inverse::Spectral(w) => w * (w.transpose() * rhs),
        }
    }

    /// `rhs^T C^-1 rhs`, computed as a squared norm so it is never negative.
    #[must_use]
    pub fn quadratic_form(&self, rhs: &DVector<f64>) -> f64 {
        match &self.inverse {
            Inverse::Empty => 0.0,
            Inverse::Cholesky(chol) => chol
                .l_dirty()
                .solve_lower_triangular(rhs)
                .map_or(f64::NAN, |v| v.norm_squared()),
            Inverse::Spectral(w) => (w.transpose() * rhs).norm_squared(),
        }
    }

    #[must_use]
    pub const fn dim(&self) -> usize {
        self.dim
    }

    /// Number of independent directions retained.
    #[must_use]
    pub const fn rank(&self) -> usize {
        self.rank
    }

    /// Whether the pseudo-inverse fallback was used.
    #[must_use]
    pub const fn is_regularized(&self) -> bool {
        matches!(self.inverse, Inverse::Spectral(_))
    }
}

/// Smallest `L_ii^2 / C_ii` over the factor: the fraction of each
/// observation's variance not explained by the ones before it.
fn min_pivot_ratio(chol: &Cholesky<f64, Dyn>, diag: &DVector<f64>) -> f64 {
    let l = chol.l_dirty();
    (0..diag.len())
        .map(|i| {
            let pivot = l[(i, i)];
            pivot * pivot / diag[i]
        })
        .fold(f64::INFINITY, f64::min)
}
