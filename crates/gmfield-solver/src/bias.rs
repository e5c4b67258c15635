//! Event-term (inter-event bias) estimation.
//!
//! Residuals are modelled as `r = tau * H + w + e`, with the normalized
//! event term `H ~ N(0, 1)`, the within-event field `w` and measurement
//! noise `e` jointly `N(0, C)`. Conditioning `H` on `r` gives
//! (Worden et al., 2018, eqs. 11-12):
//!
//! ```text
//! sigma_H^2 = 1 / (1 + tau^T C^-1 tau)
//! H         = sigma_H^2 * tau^T C^-1 r
//! ```
//!
//! Correlated observations share information through `C`, so two
//! co-located copies of one observation count once, and a noisy
//! observation is down-weighted by its own variance on the diagonal.

use gmfield_correlation::CorrelationModel;
use gmfield_error::Result;
use gmfield_gmpe::PredictionModel;
use gmfield_types::ObservationSet;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::EngineConfig;
use crate::covariance::{CovarianceFactor, assemble};
use crate::residual::ResidualSet;

/// Posterior of the normalized event term.
///
/// The bias at a point whose between-event standard deviation is `tau` is
/// `tau * h`, with standard deviation `tau * sigma_h`. Because
/// `sigma_h <= 1`, the bias uncertainty never exceeds `tau`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventBias {
    /// Posterior mean of the normalized event term.
    pub h: f64,
    /// Posterior standard deviation of the normalized event term.
    pub sigma_h: f64,
    /// Number of observations that informed the estimate.
    pub observations: usize,
}

impl EventBias {
    /// The prior: no observations, no shift, full between-event spread.
    #[must_use]
    pub const fn prior() -> Self {
        Self {
            h: 0.0,
            sigma_h: 1.0,
            observations: 0,
        }
    }

    /// Bias in natural-log units for between-event standard deviation `tau`.
    #[must_use]
    pub fn bias(&self, tau: f64) -> f64 {
        tau * self.h
    }

    /// Bias standard deviation for between-event standard deviation `tau`.
    #[must_use]
    pub fn std_dev(&self, tau: f64) -> f64 {
        tau * self.sigma_h
    }

    /// Estimate from residuals and an already factored covariance.
    pub(crate) fn from_factor(residuals: &ResidualSet, factor: &CovarianceFactor) -> Self {
        if residuals.is_empty() {
            return Self::prior();
        }
        let cinv_tau = factor.solve(&residuals.tau);
        let cinv_r = factor.solve(&residuals.residuals);
        let precision = 1.0 + residuals.tau.dot(&cinv_tau);
        let variance = 1.0 / precision;
        let h = variance * residuals.tau.dot(&cinv_r);
        Self {
            h,
            sigma_h: variance.sqrt().min(1.0),
            observations: residuals.len(),
        }
    }
}

/// Estimate the event bias of an observation set on its own, without
/// building a conditional field.
pub fn estimate_bias(
    observations: &ObservationSet,
    prediction: &dyn PredictionModel,
    correlation: &dyn CorrelationModel,
    config: &EngineConfig,
) -> Result<EventBias> {
    config.validate()?;
    let residuals = ResidualSet::compute(observations, prediction)?;
    let matrix = assemble(observations, &residuals.phi, &residuals.sigma, correlation)?;
    let factor = CovarianceFactor::factor(matrix, &config.regularization)?;
    let bias = EventBias::from_factor(&residuals, &factor);
    info!(
        observations = bias.observations,
        h = bias.h,
        sigma_h = bias.sigma_h,
        rank = factor.rank(),
        "event bias estimated"
    );
    Ok(bias)
}
