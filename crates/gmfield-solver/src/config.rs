//! Immutable engine configuration.
//!
//! Passed explicitly into the bias estimator and the solver at construction;
//! nothing in this crate reads ambient or global settings.

use gmfield_error::{FieldError, Result, ValidationError};
use gmfield_types::DistanceMetric;
use serde::{Deserialize, Serialize};

/// Handling of singular or near-singular observation covariances.
///
/// The covariance is Cholesky-factored when every relative pivot clears
/// `min_pivot_ratio`. Otherwise it is inverted through its eigenvectors,
/// discarding directions whose eigenvalue is below `pinv_rcond` times the
/// largest one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegularizationConfig {
    /// Smallest accepted `L_ii^2 / C_ii` of the Cholesky factor.
    pub min_pivot_ratio: f64,
    /// Relative eigenvalue cutoff of the pseudo-inverse fallback.
    pub pinv_rcond: f64,
}

impl Default for RegularizationConfig {
    fn default() -> Self {
        Self {
            min_pivot_ratio: 1e-9,
            pinv_rcond: 1e-8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub distance_metric: DistanceMetric,
    pub regularization: RegularizationConfig,
    /// Batches smaller than this are evaluated on the calling thread.
    pub parallel_min_queries: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            distance_metric: DistanceMetric::Euclidean,
            regularization: RegularizationConfig::default(),
            parallel_min_queries: 64,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|err| FieldError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let r = &self.regularization;
        if !(r.pinv_rcond.is_finite() && r.pinv_rcond > 0.0 && r.pinv_rcond < 1.0) {
            return Err(ValidationError::InvalidConfig(format!(
                "pinv_rcond must be in (0, 1), got {}",
                r.pinv_rcond
            )));
        }
        if !(r.min_pivot_ratio.is_finite() && r.min_pivot_ratio >= 0.0 && r.min_pivot_ratio < 1.0) {
            return Err(ValidationError::InvalidConfig(format!(
                "min_pivot_ratio must be in [0, 1), got {}",
                r.min_pivot_ratio
            )));
        }
        Ok(())
    }
}
