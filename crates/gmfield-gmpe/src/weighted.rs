//! Weighted combination of prediction models.
//!
//! Events are usually assigned several GMPEs, each with a weight derived
//! from the tectonic-regime probabilities. The combined prior is the
//! mixture's first two moments:
//!
//! - `mean = sum(w * mean_i)`
//! - `tau^2 = sum(w * tau_i^2)`
//! - `phi^2 = sum(w * phi_i^2) + sum(w * (mean_i - mean)^2)`
//!
//! The spread between model means is attributed to the within-event term.

use std::sync::Arc;

use gmfield_error::ValidationError;
use gmfield_types::{Imt, Location, PredictionPoint};
use tracing::debug;

use crate::PredictionModel;

/// Tolerance on the weight sum.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct WeightedPrediction {
    members: Vec<(Arc<dyn PredictionModel>, f64)>,
}

impl WeightedPrediction {
    pub fn new(members: Vec<(Arc<dyn PredictionModel>, f64)>) -> Result<Self, ValidationError> {
        if members.is_empty() {
            return Err(ValidationError::InvalidWeights(
                "at least one model is required".to_owned(),
            ));
        }
        let mut sum = 0.0;
        for (model, weight) in &members {
            if !weight.is_finite() || *weight <= 0.0 {
                return Err(ValidationError::InvalidWeights(format!(
                    "model {} has weight {weight}",
                    model.name()
                )));
            }
            sum += weight;
        }
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ValidationError::InvalidWeights(format!(
                "weights sum to {sum}, expected 1"
            )));
        }
        debug!(models = members.len(), "weighted prediction assembled");
        Ok(Self { members })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl PredictionModel for WeightedPrediction {
    fn name(&self) -> &str {
        "weighted"
    }

    fn predict(&self, location: &Location, imt: Imt) -> PredictionPoint {
        let points: Vec<(PredictionPoint, f64)> = self
            .members
            .iter()
            .map(|(model, weight)| (model.predict(location, imt), *weight))
            .collect();

        let mean: f64 = points.iter().map(|(p, w)| w * p.mean).sum();
        let tau_sq: f64 = points.iter().map(|(p, w)| w * p.tau * p.tau).sum();
        let phi_sq: f64 = points
            .iter()
            .map(|(p, w)| w * (p.phi * p.phi + (p.mean - mean) * (p.mean - mean)))
            .sum();
        PredictionPoint::new(mean, tau_sq.sqrt(), phi_sq.sqrt())
    }
}
