//! Observation residuals against the prior prediction.

use gmfield_error::ValidationError;
use gmfield_gmpe::PredictionModel;
use gmfield_types::ObservationSet;
use nalgebra::DVector;

/// Per-observation residual and the prior standard deviations it is
/// measured against.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidualSet {
    /// `amplitude - predicted mean`.
    pub residuals: DVector<f64>,
    /// Between-event standard deviation at each observation.
    pub tau: DVector<f64>,
    /// Within-event standard deviation at each observation.
    pub phi: DVector<f64>,
    /// Measurement standard deviation of each observation.
    pub sigma: DVector<f64>,
}

impl ResidualSet {
    pub fn compute(
        observations: &ObservationSet,
        prediction: &dyn PredictionModel,
    ) -> Result<Self, ValidationError> {
        let n = observations.len();
        let mut residuals = DVector::zeros(n);
        let mut tau = DVector::zeros(n);
        let mut phi = DVector::zeros(n);
        let mut sigma = DVector::zeros(n);
        for (i, obs) in observations.iter().enumerate() {
            let p = prediction.predict(obs.location(), obs.imt());
            if !p.is_valid() {
                return Err(ValidationError::InvalidPrediction(format!(
                    "model {} at observation {}: mean={}, tau={}, phi={}",
                    prediction.name(),
                    obs.id(),
                    p.mean,
                    p.tau,
                    p.phi
                )));
            }
            residuals[i] = obs.amplitude() - p.mean;
            tau[i] = p.tau;
            phi[i] = p.phi;
            sigma[i] = obs.sigma();
        }
        Ok(Self {
            residuals,
            tau,
            phi,
            sigma,
        })
    }

    /// Within-event standard deviation widened by the remaining bias
    /// uncertainty: `sqrt(phi^2 + tau^2 * sigma_h^2)`.
    #[must_use]
    pub fn widened_phi(&self, sigma_h: f64) -> DVector<f64> {
        self.phi.zip_map(&self.tau, |phi, tau| widen(phi, tau, sigma_h))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.residuals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.residuals.is_empty()
    }
}

/// `sqrt(phi^2 + (tau * sigma_h)^2)`
#[must_use]
pub fn widen(phi: f64, tau: f64, sigma_h: f64) -> f64 {
    phi.hypot(tau * sigma_h)
}
