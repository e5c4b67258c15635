//! Prior predictions, query points and conditional estimates.

use serde::{Deserialize, Serialize};

use crate::imt::Imt;
use crate::location::Location;

/// Prior (GMPE) distribution at one location and intensity measure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionPoint {
    /// Predicted mean, natural-log units.
    pub mean: f64,
    /// Between-event standard deviation.
    pub tau: f64,
    /// Within-event standard deviation.
    pub phi: f64,
}

impl PredictionPoint {
    #[must_use]
    pub const fn new(mean: f64, tau: f64, phi: f64) -> Self {
        Self { mean, tau, phi }
    }

    /// `sqrt(tau^2 + phi^2)`.
    #[must_use]
    pub fn total_std(&self) -> f64 {
        self.tau.hypot(self.phi)
    }

    /// Finite mean, finite `tau >= 0` and finite `phi > 0`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.mean.is_finite()
            && self.tau.is_finite()
            && self.phi.is_finite()
            && self.tau >= 0.0
            && self.phi > 0.0
    }
}

/// A location/intensity-measure pair at which the field is estimated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPoint {
    pub location: Location,
    pub imt: Imt,
}

impl QueryPoint {
    #[must_use]
    pub const fn new(location: Location, imt: Imt) -> Self {
        Self { location, imt }
    }

    #[must_use]
    pub const fn period(&self) -> f64 {
        self.imt.period()
    }
}

/// Posterior mean and standard deviation at one query point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalEstimate {
    pub location: Location,
    pub imt: Imt,
    /// Conditional mean, natural-log units.
    pub mean: f64,
    /// Conditional standard deviation, in `[0, sqrt(tau^2 + phi^2)]`.
    pub std_dev: f64,
}

impl ConditionalEstimate {
    #[must_use]
    pub const fn period(&self) -> f64 {
        self.imt.period()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_std_of_validation_prior() {
        let p = PredictionPoint::new(0.0, 0.6, 0.8);
        assert!((p.total_std() - 1.0).abs() < 1e-12);
        assert!(p.is_valid());
    }

    #[test]
    fn zero_phi_is_invalid() {
        assert!(!PredictionPoint::new(0.0, 0.6, 0.0).is_valid());
        assert!(!PredictionPoint::new(f64::NAN, 0.6, 0.8).is_valid());
        assert!(!PredictionPoint::new(0.0, -0.1, 0.8).is_valid());
    }
}
