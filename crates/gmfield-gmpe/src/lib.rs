//! Ground-motion prediction models and intensity conversion.
//!
//! A [`PredictionModel`] supplies the prior distribution (mean, between-event
//! and within-event standard deviation) at any location and intensity
//! measure. The validation scenarios use [`ConstantPrediction`]; real events
//! typically combine several models with [`WeightedPrediction`], weighted
//! by event depth or a regime probability (see [`selection`]).

pub mod gmice;
pub mod selection;
pub mod weighted;

use std::fmt;

use gmfield_types::{Imt, Location, PredictionPoint};
use serde::{Deserialize, Serialize};

pub use gmice::{Wald99, Wald99Coefficients};
pub use selection::{DepthSelection, DepthWindow, ProbabilityRamp};
pub use weighted::WeightedPrediction;

/// Prior ground-motion distribution at a point.
pub trait PredictionModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn predict(&self, location: &Location, imt: Imt) -> PredictionPoint;
}

/// The same prediction everywhere, at every period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantPrediction {
    pub mean: f64,
    pub tau: f64,
    pub phi: f64,
}

impl ConstantPrediction {
    #[must_use]
    pub const fn new(mean: f64, tau: f64, phi: f64) -> Self {
        Self { mean, tau, phi }
    }

    /// Mean 0, between-event 0.6, within-event 0.8 (total 1.0).
    #[must_use]
    pub const fn validation() -> Self {
        Self::new(0.0, 0.6, 0.8)
    }
}

impl Default for ConstantPrediction {
    fn default() -> Self {
        Self::validation()
    }
}

impl PredictionModel for ConstantPrediction {
    fn name(&self) -> &str {
        "constant"
    }

    fn predict(&self, _location: &Location, _imt: Imt) -> PredictionPoint {
        PredictionPoint::new(self.mean, self.tau, self.phi)
    }
}
