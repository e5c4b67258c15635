//! Model weights from event properties.
//!
//! Two rules pick the members of a [`WeightedPrediction`]:
//!
//! - [`DepthSelection`]: each model covers a depth window. A model is fully
//!   weighted inside its window and tapers linearly to zero over
//!   `vertical_buffer` km on either side. Weights are then normalized.
//! - [`ProbabilityRamp`]: a probability that is flat at `p1` up to `x1`,
//!   flat at `p2` from `x2`, and linear in between. Used to split weight
//!   between two tectonic regimes.

use std::sync::Arc;

use gmfield_error::ValidationError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{PredictionModel, WeightedPrediction};

/// Depth range (km) over which one model applies at full weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthWindow {
    pub min_depth: f64,
    pub max_depth: f64,
}

impl DepthWindow {
    #[must_use]
    pub const fn new(min_depth: f64, max_depth: f64) -> Self {
        Self {
            min_depth,
            max_depth,
        }
    }

    /// Unnormalized weight at `depth`, zero outside the tapered window.
    #[must_use]
    pub fn weight(&self, depth: f64, vertical_buffer: f64) -> f64 {
        if depth >= self.min_depth && depth <= self.max_depth {
            1.0
        } else if depth > self.min_depth - vertical_buffer && depth < self.min_depth {
            1.0 - (self.min_depth - depth) / vertical_buffer
        } else if depth < self.max_depth + vertical_buffer && depth > self.max_depth {
            1.0 - (depth - self.max_depth) / vertical_buffer
        } else {
            0.0
        }
    }
}

/// Depth windows for a set of models, in model order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthSelection {
    /// Taper width (km) outside each window.
    #[serde(default)]
    pub vertical_buffer: f64,
    pub windows: Vec<DepthWindow>,
}

impl DepthSelection {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.vertical_buffer.is_finite() && self.vertical_buffer >= 0.0) {
            return Err(ValidationError::InvalidConfig(format!(
                "vertical_buffer must be finite and >= 0, got {}",
                self.vertical_buffer
            )));
        }
        for (i, w) in self.windows.iter().enumerate() {
            if !(w.min_depth.is_finite() && w.max_depth.is_finite() && w.min_depth <= w.max_depth) {
                return Err(ValidationError::InvalidConfig(format!(
                    "depth window {i} is {}..{}",
                    w.min_depth, w.max_depth
                )));
            }
        }
        Ok(())
    }

    /// Normalized weight of every window at `depth`; zero for models that
    /// do not apply.
    ///
    /// Fails when no window reaches `depth`.
    pub fn weights(&self, depth: f64) -> Result<Vec<f64>, ValidationError> {
        self.validate()?;
        if !depth.is_finite() {
            return Err(ValidationError::InvalidConfig(format!("event depth is {depth}")));
        }
        let mut weights: Vec<f64> = self
            .windows
            .iter()
            .map(|w| w.weight(depth, self.vertical_buffer))
            .collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(ValidationError::InvalidWeights(format!(
                "no model applies at depth {depth} km"
            )));
        }
        for w in &mut weights {
            *w /= total;
        }
        debug!(depth, ?weights, "depth weights");
        Ok(weights)
    }
}

/// Piecewise-linear probability in `x`.
///
/// ```text
/// p1 |----x1
///    |      \
/// p2 |       x2------
///    +----------------
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityRamp {
    pub x1: f64,
    pub p1: f64,
    pub x2: f64,
    pub p2: f64,
}

impl ProbabilityRamp {
    #[must_use]
    pub const fn new(x1: f64, p1: f64, x2: f64, p2: f64) -> Self {
        Self { x1, p1, x2, p2 }
    }

    #[must_use]
    pub fn probability(&self, x: f64) -> f64 {
        if x <= self.x1 {
            self.p1
        } else if x >= self.x2 {
            self.p2
        } else {
            let slope = (self.p1 - self.p2) / (self.x1 - self.x2);
            slope.mul_add(x - self.x1, self.p1)
        }
    }
}

impl WeightedPrediction {
    /// Weight `models[i]` by `selection.windows[i]` at the event depth.
    /// Models with zero weight are left out.
    pub fn for_depth(
        models: Vec<Arc<dyn PredictionModel>>,
        selection: &DepthSelection,
        depth: f64,
    ) -> Result<Self, ValidationError> {
        if models.len() != selection.windows.len() {
            return Err(ValidationError::InvalidConfig(format!(
                "{} models but {} depth windows",
                models.len(),
                selection.windows.len()
            )));
        }
        let weights = selection.weights(depth)?;
        Self::new(
            models
                .into_iter()
                .zip(weights)
                .filter(|(_, w)| *w > 0.0)
                .collect(),
        )
    }

    /// `first` with probability `ramp.probability(x)`, `second` with the
    /// remainder.
    pub fn blend(
        first: Arc<dyn PredictionModel>,
        second: Arc<dyn PredictionModel>,
        ramp: &ProbabilityRamp,
        x: f64,
    ) -> Result<Self, ValidationError> {
        let p = ramp.probability(x);
        if !(0.0..=1.0).contains(&p) {
            return Err(ValidationError::InvalidWeights(format!(
                "ramp probability {p} at {x} is outside [0, 1]"
            )));
        }
        Self::new(
            [(first, p), (second, 1.0 - p)]
                .into_iter()
                .filter(|(_, w)| *w > 0.0)
                .collect(),
        )
    }
}
