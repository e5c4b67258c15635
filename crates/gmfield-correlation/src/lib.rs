//! Correlation models for ground-motion residuals.
//!
//! A [`CorrelationModel`] maps the separation distance between two points and
//! their intensity measures to a correlation coefficient in `[0, 1]`.
//! Every model must satisfy:
//!
//! - symmetry in its two intensity measures,
//! - `correlation(0, imt, imt) == 1` exactly,
//! - monotone non-increasing decay with distance.
//!
//! Models are pure and `Send + Sync`, so one instance can be shared by any
//! number of concurrent solver workers.

pub mod goda_atkinson;
pub mod validation;

use std::fmt;
use std::sync::Arc;

use gmfield_types::Imt;
use serde::{Deserialize, Serialize};

pub use goda_atkinson::{GodaAtkinson2010, SpatialCoefficients};
pub use validation::{DEFAULT_LENGTH_SCALE_KM, ValidationCorrelation};

/// Correlation between residuals at two points.
pub trait CorrelationModel: Send + Sync + fmt::Debug {
    /// Short human-readable model name, used in logs and reports.
    fn name(&self) -> &'static str;

    /// Correlation between residuals `distance` km apart with intensity
    /// measures `a` and `b`.
    fn correlation(&self, distance: f64, a: Imt, b: Imt) -> f64;
}

/// Ratio of the shorter to the longer period, in `(0, 1]`.
#[must_use]
pub fn period_ratio(period_a: f64, period_b: f64) -> f64 {
    let (short, long) = if period_a <= period_b {
        (period_a, period_b)
    } else {
        (period_b, period_a)
    };
    if long <= 0.0 { 1.0 } else { short / long }
}

/// Serializable selection of a correlation model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum CorrelationConfig {
    /// `(Ts/Tl) * exp(-h / length_scale_km)`.
    Validation {
        #[serde(default = "default_length_scale")]
        length_scale_km: f64,
    },
    /// Goda & Atkinson (2010) spatial correlation.
    #[serde(rename = "goda_atkinson_2010")]
    GodaAtkinson2010,
}

fn default_length_scale() -> f64 {
    DEFAULT_LENGTH_SCALE_KM
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self::Validation {
            length_scale_km: DEFAULT_LENGTH_SCALE_KM,
        }
    }
}

impl CorrelationConfig {
    /// Instantiate the configured model.
    #[must_use]
    pub fn build(&self) -> Arc<dyn CorrelationModel> {
        match self {
            Self::Validation { length_scale_km } => {
                Arc::new(ValidationCorrelation::new(*length_scale_km))
            }
            Self::GodaAtkinson2010 => Arc::new(GodaAtkinson2010),
        }
    }
}
