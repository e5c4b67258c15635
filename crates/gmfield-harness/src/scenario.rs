//! Scenario definitions: observations, prior, correlation and query grid.
//!
//! A scenario is a plain record that can be written by hand as TOML or JSON:
//!
//! ```toml
//! id = "0003"
//! description = "single observation"
//!
//! [[observations]]
//! location = [0.0]
//! imt = "SA(1)"
//! amplitude = 1.0
//!
//! [grid]
//! kind = "line"
//! start = -100.0
//! end = 100.0
//! step = 1.0
//! imt = "SA(1)"
//! ```

use std::path::Path;

use gmfield_correlation::CorrelationConfig;
use gmfield_error::{FieldError, Result, ValidationError};
use gmfield_gmpe::ConstantPrediction;
use gmfield_types::{DistanceMetric, Imt, Location, ObservationRecord, QueryPoint};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::expect::Expectation;

// ---------------------------------------------------------------------------
// Prior and grid
// ---------------------------------------------------------------------------

/// Constant prior used across the whole scenario domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorConfig {
    pub mean: f64,
    pub tau: f64,
    pub phi: f64,
}

impl Default for PriorConfig {
    fn default() -> Self {
        let v = ConstantPrediction::validation();
        Self {
            mean: v.mean,
            tau: v.tau,
            phi: v.phi,
        }
    }
}

impl PriorConfig {
    #[must_use]
    pub const fn model(&self) -> ConstantPrediction {
        ConstantPrediction::new(self.mean, self.tau, self.phi)
    }

    /// `sqrt(tau^2 + phi^2)`.
    #[must_use]
    pub fn total_std(&self) -> f64 {
        self.tau.hypot(self.phi)
    }
}

/// Largest number of points a line grid may expand to.
pub const MAX_LINE_POINTS: usize = 1_000_000;

/// Where a scenario is evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryGrid {
    /// Evenly spaced points along a 1-D profile, one intensity measure.
    Line {
        start: f64,
        end: f64,
        step: f64,
        imt: Imt,
    },
    /// One location, a list of spectral periods.
    Spectrum { location: Location, periods: Vec<f64> },
    /// Explicit query points.
    Points { queries: Vec<QueryPoint> },
}

impl QueryGrid {
    /// Expand into query points, in output order.
    pub fn queries(&self) -> Result<Vec<QueryPoint>, ValidationError> {
        match self {
            Self::Line {
                start,
                end,
                step,
                imt,
            } => {
                if !(start.is_finite() && end.is_finite() && *end >= *start) {
                    return Err(ValidationError::InvalidConfig(format!(
                        "line grid needs finite start <= end, got {start}..{end}"
                    )));
                }
                if !(step.is_finite() && *step > 0.0) {
                    return Err(ValidationError::InvalidConfig(format!(
                        "line grid step must be > 0, got {step}"
                    )));
                }
                // Tolerate end points that are a rounding error off the grid.
                let intervals = ((end - start) / step + 1e-9).floor();
                if intervals >= MAX_LINE_POINTS as f64 {
                    return Err(ValidationError::InvalidConfig(format!(
                        "line grid {start}..{end} step {step} exceeds {MAX_LINE_POINTS} points"
                    )));
                }
                let count = intervals as usize;
                Ok((0..=count)
                    .map(|i| QueryPoint::new(Location::on_line(start + step * i as f64), *imt))
                    .collect())
            }
            Self::Spectrum { location, periods } => {
                if periods.is_empty() {
                    return Err(ValidationError::InvalidConfig(
                        "spectrum grid has no periods".to_owned(),
                    ));
                }
                Ok(periods
                    .iter()
                    .map(|&t| QueryPoint::new(location.clone(), Imt::Sa(t)))
                    .collect())
            }
            Self::Points { queries } => Ok(queries.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub observations: Vec<ObservationRecord>,
    #[serde(default)]
    pub prior: PriorConfig,
    #[serde(default)]
    pub correlation: CorrelationConfig,
    #[serde(default)]
    pub metric: DistanceMetric,
    pub grid: QueryGrid,
    /// Attach Wald (1999) intensities to PGA and PGV outputs.
    #[serde(default)]
    pub attach_mmi: bool,
    #[serde(default)]
    pub expectations: Vec<Expectation>,
}

impl ScenarioConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|err| FieldError::Scenario(format!("scenario JSON parse failure: {err}")))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text)
            .map_err(|err| FieldError::Scenario(format!("scenario TOML parse failure: {err}")))
    }

    /// Load a `.json` or `.toml` scenario file.
    pub fn load(path: &Path) -> Result<Self> {
        let parse: fn(&str) -> Result<Self> = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str,
            Some("toml") => Self::from_toml_str,
            other => {
                return Err(FieldError::Scenario(format!(
                    "unsupported scenario file extension {other:?} for {}",
                    path.display()
                )));
            }
        };
        let text = std::fs::read_to_string(path).map_err(|err| {
            FieldError::Scenario(format!("cannot read {}: {err}", path.display()))
        })?;
        let scenario = parse(&text)?;
        debug!(id = %scenario.id, path = %path.display(), "scenario loaded");
        Ok(scenario)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| FieldError::Scenario(format!("scenario JSON encode failure: {err}")))
    }
}
