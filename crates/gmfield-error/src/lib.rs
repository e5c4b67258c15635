//! Error types shared by every gmfield crate.
//!
//! Errors fall into three groups:
//! - [`ValidationError`]: malformed input rejected at ingestion, before any
//!   computation starts.
//! - [`SolveError`]: a numerical failure confined to a single query point.
//!   Other query points of the same run are unaffected.
//! - [`FieldError`]: the top-level error returned by run-wide operations.

use thiserror::Error;

/// Input rejected at ingestion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Measurement standard deviation below zero.
    #[error("observation {id}: measurement sigma must be >= 0, got {sigma}")]
    NegativeSigma { id: String, sigma: f64 },

    /// Measurement standard deviation is NaN or infinite.
    #[error("observation {id}: measurement sigma is not finite ({sigma})")]
    NonFiniteSigma { id: String, sigma: f64 },

    /// Log-amplitude is NaN or infinite.
    #[error("observation {id}: amplitude is not finite ({amplitude})")]
    NonFiniteAmplitude { id: String, amplitude: f64 },

    /// A coordinate is NaN or infinite.
    #[error("{what}: coordinate {axis} is not finite ({value})")]
    NonFiniteCoordinate { what: String, axis: usize, value: f64 },

    /// Points of one run do not share the same coordinate dimension.
    #[error("{what}: expected {expected}-dimensional location, got {actual}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    /// Spectral period must be strictly positive and finite.
    #[error("{what}: spectral period must be > 0, got {period}")]
    InvalidPeriod { what: String, period: f64 },

    /// A prediction model produced an unusable mean or standard deviation.
    #[error("invalid prediction: {0}")]
    InvalidPrediction(String),

    /// Mixture weights are not positive or do not sum to one.
    #[error("invalid model weights: {0}")]
    InvalidWeights(String),

    /// The intensity measure is not supported by the requested conversion.
    #[error("unsupported intensity measure type: {0}")]
    UnsupportedImt(String),

    /// An engine or scenario configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Failure confined to one query point.
///
/// Carries the offending query so callers can report it without re-deriving
/// which point failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    /// The prediction model returned a non-finite mean, a negative or
    /// non-finite tau, or a non-positive phi at the query.
    #[error("invalid prediction at {coords:?} (T={period}s): mean={mean}, tau={tau}, phi={phi}")]
    InvalidPrediction {
        coords: Vec<f64>,
        period: f64,
        mean: f64,
        tau: f64,
        phi: f64,
    },

    /// The correlation model returned a value outside `[0, 1]`.
    #[error("correlation {value} out of range at {coords:?} (T={period}s) against observation {observation}")]
    CorrelationOutOfRange {
        coords: Vec<f64>,
        period: f64,
        observation: String,
        value: f64,
    },

    /// Conditioning produced a non-finite mean or variance.
    #[error("non-finite conditional estimate at {coords:?} (T={period}s): mean={mean}, variance={variance}")]
    NonFiniteResult {
        coords: Vec<f64>,
        period: f64,
        mean: f64,
        variance: f64,
    },
}

/// Top-level error for run-wide operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Solve(#[from] SolveError),

    /// The observation covariance could not be factored, not even through
    /// the pseudo-inverse fallback.
    #[error("covariance factorization failed for {observations} observations: {reason}")]
    Factorization { observations: usize, reason: String },

    /// Configuration text could not be parsed.
    #[error("configuration parse error: {0}")]
    Config(String),

    /// A validation scenario could not be loaded or run.
    #[error("scenario error: {0}")]
    Scenario(String),
}

/// Result alias used throughout the workspace.
pub type Result<T, E = FieldError> = std::result::Result<T, E>;
