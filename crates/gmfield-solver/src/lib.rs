//! Event-bias estimation and conditioning of ground-motion fields.
//!
//! Build a [`ConditionalField`] once per event from its observations, a
//! [`PredictionModel`](gmfield_gmpe::PredictionModel) and a
//! [`CorrelationModel`](gmfield_correlation::CorrelationModel), then query
//! it at any number of locations and intensity measures:
//!
//! 1. residuals against the prior prediction ([`residual`]),
//! 2. prior observation covariance and the event term ([`covariance`], [`bias`]),
//! 3. covariance with `phi` widened by the bias uncertainty, factored once,
//! 4. per-query conditioning, parallel over the query batch ([`field`]).

pub mod bias;
pub mod config;
pub mod covariance;
pub mod field;
pub mod residual;

pub use bias::{EventBias, estimate_bias};
pub use config::{EngineConfig, RegularizationConfig};
pub use covariance::CovarianceFactor;
pub use field::{ConditionalField, QueryOutcome};
pub use residual::ResidualSet;
