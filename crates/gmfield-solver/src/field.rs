//! Multivariate-normal conditioning of the ground-motion field.
//!
//! # Model
//!
//! At a query `q` with prior `(mu, tau_q, phi_q)` the residual is
//! `tau_q * H + w_q`. Once the event term is estimated as `h` with
//! standard deviation `sigma_h`, its remaining uncertainty is folded into
//! the within-event term (Worden et al., 2018):
//!
//! ```text
//! phi'^2 = phi^2 + tau^2 * sigma_h^2
//! C'_ij  = rho_ij * phi'_i * phi'_j + delta_ij * sigma_i^2
//! k_i    = rho(q, i) * phi'_q * phi'_i
//! mean   = mu + tau_q * h + k^T C'^-1 (r - tau h)
//! var    = phi'_q^2 - k^T C'^-1 k
//! ```
//!
//! Far from every observation the mean falls back to the bias-adjusted
//! prediction and the variance to `phi'_q^2`.
//!
//! # Cost
//!
//! Construction factors two `n x n` covariances (prior `C` for the bias,
//! widened `C'` for the field), each O(n^3). After that barrier a query
//! costs O(n^2) and only reads shared state, so batches are evaluated on
//! the rayon pool.

use std::sync::Arc;

use gmfield_correlation::CorrelationModel;
use gmfield_error::{Result, SolveError, ValidationError};
use gmfield_gmpe::PredictionModel;
use gmfield_types::{ConditionalEstimate, ObservationSet, QueryPoint, validate_dimensions};
use nalgebra::DVector;
use rayon::prelude::*;
use tracing::{debug, error, info};

use crate::bias::EventBias;
use crate::config::EngineConfig;
use crate::covariance::{CovarianceFactor, assemble};
use crate::residual::{ResidualSet, widen};

/// Relative variance below which a result is treated as round-off and
/// reported as exactly zero.
const VARIANCE_FLOOR: f64 = 1e-13;

/// Outcome of one query in a batch.
pub type QueryOutcome = std::result::Result<ConditionalEstimate, SolveError>;

/// A conditioned ground-motion field for one event.
///
/// Immutable once built; share it behind a reference or an `Arc` across
/// threads.
#[derive(Debug)]
pub struct ConditionalField {
    config: EngineConfig,
    observations: ObservationSet,
    prediction: Arc<dyn PredictionModel>,
    correlation: Arc<dyn CorrelationModel>,
    /// Factor of the widened covariance `C'`.
    factor: CovarianceFactor,
    bias: EventBias,
    /// Widened within-event standard deviation at each observation.
    obs_phi: DVector<f64>,
    /// `C'^-1 (r - tau h)`
    weights: DVector<f64>,
}

impl ConditionalField {
    /// Estimate the event bias and factor the observation covariance.
    pub fn new(
        config: EngineConfig,
        observations: ObservationSet,
        prediction: Arc<dyn PredictionModel>,
        correlation: Arc<dyn CorrelationModel>,
    ) -> Result<Self> {
        config.validate()?;
        if observations.metric() != config.distance_metric {
            return Err(ValidationError::InvalidConfig(format!(
                "observation set uses {:?} distances but the engine is configured for {:?}",
                observations.metric(),
                config.distance_metric
            ))
            .into());
        }

        let residuals = ResidualSet::compute(&observations, prediction.as_ref())?;
        let prior = assemble(&observations, &residuals.phi, &residuals.sigma, correlation.as_ref())?;
        let prior = CovarianceFactor::factor(prior, &config.regularization)?;
        let bias = EventBias::from_factor(&residuals, &prior);

        let obs_phi = residuals.widened_phi(bias.sigma_h);
        let widened = assemble(&observations, &obs_phi, &residuals.sigma, correlation.as_ref())?;
        let factor = CovarianceFactor::factor(widened, &config.regularization)?;
        let weights = factor.solve(&(&residuals.residuals - &residuals.tau * bias.h));

        info!(
            observations = observations.len(),
            rank = factor.rank(),
            regularized = factor.is_regularized(),
            h = bias.h,
            sigma_h = bias.sigma_h,
            prediction = prediction.name(),
            correlation = correlation.name(),
            "conditional field ready"
        );

        Ok(Self {
            config,
            observations,
            prediction,
            correlation,
            factor,
            bias,
            obs_phi,
            weights,
        })
    }

    #[must_use]
    pub const fn bias(&self) -> EventBias {
        self.bias
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn observations(&self) -> &ObservationSet {
        &self.observations
    }

    #[must_use]
    pub fn prediction(&self) -> &dyn PredictionModel {
        self.prediction.as_ref()
    }

    #[must_use]
    pub fn correlation(&self) -> &dyn CorrelationModel {
        self.correlation.as_ref()
    }

    /// Number of independent observation directions kept by the field factor.
    #[must_use]
    pub const fn rank(&self) -> usize {
        self.factor.rank()
    }

    /// Whether the covariance needed the pseudo-inverse fallback.
    #[must_use]
    pub const fn is_regularized(&self) -> bool {
        self.factor.is_regularized()
    }

    /// Check a batch of queries against the observation set.
    ///
    /// With no observations and a metric of free dimension the queries only
    /// need to agree among themselves.
    pub fn validate_queries(&self, queries: &[QueryPoint]) -> Result<(), ValidationError> {
        let labels: Vec<String> = (0..queries.len()).map(|i| format!("query {i}")).collect();
        for (label, query) in labels.iter().zip(queries) {
            query.imt.validate(label)?;
        }
        if self.observations.dimension().is_some() {
            for (label, query) in labels.iter().zip(queries) {
                self.observations.check_query(label, &query.location)?;
            }
        } else {
            validate_dimensions(
                self.observations.metric(),
                labels.iter().map(String::as_str).zip(queries.iter().map(|q| &q.location)),
            )?;
        }
        Ok(())
    }

    /// Conditional estimate at a single query.
    pub fn estimate(&self, query: &QueryPoint) -> Result<ConditionalEstimate> {
        self.validate_queries(std::slice::from_ref(query))?;
        Ok(self.solve(query)?)
    }

    /// Conditional estimates for a batch, in input order.
    ///
    /// The whole batch is validated first and rejected on the first bad
    /// query. After that each query succeeds or fails on its own.
    pub fn estimate_all(&self, queries: &[QueryPoint]) -> Result<Vec<QueryOutcome>, ValidationError> {
        self.validate_queries(queries)?;
        let outcomes: Vec<QueryOutcome> = if queries.len() >= self.config.parallel_min_queries {
            debug!(queries = queries.len(), "evaluating queries in parallel");
            queries.par_iter().map(|q| self.solve(q)).collect()
        } else {
            queries.iter().map(|q| self.solve(q)).collect()
        };
        let failed = outcomes.iter().filter(|o| o.is_err()).count();
        if failed > 0 {
            for err in outcomes.iter().filter_map(|o| o.as_ref().err()) {
                error!(%err, "query failed");
            }
            error!(failed, total = queries.len(), "conditioning failed for some queries");
        }
        Ok(outcomes)
    }

    fn solve(&self, query: &QueryPoint) -> QueryOutcome {
        let p = self.prediction.predict(&query.location, query.imt);
        if !p.is_valid() {
            return Err(SolveError::InvalidPrediction {
                coords: query.location.coords().to_vec(),
                period: query.period(),
                mean: p.mean,
                tau: p.tau,
                phi: p.phi,
            });
        }

        let phi_q = widen(p.phi, p.tau, self.bias.sigma_h);
        let k = self.cross_covariance(query, phi_q)?;
        let mean = p.mean + p.tau * self.bias.h + k.dot(&self.weights);
        let raw = phi_q * phi_q - self.factor.quadratic_form(&k);

        if !(mean.is_finite() && raw.is_finite()) {
            return Err(SolveError::NonFiniteResult {
                coords: query.location.coords().to_vec(),
                period: query.period(),
                mean,
                variance: raw,
            });
        }

        let total = p.tau * p.tau + p.phi * p.phi;
        let variance = if raw <= VARIANCE_FLOOR * total {
            0.0
        } else {
            raw.min(total)
        };
        Ok(ConditionalEstimate {
            location: query.location.clone(),
            imt: query.imt,
            mean,
            std_dev: variance.sqrt(),
        })
    }

    fn cross_covariance(&self, query: &QueryPoint, phi_q: f64) -> std::result::Result<DVector<f64>, SolveError> {
        let metric = self.observations.metric();
        let mut k = DVector::zeros(self.observations.len());
        for (i, obs) in self.observations.iter().enumerate() {
            let distance = metric.distance(&query.location, obs.location());
            let rho = self.correlation.correlation(distance, query.imt, obs.imt());
            if !(0.0..=1.0).contains(&rho) {
                return Err(SolveError::CorrelationOutOfRange {
                    coords: query.location.coords().to_vec(),
                    period: query.period(),
                    observation: obs.id().to_owned(),
                    value: rho,
                });
            }
            k[i] = rho * phi_q * self.obs_phi[i];
        }
        Ok(k)
    }
}
