//! Conditional ground-motion field estimation.
//!
//! Given sparse observations of ground motion, a prediction model and a
//! spatial/spectral correlation model, estimate the posterior mean and
//! standard deviation of ground motion at arbitrary locations and periods
//! (Worden et al., 2018).
//!
//! ```text
//!  ObservationSet ─┐
//!  PredictionModel ├─ ConditionalField::new ── bias + widened covariance factor (once)
//!  CorrelationModel┘            │
//!                               └─ estimate_all(queries) ── rayon, per query
//! ```
//!
//! This crate only re-exports the member crates.

pub use gmfield_correlation::{
    CorrelationConfig, CorrelationModel, GodaAtkinson2010, ValidationCorrelation, period_ratio,
};
pub use gmfield_error::{FieldError, Result, SolveError, ValidationError};
pub use gmfield_gmpe::{
    ConstantPrediction, DepthSelection, DepthWindow, PredictionModel, ProbabilityRamp, Wald99,
    WeightedPrediction,
};
pub use gmfield_harness::{
    Expectation, ScenarioConfig, ScenarioReport, ScenarioRunner, SeriesPoint, SuiteReport, catalog,
};
pub use gmfield_solver::{
    ConditionalField, EngineConfig, EventBias, QueryOutcome, RegularizationConfig, estimate_bias,
};
pub use gmfield_types::{
    ConditionalEstimate, DistanceMetric, Imt, Location, Observation, ObservationRecord,
    ObservationSet, PredictionPoint, QueryPoint,
};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn weighted_models_condition_end_to_end() {
        let records: Vec<ObservationRecord> = serde_json::from_str(
            r#"[
                {"id": "A", "location": [0.0], "imt": "PGA", "amplitude": -1.0, "sigma": 0.1},
                {"id": "B", "location": [12.0], "imt": "PGA", "amplitude": -1.4}
            ]"#,
        )
        .unwrap();
        let observations = ObservationSet::from_records(records, DistanceMetric::Euclidean).unwrap();
        let prediction = WeightedPrediction::new(vec![
            (Arc::new(ConstantPrediction::new(-1.5, 0.5, 0.7)) as Arc<dyn PredictionModel>, 0.6),
            (Arc::new(ConstantPrediction::new(-1.1, 0.6, 0.8)) as Arc<dyn PredictionModel>, 0.4),
        ])
        .unwrap();
        let field = ConditionalField::new(
            EngineConfig::default(),
            observations,
            Arc::new(prediction),
            CorrelationConfig::GodaAtkinson2010.build(),
        )
        .unwrap();

        let queries: Vec<QueryPoint> = [0.0, 6.0, 500.0]
            .into_iter()
            .map(|x| QueryPoint::new(Location::on_line(x), Imt::Pga))
            .collect();
        let estimates: Vec<ConditionalEstimate> = field
            .estimate_all(&queries)
            .unwrap()
            .into_iter()
            .collect::<std::result::Result<_, _>>()
            .unwrap();

        // A carries measurement noise: close to its value, not pinned to it.
        assert!((estimates[0].mean + 1.0).abs() < 0.1);
        assert!(estimates[0].std_dev > 0.0);
        assert!(estimates[0].std_dev < estimates[2].std_dev);
        // Far away only the event bias remains.
        let prior = field.prediction().predict(&queries[2].location, Imt::Pga);
        let far = estimates[2].mean - prior.mean;
        assert!((far - field.bias().bias(prior.tau)).abs() < 1e-6);
    }

    #[test]
    fn engine_config_from_toml() {
        let config = EngineConfig::from_toml_str("parallel_min_queries = 1").unwrap();
        assert_eq!(config.parallel_min_queries, 1);
        assert_eq!(config.regularization, RegularizationConfig::default());
    }
}
