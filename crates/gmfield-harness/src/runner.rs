//! Scenario runner.
//!
//! ```text
//!  ScenarioRunner::run(scenario)
//!    ├── ingest observations      (ValidationError aborts the scenario)
//!    ├── ConditionalField::new    (bias + covariance factor, once)
//!    ├── estimate_all(grid)       (per-query failures are recorded)
//!    ├── attach MMI               (optional, PGA/PGV only)
//!    └── evaluate expectations → ScenarioReport
//! ```

use std::sync::Arc;

use gmfield_error::Result;
use gmfield_gmpe::Wald99;
use gmfield_solver::{ConditionalField, EngineConfig};
use gmfield_types::{Imt, ObservationSet};
use tracing::{debug, info, warn};

use crate::expect::CheckInput;
use crate::report::{QueryFailure, REPORT_SCHEMA_VERSION, ScenarioReport, SeriesPoint, SuiteReport};
use crate::scenario::ScenarioConfig;

/// Runs scenarios against one engine configuration.
///
/// The scenario's own distance metric replaces the engine's.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioRunner {
    engine: EngineConfig,
}

impl ScenarioRunner {
    #[must_use]
    pub const fn new(engine: EngineConfig) -> Self {
        Self { engine }
    }

    #[must_use]
    pub const fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    pub fn run(&self, scenario: &ScenarioConfig) -> Result<ScenarioReport> {
        debug!(id = %scenario.id, observations = scenario.observations.len(), "scenario start");
        let observations = ObservationSet::from_records(scenario.observations.clone(), scenario.metric)?;
        let queries = scenario.grid.queries()?;
        let engine = EngineConfig {
            distance_metric: scenario.metric,
            ..self.engine
        };
        let field = ConditionalField::new(
            engine,
            observations,
            Arc::new(scenario.prior.model()),
            scenario.correlation.build(),
        )?;
        debug!(id = %scenario.id, queries = queries.len(), "field built");

        let outcomes = field.estimate_all(&queries)?;
        let mut series = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (index, (query, outcome)) in queries.iter().zip(outcomes).enumerate() {
            match outcome {
                Ok(estimate) => {
                    let (mmi, mmi_std) = if scenario.attach_mmi {
                        intensity(estimate.imt, estimate.mean, estimate.std_dev)
                    } else {
                        (None, None)
                    };
                    series.push(SeriesPoint {
                        period: estimate.period(),
                        location: estimate.location,
                        imt: estimate.imt,
                        mean: estimate.mean,
                        std_dev: estimate.std_dev,
                        mmi,
                        mmi_std,
                    });
                }
                Err(err) => failures.push(QueryFailure {
                    index,
                    query: query.clone(),
                    error: err.to_string(),
                }),
            }
        }

        let bias = field.bias();
        let tau = scenario.prior.tau;
        let input = CheckInput {
            bias: bias.bias(tau),
            bias_std: bias.std_dev(tau),
            series: &series,
        };
        let checks: Vec<_> = scenario.expectations.iter().map(|e| e.evaluate(&input)).collect();

        let report = ScenarioReport {
            schema_version: REPORT_SCHEMA_VERSION,
            id: scenario.id.clone(),
            description: scenario.description.clone(),
            observations: field.observations().len(),
            rank: field.rank(),
            regularized: field.is_regularized(),
            event_bias: bias,
            bias: bias.bias(tau),
            bias_std: bias.std_dev(tau),
            series,
            failures,
            checks,
        };
        for check in report.failed_checks() {
            warn!(
                id = %report.id,
                check = %check.name,
                expected = %check.expected,
                actual = check.actual,
                "scenario check failed"
            );
        }
        info!(
            id = %report.id,
            points = report.series.len(),
            failures = report.failures.len(),
            passed = report.passed(),
            "scenario finished"
        );
        Ok(report)
    }

    /// Run every scenario, stopping at the first one that cannot run at all.
    pub fn run_all(&self, scenarios: &[ScenarioConfig]) -> Result<SuiteReport> {
        let reports = scenarios
            .iter()
            .map(|s| self.run(s))
            .collect::<Result<Vec<_>>>()?;
        let suite = SuiteReport::from_reports(reports);
        info!(passed = suite.passed, failed = suite.failed, "scenario suite finished");
        Ok(suite)
    }
}

/// Wald (1999) intensity for PGA and PGV outputs.
fn intensity(imt: Imt, mean: f64, std_dev: f64) -> (Option<f64>, Option<f64>) {
    match Wald99.mmi_with_uncertainty(mean, std_dev, imt) {
        Ok((mmi, mmi_std)) => (Some(mmi), Some(mmi_std)),
        Err(_) => (None, None),
    }
}
