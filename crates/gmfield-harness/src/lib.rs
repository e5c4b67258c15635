//! Validation scenarios for the conditional field estimator.
//!
//! A [`ScenarioConfig`] bundles observations, a constant prior, a
//! correlation model and a query grid. [`ScenarioRunner`] conditions the
//! field, produces the ordered `{location, period, mean, std_dev}` series
//! and evaluates the scenario's [`Expectation`]s into a [`ScenarioReport`].
//! The canonical scenarios live in [`catalog`].

pub mod catalog;
pub mod expect;
pub mod report;
pub mod runner;
pub mod scenario;

pub use catalog::{CATALOG_IDS, catalog, scenario};
pub use expect::{CheckInput, Expectation};
pub use report::{
    CheckOutcome, QueryFailure, REPORT_SCHEMA_VERSION, ScenarioReport, SeriesPoint, SuiteReport,
};
pub use runner::ScenarioRunner;
pub use scenario::{MAX_LINE_POINTS, PriorConfig, QueryGrid, ScenarioConfig};
