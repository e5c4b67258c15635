//! Scenario output series and run reports.
//!
//! Reports are plain serde records so an external plotting or review step
//! can consume them as JSON.

use std::path::{Path, PathBuf};

use gmfield_error::{FieldError, Result};
use gmfield_solver::EventBias;
use gmfield_types::{Imt, Location, QueryPoint};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Version of the report JSON layout.
pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// One output point, in grid order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub location: Location,
    pub imt: Imt,
    pub period: f64,
    pub mean: f64,
    pub std_dev: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mmi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mmi_std: Option<f64>,
}

/// A query that could not be conditioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryFailure {
    /// Position of the query in the grid.
    pub index: usize,
    pub query: QueryPoint,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub name: String,
    pub expected: String,
    pub actual: f64,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub schema_version: u32,
    pub id: String,
    pub description: String,
    pub observations: usize,
    /// Independent observation directions kept by the covariance factor.
    pub rank: usize,
    pub regularized: bool,
    pub event_bias: EventBias,
    /// `tau * h` for the scenario prior.
    pub bias: f64,
    /// `tau * sigma_h` for the scenario prior.
    pub bias_std: f64,
    pub series: Vec<SeriesPoint>,
    pub failures: Vec<QueryFailure>,
    pub checks: Vec<CheckOutcome>,
}

impl ScenarioReport {
    /// No failed query and no failed check.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty() && self.checks.iter().all(|c| c.passed)
    }

    pub fn failed_checks(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.checks.iter().filter(|c| !c.passed)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        to_json(self)
    }

    /// Write the report as pretty JSON, creating parent directories.
    pub fn write_json(&self, path: &Path) -> Result<PathBuf> {
        write_json_file(path, self)?;
        info!(id = %self.id, path = %path.display(), passed = self.passed(), "scenario report written");
        Ok(path.to_path_buf())
    }

    pub fn read_json(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| FieldError::Scenario(format!("cannot read {}: {err}", path.display())))?;
        let report: Self = serde_json::from_str(&text)
            .map_err(|err| FieldError::Scenario(format!("report parse failure: {err}")))?;
        if report.schema_version != REPORT_SCHEMA_VERSION {
            return Err(FieldError::Scenario(format!(
                "unsupported report schema version: expected {REPORT_SCHEMA_VERSION}, got {}",
                report.schema_version
            )));
        }
        Ok(report)
    }
}

/// Reports of a batch of scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteReport {
    pub schema_version: u32,
    pub passed: usize,
    pub failed: usize,
    pub reports: Vec<ScenarioReport>,
}

impl SuiteReport {
    #[must_use]
    pub fn from_reports(reports: Vec<ScenarioReport>) -> Self {
        let passed = reports.iter().filter(|r| r.passed()).count();
        Self {
            schema_version: REPORT_SCHEMA_VERSION,
            passed,
            failed: reports.len() - passed,
            reports,
        }
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn get(&self, id: &str) -> Option<&ScenarioReport> {
        self.reports.iter().find(|r| r.id == id)
    }

    /// Write `suite.json` plus one `<id>.json` per scenario into `dir`.
    pub fn write_dir(&self, dir: &Path) -> Result<PathBuf> {
        for report in &self.reports {
            write_json_file(&dir.join(format!("{}.json", report.id)), report)?;
        }
        let path = dir.join("suite.json");
        write_json_file(&path, self)?;
        info!(
            dir = %dir.display(),
            passed = self.passed,
            failed = self.failed,
            "suite report written"
        );
        Ok(path)
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| FieldError::Scenario(format!("report JSON encode failure: {err}")))
}

fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| {
            FieldError::Scenario(format!("cannot create {}: {err}", parent.display()))
        })?;
    }
    std::fs::write(path, to_json(value)?)
        .map_err(|err| FieldError::Scenario(format!("cannot write {}: {err}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(id: &str, check_passed: bool) -> ScenarioReport {
        ScenarioReport {
            schema_version: REPORT_SCHEMA_VERSION,
            id: id.to_owned(),
            description: String::new(),
            observations: 1,
            rank: 1,
            regularized: false,
            event_bias: EventBias::prior(),
            bias: 0.0,
            bias_std: 0.6,
            series: vec![SeriesPoint {
                location: Location::on_line(0.0),
                imt: Imt::Pga,
                period: 0.01,
                mean: 0.0,
                std_dev: 1.0,
                mmi: Some(4.2),
                mmi_std: Some(0.9),
            }],
            failures: vec![],
            checks: vec![CheckOutcome {
                name: "bias".to_owned(),
                expected: "0 ± 0.1".to_owned(),
                actual: 0.0,
                passed: check_passed,
                at: None,
            }],
        }
    }

    #[test]
    fn passed_requires_checks_and_queries() {
        assert!(report("a", true).passed());
        assert!(!report("b", false).passed());
        assert_eq!(report("b", false).failed_checks().count(), 1);

        let mut r = report("c", true);
        r.failures.push(QueryFailure {
            index: 0,
            query: QueryPoint::new(Location::on_line(0.0), Imt::Pga),
            error: "boom".to_owned(),
        });
        assert!(!r.passed());
    }

    #[test]
    fn report_survives_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/0001.json");
        let r = report("0001", true);
        r.write_json(&path).unwrap();
        assert_eq!(ScenarioReport::read_json(&path).unwrap(), r);
    }

    #[test]
    fn wrong_schema_version_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.json");
        let mut r = report("x", true);
        r.schema_version = 99;
        r.write_json(&path).unwrap();
        assert!(ScenarioReport::read_json(&path).is_err());
    }

    #[test]
    fn suite_counts_and_writes_every_report() {
        let suite = SuiteReport::from_reports(vec![report("a", true), report("b", false)]);
        assert_eq!((suite.passed, suite.failed), (1, 1));
        assert!(!suite.all_passed());
        assert!(suite.get("b").is_some());

        let dir = tempfile::tempdir().unwrap();
        let path = suite.write_dir(dir.path()).unwrap();
        assert!(path.ends_with("suite.json"));
        assert!(dir.path().join("a.json").is_file());
        assert!(dir.path().join("b.json").is_file());
    }

    #[test]
    fn mmi_omitted_when_absent() {
        let mut r = report("a", true);
        r.series[0].mmi = None;
        r.series[0].mmi_std = None;
        assert!(!r.to_json_pretty().unwrap().contains("mmi"));
    }
}
