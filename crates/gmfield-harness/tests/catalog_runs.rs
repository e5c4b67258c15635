//! End-to-end runs of the canonical scenario catalog.

use gmfield_harness::{
    CATALOG_IDS, Expectation, ScenarioConfig, ScenarioReport, ScenarioRunner, SuiteReport, catalog,
    scenario,
};
use gmfield_solver::EngineConfig;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn run(id: &str) -> ScenarioReport {
    let s = scenario(id).unwrap_or_else(|| panic!("scenario {id} missing"));
    ScenarioRunner::default().run(&s).unwrap()
}

fn describe_failures(report: &ScenarioReport) -> String {
    let mut text = String::new();
    for c in report.failed_checks() {
        text.push_str(&format!(
            "\n  {} {:?}: expected {}, got {}",
            c.name, c.at, c.expected, c.actual
        ));
    }
    for f in &report.failures {
        text.push_str(&format!("\n  query {}: {}", f.index, f.error));
    }
    text
}

#[test]
fn every_catalog_scenario_passes() {
    init_tracing();
    let suite = ScenarioRunner::default().run_all(&catalog()).unwrap();
    for report in &suite.reports {
        assert!(report.passed(), "scenario {} failed:{}", report.id, describe_failures(report));
    }
    assert_eq!(suite.passed, CATALOG_IDS.len());
}

#[test]
fn co_located_pair_reproduces_single_observation() {
    let single = run("0003");
    let double = run("0004");
    assert!(!single.regularized);
    assert!(double.regularized);
    assert_eq!(double.rank, 1);
    assert_eq!(single.series.len(), double.series.len());
    for (a, b) in single.series.iter().zip(&double.series) {
        assert_eq!(a.location, b.location);
        assert!((a.mean - b.mean).abs() < 1e-6, "mean at {:?}", a.location);
        assert!((a.std_dev - b.std_dev).abs() < 1e-6, "std at {:?}", a.location);
    }
}

#[test]
fn dense_network_tightens_far_field() {
    let single = run("0003");
    let dense = run("0006");
    let far = |r: &ScenarioReport| r.series.last().map(|p| p.std_dev).unwrap();
    assert!(far(&dense) < far(&single));
    assert!(far(&dense) > 0.8);
}

#[test]
fn noisy_observation_sits_between_prior_and_exact_fit() {
    let exact = run("0003");
    let noisy = run("0008");
    assert!(noisy.bias < exact.bias);
    let peak = |r: &ScenarioReport| r.series.iter().map(|p| p.mean).fold(f64::MIN, f64::max);
    assert!(peak(&noisy) < peak(&exact));
    assert!(peak(&noisy) > noisy.bias);
}

#[test]
fn noisy_observation_keeps_bias_uncertainty_in_the_field() {
    let noisy = run("0008");
    let peak = noisy.series.iter().map(|p| p.mean).fold(f64::MIN, f64::max);
    let min_std = noisy.series.iter().map(|p| p.std_dev).fold(f64::MAX, f64::min);
    let max_std = noisy.series.iter().map(|p| p.std_dev).fold(f64::MIN, f64::max);
    assert!((noisy.bias - 0.288).abs() < 1e-4, "bias {}", noisy.bias);
    assert!((peak - 0.84472).abs() < 1e-4, "peak mean {peak}");
    assert!((min_std - 0.44212).abs() < 1e-4, "min std {min_std}");
    assert!((max_std - 0.94674).abs() < 1e-4, "max std {max_std}");
}

#[test]
fn runs_are_deterministic() {
    let s = scenario("0011").unwrap();
    let runner = ScenarioRunner::default();
    assert_eq!(runner.run(&s).unwrap(), runner.run(&s).unwrap());
}

#[test]
fn parallel_and_sequential_engines_agree() {
    let s = scenario("0006").unwrap();
    let parallel = ScenarioRunner::new(EngineConfig {
        parallel_min_queries: 1,
        ..EngineConfig::default()
    });
    let sequential = ScenarioRunner::new(EngineConfig {
        parallel_min_queries: usize::MAX,
        ..EngineConfig::default()
    });
    assert_eq!(
        parallel.run(&s).unwrap().series,
        sequential.run(&s).unwrap().series
    );
}

#[test]
fn suite_report_written_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let suite = ScenarioRunner::default().run_all(&catalog()).unwrap();
    let path = suite.write_dir(dir.path()).unwrap();
    let text = std::fs::read_to_string(path).unwrap();
    let back: SuiteReport = serde_json::from_str(&text).unwrap();
    assert_eq!(back.reports.len(), CATALOG_IDS.len());
    for id in CATALOG_IDS {
        assert!(dir.path().join(format!("{id}.json")).is_file(), "{id}.json missing");
    }
}

#[test]
fn user_scenario_file_runs() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pga_station.toml");
    std::fs::write(
        &path,
        r#"
        id = "pga-station"
        description = "one PGA station, intensity attached"
        attach_mmi = true

        [prior]
        mean = -2.0
        tau = 0.6
        phi = 0.8

        [[observations]]
        id = "STA"
        location = [0.0]
        imt = "PGA"
        amplitude = -1.0

        [grid]
        kind = "line"
        start = 0.0
        end = 50.0
        step = 10.0
        imt = "PGA"

        [[expectations]]
        check = "mean_at"
        location = [0.0]
        imt = "PGA"
        value = -1.0
        tolerance = 1e-6
        "#,
    )
    .unwrap();

    let s = ScenarioConfig::load(&path).unwrap();
    let report = ScenarioRunner::default().run(&s).unwrap();
    assert!(report.passed(), "{}", describe_failures(&report));
    assert_eq!(report.series.len(), 6);
    assert!(report.series.iter().all(|p| p.mmi.is_some()));
    // Intensity falls off with the ground motion away from the station.
    assert!(report.series[0].mmi > report.series[5].mmi);
}

#[test]
fn json_expectations_can_be_added_to_catalog_scenarios() {
    let mut s = scenario("0002").unwrap();
    s.expectations = vec![serde_json::from_str::<Expectation>(
        r#"{"check": "peak_mean", "value": 1.0, "tolerance": 1e-6}"#,
    )
    .unwrap()];
    assert!(ScenarioRunner::default().run(&s).unwrap().passed());
}
