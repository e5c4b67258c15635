//! Cross-checks of the conditional field against dense, direct evaluations
//! of the same model.
//!
//! The event term must equal the posterior of `H` under the joint normal
//! distribution of all residuals. The field must equal conditioning on the
//! bias-widened within-event covariance, evaluated with a plain matrix
//! inverse.

use std::sync::Arc;

use gmfield_correlation::{CorrelationModel, GodaAtkinson2010, ValidationCorrelation};
use gmfield_gmpe::{ConstantPrediction, PredictionModel};
use gmfield_solver::{ConditionalField, EngineConfig};
use gmfield_types::{DistanceMetric, Imt, Location, Observation, ObservationSet, QueryPoint};
use nalgebra::{DMatrix, DVector};
use proptest::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

struct Dense {
    residuals: DVector<f64>,
    tau: DVector<f64>,
    phi: DVector<f64>,
    sigma: DVector<f64>,
    rho: DMatrix<f64>,
}

impl Dense {
    fn new(obs: &[Observation], prediction: &dyn PredictionModel, correlation: &dyn CorrelationModel) -> Self {
        let n = obs.len();
        let metric = DistanceMetric::Euclidean;
        let prior: Vec<_> = obs.iter().map(|o| prediction.predict(o.location(), o.imt())).collect();
        Self {
            residuals: DVector::from_fn(n, |i, _| obs[i].amplitude() - prior[i].mean),
            tau: DVector::from_fn(n, |i, _| prior[i].tau),
            phi: DVector::from_fn(n, |i, _| prior[i].phi),
            sigma: DVector::from_fn(n, |i, _| obs[i].sigma()),
            rho: DMatrix::from_fn(n, n, |i, j| {
                correlation.correlation(
                    metric.distance(obs[i].location(), obs[j].location()),
                    obs[i].imt(),
                    obs[j].imt(),
                )
            }),
        }
    }

    fn covariance(&self, phi: &DVector<f64>) -> DMatrix<f64> {
        let n = phi.len();
        DMatrix::from_fn(n, n, |i, j| {
            let noise = if i == j { self.sigma[i] * self.sigma[i] } else { 0.0 };
            self.rho[(i, j)] * phi[i] * phi[j] + noise
        })
    }

    /// Posterior mean and variance of the normalized event term under the
    /// joint covariance `tau tau^T + C`.
    fn event_term(&self) -> (f64, f64) {
        let joint = &self.tau * self.tau.transpose() + self.covariance(&self.phi);
        let inverse = joint.try_inverse().expect("joint covariance should be invertible");
        let gain = &inverse * &self.tau;
        (gain.dot(&self.residuals), 1.0 - self.tau.dot(&gain))
    }
}

fn check(points: &[(f64, f64, f64, Imt)], correlation: Arc<dyn CorrelationModel>, queries: &[QueryPoint]) {
    let obs: Vec<_> = points
        .iter()
        .enumerate()
        .map(|(i, &(x, amp, sigma, imt))| {
            Observation::new(format!("s{i}"), Location::on_line(x), imt, amp, sigma).unwrap()
        })
        .collect();
    let prediction = Arc::new(ConstantPrediction::new(-0.7, 0.55, 0.75));
    let field = ConditionalField::new(
        EngineConfig::default(),
        ObservationSet::new(obs.clone(), DistanceMetric::Euclidean).unwrap(),
        prediction.clone(),
        correlation.clone(),
    )
    .unwrap();

    let dense = Dense::new(&obs, prediction.as_ref(), correlation.as_ref());
    let (h, var_h) = dense.event_term();
    let bias = field.bias();
    assert!((bias.h - h).abs() < 1e-9, "h {} vs {h}", bias.h);
    assert!((bias.sigma_h * bias.sigma_h - var_h).abs() < 1e-9);

    let widened = dense.phi.map(|phi| (phi * phi + 0.55 * 0.55 * var_h).sqrt());
    let inverse = dense
        .covariance(&widened)
        .try_inverse()
        .expect("widened covariance should be invertible");
    let weights = &inverse * (&dense.residuals - &dense.tau * h);
    let metric = DistanceMetric::Euclidean;

    for (query, outcome) in queries.iter().zip(field.estimate_all(queries).unwrap()) {
        let estimate = outcome.unwrap();
        let p = prediction.predict(&query.location, query.imt);
        let phi_q = (p.phi * p.phi + p.tau * p.tau * var_h).sqrt();
        let k = DVector::from_fn(obs.len(), |i, _| {
            correlation.correlation(
                metric.distance(&query.location, obs[i].location()),
                query.imt,
                obs[i].imt(),
            ) * phi_q
                * widened[i]
        });
        let mean = p.mean + p.tau * h + k.dot(&weights);
        let std_dev = (phi_q * phi_q - k.dot(&(&inverse * &k))).max(0.0).sqrt();
        assert!(
            (estimate.mean - mean).abs() < 1e-8,
            "mean at {:?} {}: {} vs {mean}",
            query.location,
            query.imt,
            estimate.mean
        );
        assert!(
            (estimate.std_dev - std_dev).abs() < 1e-6,
            "std at {:?} {}: {} vs {std_dev}",
            query.location,
            query.imt,
            estimate.std_dev
        );
    }
}

#[test]
fn matches_dense_evaluation_for_mixed_periods() {
    init_tracing();
    let points = [
        (-12.0, 0.3, 0.2, Imt::Sa(1.0)),
        (-4.0, -0.1, 0.1, Imt::Sa(0.3)),
        (5.0, 0.8, 0.4, Imt::Pga),
        (30.0, -0.6, 0.3, Imt::Sa(3.0)),
    ];
    let queries: Vec<_> = [-40.0, -12.0, 0.0, 7.5, 30.0, 90.0]
        .into_iter()
        .flat_map(|x| {
            [Imt::Pga, Imt::Sa(0.3), Imt::Sa(1.0), Imt::Sa(3.0)]
                .into_iter()
                .map(move |imt| QueryPoint::new(Location::on_line(x), imt))
        })
        .collect();
    check(&points, Arc::new(ValidationCorrelation::default()), &queries);
    check(&points, Arc::new(GodaAtkinson2010), &queries);
}

#[test]
fn exact_observations_are_interpolated() {
    init_tracing();
    let points = [(-10.0, 0.4, 0.0, Imt::Sa(1.0)), (10.0, -0.9, 0.0, Imt::Sa(1.0))];
    let queries = [
        QueryPoint::new(Location::on_line(-10.0), Imt::Sa(1.0)),
        QueryPoint::new(Location::on_line(10.0), Imt::Sa(1.0)),
    ];
    check(&points, Arc::new(ValidationCorrelation::default()), &queries);
    let obs = points
        .iter()
        .enumerate()
        .map(|(i, &(x, amp, sigma, imt))| {
            Observation::new(format!("s{i}"), Location::on_line(x), imt, amp, sigma).unwrap()
        })
        .collect();
    let field = ConditionalField::new(
        EngineConfig::default(),
        ObservationSet::new(obs, DistanceMetric::Euclidean).unwrap(),
        Arc::new(ConstantPrediction::new(-0.7, 0.55, 0.75)),
        Arc::new(ValidationCorrelation::default()),
    )
    .unwrap();
    let at_first = field.estimate(&queries[0]).unwrap();
    assert!((at_first.mean - 0.4).abs() < 1e-9);
    assert_eq!(at_first.std_dev, 0.0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_sets_match_dense_evaluation(
        points in prop::collection::vec((-60.0f64..60.0, -2.0f64..2.0, 0.05f64..1.0), 1..8),
        xs in prop::collection::vec(-120.0f64..120.0, 1..10),
    ) {
        let points: Vec<_> = points.into_iter().map(|(x, a, s)| (x, a, s, Imt::Sa(1.0))).collect();
        let queries: Vec<_> = xs
            .into_iter()
            .map(|x| QueryPoint::new(Location::on_line(x), Imt::Sa(1.0)))
            .collect();
        check(&points, Arc::new(ValidationCorrelation::default()), &queries);
    }
}
