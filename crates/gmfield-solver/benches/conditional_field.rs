use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use gmfield_correlation::ValidationCorrelation;
use gmfield_gmpe::ConstantPrediction;
use gmfield_solver::{ConditionalField, EngineConfig};
use gmfield_types::{DistanceMetric, Imt, Location, Observation, ObservationSet, QueryPoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SEED: u64 = 0x5eed_2018;

fn observation_set(rng: &mut StdRng, count: usize) -> ObservationSet {
    let obs = (0..count)
        .map(|i| {
            let location = Location::new([rng.gen_range(-200.0..200.0), rng.gen_range(-200.0..200.0)]);
            let imt = if i % 2 == 0 { Imt::Pga } else { Imt::Sa(1.0) };
            Observation::new(
                format!("sta-{i}"),
                location,
                imt,
                rng.gen_range(-1.5..1.5),
                rng.gen_range(0.0..0.5),
            )
            .expect("random observation should be valid")
        })
        .collect();
    ObservationSet::new(obs, DistanceMetric::Euclidean).expect("observation set should be valid")
}

fn query_grid(side: usize) -> Vec<QueryPoint> {
    let step = 400.0 / side as f64;
    (0..side * side)
        .map(|i| {
            let x = -200.0 + step * (i % side) as f64;
            let y = -200.0 + step * (i / side) as f64;
            QueryPoint::new(Location::new([x, y]), Imt::Sa(1.0))
        })
        .collect()
}

fn build_field(observations: ObservationSet) -> ConditionalField {
    ConditionalField::new(
        EngineConfig::default(),
        observations,
        Arc::new(ConstantPrediction::validation()),
        Arc::new(ValidationCorrelation::default()),
    )
    .expect("field should build")
}

fn bench_field_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("conditional_field_construction");
    for count in [50_usize, 200, 800] {
        let mut rng = StdRng::seed_from_u64(SEED);
        let observations = observation_set(&mut rng, count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &observations, |b, obs| {
            b.iter(|| criterion::black_box(build_field(obs.clone())));
        });
    }
    group.finish();
}

fn bench_query_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("conditional_field_queries");
    let queries = query_grid(64);
    group.throughput(Throughput::Elements(queries.len() as u64));
    for count in [50_usize, 200, 800] {
        let mut rng = StdRng::seed_from_u64(SEED);
        let field = build_field(observation_set(&mut rng, count));
        group.bench_with_input(BenchmarkId::from_parameter(count), &field, |b, field| {
            b.iter(|| {
                let outcomes = field.estimate_all(&queries).expect("queries should validate");
                criterion::black_box(outcomes.len());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_field_construction, bench_query_throughput);
criterion_main!(benches);
