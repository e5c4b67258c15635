//! The canonical validation scenarios `0001`-`0012`.
//!
//! All use the validation prior (mean 0, tau 0.6, phi 0.8), the validation
//! correlation `(Ts/Tl) * exp(-h / 10)` and 1-D Euclidean distances in km.
//! Expected values are the bias-then-field conditioning results for each
//! configuration, with the within-event variance widened by the bias
//! variance.
//!
//! | id   | what it exercises                                              |
//! |------|----------------------------------------------------------------|
//! | 0001 | two zero residuals: flat mean, exact interpolation of sigma     |
//! | 0002 | +1 / -1 pair: bias cancels, mean interpolates both              |
//! | 0003 | single +1: bias 0.36, bias std 0.48                             |
//! | 0004 | two co-located +1: identical to 0003                            |
//! | 0005 | spectrum at a single SA(1) observation                          |
//! | 0006 | dense same-sign network: far-field sigma below 0003             |
//! | 0007 | dense alternating network: bias cancels                         |
//! | 0008 | single +1 with measurement sigma 0.5                            |
//! | 0009 | spectrum constrained at two periods of opposite sign            |
//! | 0010 | co-located observations with unequal measurement sigma          |
//! | 0011 | irregular mixed network                                         |
//! | 0012 | exact plus near-duplicate observations (pseudo-inverse path)    |

use gmfield_correlation::CorrelationConfig;
use gmfield_types::{DistanceMetric, Imt, Location, ObservationRecord, QueryPoint};

use crate::expect::Expectation;
use crate::scenario::{PriorConfig, QueryGrid, ScenarioConfig};

pub const CATALOG_IDS: [&str; 12] = [
    "0001", "0002", "0003", "0004", "0005", "0006", "0007", "0008", "0009", "0010", "0011", "0012",
];

const EXACT: f64 = 1e-6;
const PERIOD: f64 = 1.0;
const FAR: f64 = 300.0;
/// Far-field sigma for one exact observation: `sqrt(0.8^2 + 0.6^2 * 0.64)`.
const SINGLE_FAR_STD: f64 = 0.932_952_303_175_248;

/// Spectral periods used by the spectrum scenarios.
const PERIODS: [f64; 17] = [
    0.01, 0.02, 0.03, 0.05, 0.075, 0.1, 0.15, 0.2, 0.3, 0.5, 0.75, 1.0, 1.5, 2.0, 3.0, 5.0, 10.0,
];

/// All canonical scenarios, in id order.
#[must_use]
pub fn catalog() -> Vec<ScenarioConfig> {
    vec![
        zero_pair(),
        opposite_pair(),
        single(),
        co_located_pair(),
        single_spectrum(),
        dense_same_sign(),
        dense_alternating(),
        noisy_single(),
        two_period_spectrum(),
        unequal_sigma_stack(),
        irregular_network(),
        near_duplicates(),
    ]
}

/// One canonical scenario by id.
#[must_use]
pub fn scenario(id: &str) -> Option<ScenarioConfig> {
    catalog().into_iter().find(|s| s.id == id)
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

fn obs(x: f64, imt: Imt, amplitude: f64, sigma: f64) -> ObservationRecord {
    ObservationRecord {
        id: String::new(),
        location: Location::on_line(x),
        imt,
        amplitude,
        sigma,
    }
}

fn sa1(x: f64, amplitude: f64, sigma: f64) -> ObservationRecord {
    obs(x, Imt::Sa(PERIOD), amplitude, sigma)
}

fn profile(step: f64) -> QueryGrid {
    QueryGrid::Line {
        start: -FAR,
        end: FAR,
        step,
        imt: Imt::Sa(PERIOD),
    }
}

fn spectrum() -> QueryGrid {
    QueryGrid::Spectrum {
        location: Location::on_line(0.0),
        periods: PERIODS.to_vec(),
    }
}

fn build(
    id: &str,
    description: &str,
    observations: Vec<ObservationRecord>,
    grid: QueryGrid,
    expectations: Vec<Expectation>,
) -> ScenarioConfig {
    ScenarioConfig {
        id: id.to_owned(),
        description: description.to_owned(),
        observations,
        prior: PriorConfig::default(),
        correlation: CorrelationConfig::default(),
        metric: DistanceMetric::Euclidean,
        grid,
        attach_mmi: false,
        expectations,
    }
}

fn bias(value: f64, tolerance: f64) -> Expectation {
    Expectation::Bias { value, tolerance }
}

fn mean_at(x: f64, imt: Imt, value: f64, tolerance: f64) -> Expectation {
    Expectation::MeanAt {
        location: Location::on_line(x),
        imt,
        value,
        tolerance,
    }
}

fn std_at(x: f64, imt: Imt, value: f64, tolerance: f64) -> Expectation {
    Expectation::StdDevAt {
        location: Location::on_line(x),
        imt,
        value,
        tolerance,
    }
}

fn within_prior() -> Expectation {
    Expectation::StdDevBounds {
        lower: 0.0,
        upper: 1.0,
        strict: false,
        location: None,
    }
}

/// Checks shared by 0003 and 0004.
fn single_checks() -> Vec<Expectation> {
    let sa = Imt::Sa(PERIOD);
    vec![
        bias(0.36, EXACT),
        Expectation::BiasStdDev {
            value: 0.48,
            tolerance: EXACT,
        },
        mean_at(0.0, sa, 1.0, EXACT),
        std_at(0.0, sa, 0.0, EXACT),
        mean_at(FAR, sa, 0.36, EXACT),
        std_at(FAR, sa, 0.93, 0.01),
        Expectation::MaxStdDev {
            value: SINGLE_FAR_STD,
            tolerance: EXACT,
        },
        within_prior(),
    ]
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

fn zero_pair() -> ScenarioConfig {
    let sa = Imt::Sa(PERIOD);
    build(
        "0001",
        "two observations with zero residual",
        vec![sa1(-20.0, 0.0, 0.0), sa1(20.0, 0.0, 0.0)],
        profile(1.0),
        vec![
            bias(0.0, EXACT),
            Expectation::MeanEverywhere {
                value: 0.0,
                tolerance: EXACT,
            },
            std_at(-20.0, sa, 0.0, EXACT),
            std_at(20.0, sa, 0.0, EXACT),
            Expectation::StdDevBounds {
                lower: 0.8,
                upper: 1.0,
                strict: true,
                location: Some(Location::on_line(FAR)),
            },
        ],
    )
}

fn opposite_pair() -> ScenarioConfig {
    let sa = Imt::Sa(PERIOD);
    build(
        "0002",
        "observations of +1 and -1",
        vec![sa1(-20.0, 1.0, 0.0), sa1(20.0, -1.0, 0.0)],
        profile(1.0),
        vec![
            bias(0.0, EXACT),
            mean_at(-20.0, sa, 1.0, EXACT),
            mean_at(20.0, sa, -1.0, EXACT),
            std_at(-20.0, sa, 0.0, EXACT),
            mean_at(FAR, sa, 0.0, EXACT),
            mean_at(-FAR, sa, 0.0, EXACT),
            within_prior(),
        ],
    )
}

fn single() -> ScenarioConfig {
    build(
        "0003",
        "single observation of +1",
        vec![sa1(0.0, 1.0, 0.0)],
        profile(1.0),
        single_checks(),
    )
}

fn co_located_pair() -> ScenarioConfig {
    build(
        "0004",
        "two co-located observations of +1",
        vec![sa1(0.0, 1.0, 0.0), sa1(0.0, 1.0, 0.0)],
        profile(1.0),
        single_checks(),
    )
}

fn single_spectrum() -> ScenarioConfig {
    build(
        "0005",
        "spectrum at a single SA(1) observation of +1",
        vec![sa1(0.0, 1.0, 0.0)],
        spectrum(),
        vec![
            bias(0.36, EXACT),
            mean_at(0.0, Imt::Sa(1.0), 1.0, EXACT),
            std_at(0.0, Imt::Sa(1.0), 0.0, EXACT),
            Expectation::PeakMean {
                value: 1.0,
                tolerance: EXACT,
            },
            mean_at(0.0, Imt::Sa(0.1), 0.424, EXACT),
            std_at(0.0, Imt::Sa(0.1), 0.9282758, EXACT),
            mean_at(0.0, Imt::Sa(10.0), 0.424, EXACT),
            mean_at(0.0, Imt::Sa(3.0), 0.5733333, EXACT),
            std_at(0.0, Imt::Sa(3.0), 0.8795959, EXACT),
            within_prior(),
        ],
    )
}

fn dense_same_sign() -> ScenarioConfig {
    let sa = Imt::Sa(PERIOD);
    build(
        "0006",
        "21 observations of +1 every 5 km",
        (-10..=10).map(|i| sa1(5.0 * f64::from(i), 1.0, 0.0)).collect(),
        profile(0.5),
        vec![
            bias(0.7684024, EXACT),
            Expectation::BiasStdDev {
                value: 0.2887475,
                tolerance: EXACT,
            },
            mean_at(0.0, sa, 1.0, EXACT),
            std_at(0.0, sa, 0.0, EXACT),
            mean_at(2.5, sa, 0.9929464, EXACT),
            std_at(2.5, sa, 0.4209134, EXACT),
            mean_at(FAR, sa, 0.7684024, EXACT),
            std_at(FAR, sa, 0.8505146, EXACT),
            within_prior(),
        ],
    )
}

fn dense_alternating() -> ScenarioConfig {
    let sa = Imt::Sa(PERIOD);
    build(
        "0007",
        "20 observations alternating +1 and -1 every 5 km",
        (0..20)
            .map(|i| {
                let amplitude = if i % 2 == 0 { 1.0 } else { -1.0 };
                sa1(-47.5 + 5.0 * f64::from(i), amplitude, 0.0)
            })
            .collect(),
        profile(0.5),
        vec![
            bias(0.0, EXACT),
            Expectation::BiasStdDev {
                value: 0.2934672,
                tolerance: EXACT,
            },
            mean_at(-47.5, sa, 1.0, EXACT),
            mean_at(-42.5, sa, -1.0, EXACT),
            mean_at(0.0, sa, 0.0, EXACT),
            std_at(0.0, sa, 0.4217121, EXACT),
            std_at(FAR, sa, 0.8521285, EXACT),
            within_prior(),
        ],
    )
}

fn noisy_single() -> ScenarioConfig {
    let tolerance = 1e-4;
    build(
        "0008",
        "single observation of +1 with measurement sigma 0.5",
        vec![sa1(0.0, 1.0, 0.5)],
        profile(0.5),
        vec![
            bias(0.288, tolerance),
            Expectation::PeakMean {
                value: 0.84472,
                tolerance,
            },
            Expectation::MinStdDev {
                value: 0.44212,
                tolerance,
            },
            Expectation::MaxStdDev {
                value: 0.94674,
                tolerance,
            },
            within_prior(),
        ],
    )
}

fn two_period_spectrum() -> ScenarioConfig {
    build(
        "0009",
        "SA(0.3) = +1 and SA(3) = -1 at the same site",
        vec![obs(0.0, Imt::Sa(0.3), 1.0, 0.0), obs(0.0, Imt::Sa(3.0), -1.0, 0.0)],
        spectrum(),
        vec![
            bias(0.0, EXACT),
            mean_at(0.0, Imt::Sa(0.3), 1.0, EXACT),
            std_at(0.0, Imt::Sa(0.3), 0.0, EXACT),
            mean_at(0.0, Imt::Sa(3.0), -1.0, EXACT),
            std_at(0.0, Imt::Sa(3.0), 0.0, EXACT),
            mean_at(0.0, Imt::Sa(1.0), -0.0370370, EXACT),
            std_at(0.0, Imt::Sa(1.0), 0.8175184, EXACT),
            mean_at(0.0, Imt::Sa(0.1), 0.3333333, EXACT),
            mean_at(0.0, Imt::Sa(10.0), -0.3, EXACT),
            within_prior(),
        ],
    )
}

fn unequal_sigma_stack() -> ScenarioConfig {
    let sa = Imt::Sa(PERIOD);
    build(
        "0010",
        "three co-located observations of +1 with sigma 0.3, 0.6 and 1.0",
        vec![sa1(0.0, 1.0, 0.3), sa1(0.0, 1.0, 0.6), sa1(0.0, 1.0, 1.0)],
        profile(1.0),
        vec![
            bias(0.3373427, EXACT),
            mean_at(0.0, sa, 0.9529387, EXACT),
            std_at(0.0, sa, 0.2497884, EXACT),
            std_at(FAR, sa, 0.9373135, EXACT),
            Expectation::StdDevBounds {
                lower: 0.0,
                upper: 1.0,
                strict: true,
                location: None,
            },
        ],
    )
}

fn irregular_network() -> ScenarioConfig {
    let sa = Imt::Sa(PERIOD);
    build(
        "0011",
        "nine irregularly spaced observations with mixed sigma",
        vec![
            sa1(-60.0, 0.8, 0.2),
            sa1(-35.0, 0.4, 0.0),
            sa1(-12.0, 1.1, 0.3),
            sa1(-3.0, 0.9, 0.1),
            sa1(8.0, -0.2, 0.0),
            sa1(21.0, 0.3, 0.4),
            sa1(33.0, 0.5, 0.0),
            sa1(47.0, -0.6, 0.2),
            sa1(70.0, 0.2, 0.1),
        ],
        profile(1.0),
        vec![
            bias(0.2808061, EXACT),
            Expectation::BiasStdDev {
                value: 0.2883913,
                tolerance: EXACT,
            },
            mean_at(-35.0, sa, 0.4, EXACT),
            std_at(-35.0, sa, 0.0, EXACT),
            mean_at(8.0, sa, -0.2, EXACT),
            mean_at(0.0, sa, 0.5771618, EXACT),
            std_at(0.0, sa, 0.5451631, EXACT),
            std_at(FAR, sa, 0.8503938, EXACT),
            within_prior(),
        ],
    )
}

fn near_duplicates() -> ScenarioConfig {
    let sa = Imt::Sa(PERIOD);
    let queries = [-50.0, -10.0, -1.0, 0.0, 0.0005, 0.001, 1.0, 10.0, 50.0, FAR]
        .into_iter()
        .map(|x| QueryPoint::new(Location::on_line(x), sa))
        .collect();
    build(
        "0012",
        "two exact duplicates of +1 and a -1 one metre away",
        vec![sa1(0.0, 1.0, 0.0), sa1(0.0, 1.0, 0.0), sa1(0.001, -1.0, 0.0)],
        QueryGrid::Points { queries },
        vec![
            bias(0.0, EXACT),
            mean_at(0.0, sa, 1.0, 1e-4),
            mean_at(0.001, sa, -1.0, 1e-4),
            std_at(0.0, sa, 0.0, 1e-3),
            std_at(FAR, sa, 0.9329501, 1e-4),
            within_prior(),
        ],
    )
}
