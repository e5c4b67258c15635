//! Expected-value checks evaluated against a scenario's output.

use gmfield_types::{Imt, Location};
use serde::{Deserialize, Serialize};

use crate::report::{CheckOutcome, SeriesPoint};

/// Coordinates closer than this identify the same output location.
const LOCATION_MATCH_KM: f64 = 1e-9;

/// One expectation about a scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Expectation {
    /// Event bias `tau * h`.
    Bias { value: f64, tolerance: f64 },
    /// Bias standard deviation `tau * sigma_h`.
    BiasStdDev { value: f64, tolerance: f64 },
    /// Conditional mean at one output point.
    MeanAt {
        location: Location,
        imt: Imt,
        value: f64,
        tolerance: f64,
    },
    /// Conditional standard deviation at one output point.
    StdDevAt {
        location: Location,
        imt: Imt,
        value: f64,
        tolerance: f64,
    },
    /// Largest conditional mean over the series.
    PeakMean { value: f64, tolerance: f64 },
    /// Smallest conditional standard deviation over the series.
    MinStdDev { value: f64, tolerance: f64 },
    /// Largest conditional standard deviation over the series.
    MaxStdDev { value: f64, tolerance: f64 },
    /// Every conditional mean equals `value`.
    MeanEverywhere { value: f64, tolerance: f64 },
    /// Conditional standard deviation inside `[lower, upper]`, or
    /// `(lower, upper)` when `strict`, at `location` or everywhere.
    StdDevBounds {
        lower: f64,
        upper: f64,
        #[serde(default)]
        strict: bool,
        #[serde(default)]
        location: Option<Location>,
    },
}

/// What an expectation is checked against.
#[derive(Debug, Clone, Copy)]
pub struct CheckInput<'a> {
    pub bias: f64,
    pub bias_std: f64,
    pub series: &'a [SeriesPoint],
}

impl Expectation {
    /// Short label used in reports.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Bias { .. } => "bias",
            Self::BiasStdDev { .. } => "bias_std_dev",
            Self::MeanAt { .. } => "mean_at",
            Self::StdDevAt { .. } => "std_dev_at",
            Self::PeakMean { .. } => "peak_mean",
            Self::MinStdDev { .. } => "min_std_dev",
            Self::MaxStdDev { .. } => "max_std_dev",
            Self::MeanEverywhere { .. } => "mean_everywhere",
            Self::StdDevBounds { .. } => "std_dev_bounds",
        }
    }

    #[must_use]
    pub fn evaluate(&self, input: &CheckInput<'_>) -> CheckOutcome {
        match self {
            Self::Bias { value, tolerance } => self.near(input.bias, *value, *tolerance, None),
            Self::BiasStdDev { value, tolerance } => {
                self.near(input.bias_std, *value, *tolerance, None)
            }
            Self::MeanAt {
                location,
                imt,
                value,
                tolerance,
            } => {
                let actual = find(input.series, location, *imt).map_or(f64::NAN, |p| p.mean);
                self.near(actual, *value, *tolerance, Some(describe(location, *imt)))
            }
            Self::StdDevAt {
                location,
                imt,
                value,
                tolerance,
            } => {
                let actual = find(input.series, location, *imt).map_or(f64::NAN, |p| p.std_dev);
                self.near(actual, *value, *tolerance, Some(describe(location, *imt)))
            }
            Self::PeakMean { value, tolerance } => {
                let actual = fold(input.series, |p| p.mean, f64::max);
                self.near(actual, *value, *tolerance, None)
            }
            Self::MinStdDev { value, tolerance } => {
                let actual = fold(input.series, |p| p.std_dev, f64::min);
                self.near(actual, *value, *tolerance, None)
            }
            Self::MaxStdDev { value, tolerance } => {
                let actual = fold(input.series, |p| p.std_dev, f64::max);
                self.near(actual, *value, *tolerance, None)
            }
            Self::MeanEverywhere { value, tolerance } => {
                // Report the worst point.
                let actual = input
                    .series
                    .iter()
                    .map(|p| p.mean)
                    .max_by(|a, b| (a - value).abs().total_cmp(&(b - value).abs()))
                    .unwrap_or(f64::NAN);
                self.near(actual, *value, *tolerance, None)
            }
            Self::StdDevBounds {
                lower,
                upper,
                strict,
                location,
            } => {
                let inside = |s: f64| {
                    if *strict {
                        s > *lower && s < *upper
                    } else {
                        s >= *lower && s <= *upper
                    }
                };
                let selected: Vec<&SeriesPoint> = input
                    .series
                    .iter()
                    .filter(|p| location.as_ref().is_none_or(|l| same_location(&p.location, l)))
                    .collect();
                let offender = selected.iter().map(|p| p.std_dev).find(|&s| !inside(s));
                let actual = offender
                    .or_else(|| selected.first().map(|p| p.std_dev))
                    .unwrap_or(f64::NAN);
                let (open, close) = if *strict { ('(', ')') } else { ('[', ']') };
                CheckOutcome {
                    name: self.name().to_owned(),
                    expected: format!("{open}{lower}, {upper}{close}"),
                    actual,
                    passed: !selected.is_empty() && offender.is_none(),
                    at: location.as_ref().map(|l| format!("{:?}", l.coords())),
                }
            }
        }
    }

    fn near(&self, actual: f64, value: f64, tolerance: f64, at: Option<String>) -> CheckOutcome {
        CheckOutcome {
            name: self.name().to_owned(),
            expected: format!("{value} ± {tolerance}"),
            actual,
            passed: (actual - value).abs() <= tolerance,
            at,
        }
    }
}

fn same_location(a: &Location, b: &Location) -> bool {
    a.dimension() == b.dimension()
        && a.coords()
            .iter()
            .zip(b.coords())
            .all(|(x, y)| (x - y).abs() <= LOCATION_MATCH_KM)
}

fn find<'a>(series: &'a [SeriesPoint], location: &Location, imt: Imt) -> Option<&'a SeriesPoint> {
    series
        .iter()
        .find(|p| p.imt == imt && same_location(&p.location, location))
}

fn fold(series: &[SeriesPoint], value: impl Fn(&SeriesPoint) -> f64, pick: fn(f64, f64) -> f64) -> f64 {
    series.iter().map(value).reduce(pick).unwrap_or(f64::NAN)
}

fn describe(location: &Location, imt: Imt) -> String {
    format!("{:?} {imt}", location.coords())
}
