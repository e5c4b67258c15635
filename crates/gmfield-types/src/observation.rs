//! Observations and the validated set a conditioning run consumes.

use gmfield_error::ValidationError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::imt::Imt;
use crate::location::{DistanceMetric, Location, validate_dimensions};

/// Wire form of an observation, as it appears in scenario files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    #[serde(default)]
    pub id: String,
    pub location: Location,
    pub imt: Imt,
    /// Natural-log amplitude.
    pub amplitude: f64,
    /// Measurement standard deviation in natural-log units.
    #[serde(default)]
    pub sigma: f64,
}

/// A validated ground-motion observation.
///
/// Fields are read-only once constructed; see [`Observation::new`] for the
/// checks applied at ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ObservationRecord", into = "ObservationRecord")]
pub struct Observation {
    id: String,
    location: Location,
    imt: Imt,
    amplitude: f64,
    sigma: f64,
}

impl Observation {
    pub fn new(
        id: impl Into<String>,
        location: Location,
        imt: Imt,
        amplitude: f64,
        sigma: f64,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        if !amplitude.is_finite() {
            return Err(ValidationError::NonFiniteAmplitude { id, amplitude });
        }
        if !sigma.is_finite() {
            return Err(ValidationError::NonFiniteSigma { id, sigma });
        }
        if sigma < 0.0 {
            return Err(ValidationError::NegativeSigma { id, sigma });
        }
        let what = format!("observation {id}");
        location.validate(&what)?;
        imt.validate(&what)?;
        Ok(Self {
            id,
            location,
            imt,
            amplitude,
            sigma,
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn location(&self) -> &Location {
        &self.location
    }

    #[must_use]
    pub const fn imt(&self) -> Imt {
        self.imt
    }

    #[must_use]
    pub const fn period(&self) -> f64 {
        self.imt.period()
    }

    #[must_use]
    pub const fn amplitude(&self) -> f64 {
        self.amplitude
    }

    #[must_use]
    pub const fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl TryFrom<ObservationRecord> for Observation {
    type Error = ValidationError;

    fn try_from(record: ObservationRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.id,
            record.location,
            record.imt,
            record.amplitude,
            record.sigma,
        )
    }
}

impl From<Observation> for ObservationRecord {
    fn from(obs: Observation) -> Self {
        Self {
            id: obs.id,
            location: obs.location,
            imt: obs.imt,
            amplitude: obs.amplitude,
            sigma: obs.sigma,
        }
    }
}

/// The full, validated observation set of one event.
///
/// All observations share one coordinate dimension compatible with the
/// event's distance metric. An empty set is valid.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSet {
    observations: Vec<Observation>,
    metric: DistanceMetric,
    dimension: Option<usize>,
}

impl ObservationSet {
    pub fn new(
        observations: Vec<Observation>,
        metric: DistanceMetric,
    ) -> Result<Self, ValidationError> {
        let dimension = validate_dimensions(
            metric,
            observations.iter().map(|o| (o.id(), o.location())),
        )?;
        debug!(
            count = observations.len(),
            ?metric,
            ?dimension,
            "observation set ingested"
        );
        Ok(Self {
            observations,
            metric,
            dimension,
        })
    }

    /// Build from wire records, rejecting the whole set on the first bad one.
    pub fn from_records(
        records: Vec<ObservationRecord>,
        metric: DistanceMetric,
    ) -> Result<Self, ValidationError> {
        let observations = records
            .into_iter()
            .enumerate()
            .map(|(index, mut record)| {
                if record.id.is_empty() {
                    record.id = format!("obs-{index}");
                }
                Observation::try_from(record)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(observations, metric)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Observation] {
        &self.observations
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    #[must_use]
    pub const fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Coordinate dimension shared by the set, `None` when it is empty and
    /// the metric does not fix one.
    #[must_use]
    pub const fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Check that a query location is compatible with this set.
    pub fn check_query(&self, what: &str, location: &Location) -> Result<(), ValidationError> {
        location.validate(what)?;
        match self.dimension {
            Some(expected) if expected != location.dimension() => {
                Err(ValidationError::DimensionMismatch {
                    what: what.to_owned(),
                    expected,
                    actual: location.dimension(),
                })
            }
            _ => Ok(()),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }
}

impl<'a> IntoIterator for &'a ObservationSet {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}
