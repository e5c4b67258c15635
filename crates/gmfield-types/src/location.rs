//! Point locations and the distance metrics used between them.

use gmfield_error::ValidationError;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Mean Earth radius in kilometres, used by [`DistanceMetric::Haversine`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// An N-dimensional location.
///
/// Validation scenarios place everything on a 1-D line measured in km.
/// Geographic runs use `[lat, lon]` in degrees together with
/// [`DistanceMetric::Haversine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location {
    coords: SmallVec<[f64; 3]>,
}

impl Location {
    pub fn new(coords: impl IntoIterator<Item = f64>) -> Self {
        Self {
            coords: coords.into_iter().collect(),
        }
    }

    /// A point on a 1-D line, `x` km from the origin.
    pub fn on_line(x: f64) -> Self {
        Self::new([x])
    }

    /// A geographic point in decimal degrees.
    pub fn geographic(lat: f64, lon: f64) -> Self {
        Self::new([lat, lon])
    }

    #[must_use]
    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.coords.len()
    }

    /// Reject NaN/infinite coordinates and zero-dimensional points.
    pub fn validate(&self, what: &str) -> Result<(), ValidationError> {
        if self.coords.is_empty() {
            return Err(ValidationError::DimensionMismatch {
                what: what.to_owned(),
                expected: 1,
                actual: 0,
            });
        }
        for (axis, &value) in self.coords.iter().enumerate() {
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteCoordinate {
                    what: what.to_owned(),
                    axis,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// How separation distance is measured between two locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Straight-line distance in the coordinate units (km).
    #[default]
    Euclidean,
    /// Great-circle distance in km between `[lat, lon]` points.
    Haversine,
}

impl DistanceMetric {
    /// Dimension this metric insists on, if any.
    #[must_use]
    pub const fn required_dimension(self) -> Option<usize> {
        match self {
            Self::Euclidean => None,
            Self::Haversine => Some(2),
        }
    }

    /// Distance between two locations of equal dimension.
    ///
    /// Callers validate dimensions at ingestion; extra trailing coordinates of
    /// the longer point are ignored here.
    #[must_use]
    pub fn distance(self, a: &Location, b: &Location) -> f64 {
        match self {
            Self::Euclidean => a
                .coords
                .iter()
                .zip(b.coords.iter())
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f64>()
                .sqrt(),
            Self::Haversine => {
                let (lat1, lon1) = (a.coords[0].to_radians(), a.coords[1].to_radians());
                let (lat2, lon2) = (b.coords[0].to_radians(), b.coords[1].to_radians());
                let dlat = lat2 - lat1;
                let dlon = lon2 - lon1;
                let h = (dlat / 2.0).sin().powi(2)
                    + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
                2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
            }
        }
    }
}

/// Check that every location in `points` has the dimension of the first one
/// and satisfies the metric's own requirement.
pub fn validate_dimensions<'a>(
    metric: DistanceMetric,
    points: impl IntoIterator<Item = (&'a str, &'a Location)>,
) -> Result<Option<usize>, ValidationError> {
    let mut expected = metric.required_dimension();
    for (what, location) in points {
        location.validate(what)?;
        match expected {
            None => expected = Some(location.dimension()),
            Some(dim) if dim != location.dimension() => {
                return Err(ValidationError::DimensionMismatch {
                    what: what.to_owned(),
                    expected: dim,
                    actual: location.dimension(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean_distance_on_line() {
        let d = DistanceMetric::Euclidean.distance(&Location::on_line(-3.0), &Location::on_line(4.5));
        assert!((d - 7.5).abs() < 1e-12);
    }

    #[test]
    fn euclidean_distance_in_plane() {
        let d = DistanceMetric::Euclidean.distance(&Location::new([0.0, 0.0]), &Location::new([3.0, 4.0]));
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn haversine_one_degree_of_latitude() {
        let d = DistanceMetric::Haversine
            .distance(&Location::geographic(34.0, -118.0), &Location::geographic(35.0, -118.0));
        // 2 * pi * R / 360
        assert!((d - 111.194_926_6).abs() < 1e-4, "got {d}");
    }

    #[test]
    fn non_finite_coordinate_rejected() {
        let err = Location::new([1.0, f64::NAN]).validate("query").unwrap_err();
        assert!(matches!(err, ValidationError::NonFiniteCoordinate { axis: 1, .. }));
    }

    #[test]
    fn mixed_dimensions_rejected() {
        let a = Location::on_line(0.0);
        let b = Location::new([0.0, 1.0]);
        let err = validate_dimensions(DistanceMetric::Euclidean, [("a", &a), ("b", &b)]).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::DimensionMismatch { expected: 1, actual: 2, .. }
        ));
    }

    #[test]
    fn haversine_requires_two_coordinates() {
        let a = Location::on_line(0.0);
        let err = validate_dimensions(DistanceMetric::Haversine, [("a", &a)]).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::DimensionMismatch { expected: 2, actual: 1, .. }
        ));
    }

    #[test]
    fn location_serializes_as_plain_array() {
        let json = serde_json::to_string(&Location::new([1.5, -2.0])).unwrap();
        assert_eq!(json, "[1.5,-2.0]");
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn euclidean_is_symmetric_and_non_negative(
                a in proptest::collection::vec(-500.0f64..500.0, 2),
                b in proptest::collection::vec(-500.0f64..500.0, 2),
            ) {
                let (la, lb) = (Location::new(a), Location::new(b));
                let ab = DistanceMetric::Euclidean.distance(&la, &lb);
                let ba = DistanceMetric::Euclidean.distance(&lb, &la);
                prop_assert!(ab >= 0.0);
                prop_assert_eq!(ab, ba);
                prop_assert_eq!(DistanceMetric::Euclidean.distance(&la, &la), 0.0);
            }

            #[test]
            fn haversine_is_symmetric(
                lat1 in -80.0f64..80.0, lon1 in -179.0f64..179.0,
                lat2 in -80.0f64..80.0, lon2 in -179.0f64..179.0,
            ) {
                let a = Location::geographic(lat1, lon1);
                let b = Location::geographic(lat2, lon2);
                let ab = DistanceMetric::Haversine.distance(&a, &b);
                let ba = DistanceMetric::Haversine.distance(&b, &a);
                prop_assert!((ab - ba).abs() < 1e-9);
                prop_assert!(ab <= std::f64::consts::PI * EARTH_RADIUS_KM + 1e-6);
            }
        }
    }
}
