//! Core data model for conditional ground-motion field estimation.
//!
//! Everything here is plain data: observations are validated once at
//! ingestion and never mutated afterwards, predictions and estimates are
//! `Copy`/`Clone` records that serialize with serde.

pub mod estimate;
pub mod imt;
pub mod location;
pub mod observation;

pub use estimate::{ConditionalEstimate, PredictionPoint, QueryPoint};
pub use imt::{Imt, PGA_PERIOD, PGV_PERIOD};
pub use location::{DistanceMetric, EARTH_RADIUS_KM, Location, validate_dimensions};
pub use observation::{Observation, ObservationRecord, ObservationSet};
