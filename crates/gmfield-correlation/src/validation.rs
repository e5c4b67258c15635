//! Synthetic correlation model used by the validation scenarios.

use gmfield_types::Imt;

use crate::{CorrelationModel, period_ratio};

/// Decay length of the validation model, km.
pub const DEFAULT_LENGTH_SCALE_KM: f64 = 10.0;

/// `rho(h, Ts, Tl) = (Ts / Tl) * exp(-h / L)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationCorrelation {
    length_scale_km: f64,
}

impl Default for ValidationCorrelation {
    fn default() -> Self {
        Self::new(DEFAULT_LENGTH_SCALE_KM)
    }
}

impl ValidationCorrelation {
    #[must_use]
    pub const fn new(length_scale_km: f64) -> Self {
        Self { length_scale_km }
    }

    #[must_use]
    pub const fn length_scale_km(&self) -> f64 {
        self.length_scale_km
    }

    /// Correlation for a precomputed period ratio in `(0, 1]`.
    #[must_use]
    pub fn correlation_at_ratio(&self, distance: f64, ratio: f64) -> f64 {
        if distance <= 0.0 {
            return ratio;
        }
        ratio * (-distance / self.length_scale_km).exp()
    }
}

impl CorrelationModel for ValidationCorrelation {
    fn name(&self) -> &'static str {
        "validation"
    }

    fn correlation(&self, distance: f64, a: Imt, b: Imt) -> f64 {
        self.correlation_at_ratio(distance, period_ratio(a.period(), b.period()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn unit_at_zero_distance_same_period() {
        let model = ValidationCorrelation::default();
        assert_eq!(model.correlation(0.0, Imt::Sa(1.0), Imt::Sa(1.0)), 1.0);
        assert_eq!(model.correlation_at_ratio(0.0, 1.0), 1.0);
    }

    #[test]
    fn one_length_scale_gives_inverse_e() {
        let model = ValidationCorrelation::default();
        let rho = model.correlation(10.0, Imt::Sa(1.0), Imt::Sa(1.0));
        assert!((rho - (-1.0f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn spectral_factor_is_period_ratio() {
        let model = ValidationCorrelation::default();
        let rho = model.correlation(0.0, Imt::Sa(0.5), Imt::Sa(2.0));
        assert!((rho - 0.25).abs() < 1e-15);
    }

    proptest! {
        #[test]
        fn symmetric_bounded_and_decaying(
            h in 0.0f64..200.0,
            dh in 0.0f64..50.0,
            ta in 0.01f64..10.0,
            tb in 0.01f64..10.0,
        ) {
            let model = ValidationCorrelation::default();
            let (a, b) = (Imt::Sa(ta), Imt::Sa(tb));
            let rho = model.correlation(h, a, b);
            prop_assert!((0.0..=1.0).contains(&rho));
            prop_assert_eq!(rho, model.correlation(h, b, a));
            prop_assert!(model.correlation(h + dh, a, b) <= rho);
        }
    }
}
