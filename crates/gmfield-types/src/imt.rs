//! Intensity measure types.

use std::fmt;
use std::str::FromStr;

use gmfield_error::ValidationError;
use serde::{Deserialize, Serialize};

/// Period assigned to PGA when forming period ratios.
pub const PGA_PERIOD: f64 = 0.01;
/// Period assigned to PGV when forming period ratios.
pub const PGV_PERIOD: f64 = 1.0;

/// Intensity measure type of an observation or query.
///
/// Serialized as `"PGA"`, `"PGV"` or `"SA(<period>)"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Imt {
    Pga,
    Pgv,
    /// Pseudo-spectral acceleration at the given period in seconds.
    Sa(f64),
}

impl Imt {
    /// Spectral period used by correlation models.
    #[must_use]
    pub const fn period(self) -> f64 {
        match self {
            Self::Pga => PGA_PERIOD,
            Self::Pgv => PGV_PERIOD,
            Self::Sa(period) => period,
        }
    }

    pub fn validate(self, what: &str) -> Result<(), ValidationError> {
        let period = self.period();
        if period.is_finite() && period > 0.0 {
            Ok(())
        } else {
            Err(ValidationError::InvalidPeriod {
                what: what.to_owned(),
                period,
            })
        }
    }
}

impl fmt::Display for Imt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pga => f.write_str("PGA"),
            Self::Pgv => f.write_str("PGV"),
            Self::Sa(period) => write!(f, "SA({period})"),
        }
    }
}

impl FromStr for Imt {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "PGA" => return Ok(Self::Pga),
            "PGV" => return Ok(Self::Pgv),
            _ => {}
        }
        let inner = trimmed
            .strip_prefix("SA(")
            .or_else(|| trimmed.strip_prefix("sa("))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| ValidationError::UnsupportedImt(trimmed.to_owned()))?;
        let period: f64 = inner
            .trim()
            .parse()
            .map_err(|_| ValidationError::UnsupportedImt(trimmed.to_owned()))?;
        let imt = Self::Sa(period);
        imt.validate(trimmed)?;
        Ok(imt)
    }
}

impl TryFrom<String> for Imt {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Imt> for String {
    fn from(imt: Imt) -> Self {
        imt.to_string()
    }
}
