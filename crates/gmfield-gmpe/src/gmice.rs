//! Ground-motion/intensity conversion of Wald et al. (1999).
//!
//! Bilinear in log10 of the peak motion, using either PGA or PGV alone:
//!
//! ```text
//! MMI = C1 * log10(PGM) + C2   for log10(PGM) >= T1
//! MMI = C3 * log10(PGM) + C4   otherwise
//! ```
//!
//! PGA amplitudes are natural-log g (converted to cm/s^2), PGV amplitudes
//! natural-log cm/s. MMI is clipped to `[1, 10]`.

use std::f64::consts::{E, LN_10};

use gmfield_error::ValidationError;
use gmfield_types::Imt;

/// cm/s^2 per g.
const G_CM_S2: f64 = 981.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wald99Coefficients {
    pub c1: f64,
    pub c2: f64,
    pub c3: f64,
    pub c4: f64,
    /// log10(PGM) breakpoint for the forward conversion.
    pub t1: f64,
    /// MMI breakpoint for the inverse conversion.
    pub t2: f64,
    /// Std of MMI given ground motion, MMI units.
    pub sigma_mmi: f64,
    /// Std of log10 ground motion given MMI.
    pub sigma_pgm_log10: f64,
}

const PGA_COEFFS: Wald99Coefficients = Wald99Coefficients {
    c1: 3.66,
    c2: -1.66,
    c3: 2.20,
    c4: 1.00,
    t1: 1.82,
    t2: 5.00,
    sigma_mmi: 1.08,
    sigma_pgm_log10: 0.295,
};

const PGV_COEFFS: Wald99Coefficients = Wald99Coefficients {
    c1: 3.47,
    c2: 2.35,
    c3: 2.10,
    c4: 3.40,
    t1: 0.76,
    t2: 5.00,
    sigma_mmi: 0.98,
    sigma_pgm_log10: 0.282,
};

pub const MMI_MIN: f64 = 1.0;
pub const MMI_MAX: f64 = 10.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Wald99;

impl Wald99 {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        "Wald et al. (1999)"
    }

    pub fn coefficients(imt: Imt) -> Result<Wald99Coefficients, ValidationError> {
        match imt {
            Imt::Pga => Ok(PGA_COEFFS),
            Imt::Pgv => Ok(PGV_COEFFS),
            other @ Imt::Sa(_) => Err(ValidationError::UnsupportedImt(other.to_string())),
        }
    }

    const fn units(imt: Imt) -> f64 {
        match imt {
            Imt::Pga => G_CM_S2,
            _ => 1.0,
        }
    }

    /// MMI and `dMMI / dln(amp)` for a natural-log amplitude.
    pub fn mmi_from_gm(&self, ln_amp: f64, imt: Imt) -> Result<(f64, f64), ValidationError> {
        let c = Self::coefficients(imt)?;
        let lfact = E.log10();
        let lamp = Self::units(imt).log10() + ln_amp * lfact;
        let (mmi, slope) = if lamp >= c.t1 {
            (c.c2 + c.c1 * lamp, c.c1 * lfact)
        } else {
            (c.c4 + c.c3 * lamp, c.c3 * lfact)
        };
        Ok((mmi.clamp(MMI_MIN, MMI_MAX), slope))
    }

    /// Natural-log amplitude and `dln(amp) / dMMI` for an intensity.
    ///
    /// A NaN intensity yields NaN outputs.
    pub fn gm_from_mmi(&self, mmi: f64, imt: Imt) -> Result<(f64, f64), ValidationError> {
        let c = Self::coefficients(imt)?;
        if mmi.is_nan() {
            return Ok((f64::NAN, f64::NAN));
        }
        let lfact = E.log10();
        let (log10_pgm, slope) = if mmi >= c.t2 {
            ((mmi - c.c2) / c.c1, 1.0 / (c.c1 * lfact))
        } else {
            ((mmi - c.c4) / c.c3, 1.0 / (c.c3 * lfact))
        };
        let ln_amp = log10_pgm * LN_10 - Self::units(imt).ln();
        Ok((ln_amp, slope))
    }

    /// Std of the ground-motion to MMI conversion, MMI units.
    pub fn gm_to_mmi_sigma(&self, imt: Imt) -> Result<f64, ValidationError> {
        Ok(Self::coefficients(imt)?.sigma_mmi)
    }

    /// Std of the MMI to ground-motion conversion, natural-log units.
    pub fn mmi_to_gm_sigma(&self, imt: Imt) -> Result<f64, ValidationError> {
        Ok(LN_10 * Self::coefficients(imt)?.sigma_pgm_log10)
    }

    /// Propagate a conditional ground-motion estimate into intensity space:
    /// returns `(mmi, mmi_std)` combining the linearized field uncertainty
    /// with the conversion's own scatter.
    pub fn mmi_with_uncertainty(
        &self,
        ln_amp: f64,
        ln_std: f64,
        imt: Imt,
    ) -> Result<(f64, f64), ValidationError> {
        let (mmi, slope) = self.mmi_from_gm(ln_amp, imt)?;
        let sigma = self.gm_to_mmi_sigma(imt)?;
        Ok((mmi, (slope * ln_std).hypot(sigma)))
    }
}
