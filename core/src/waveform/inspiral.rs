//! Leading-order inspiral SNR.
//!
//! Uses the stationary-phase Newtonian amplitude |h(f)| ∝ Mc^(5/6) f^(-7/6) / D
//! cut off at the innermost stable circular orbit of the redshifted total
//! mass. Spins are validated but do not enter the amplitude at this order.

use super::{DetectorFrameParams, SnrBackend, WaveformError};
use crate::detector::{AntennaResponse, DetectorSite, SensitivityCurve, SkyLocation};
use crate::sampler::ExtrinsicDraw;
use crate::system::chirp_mass;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// G M_sun / c^3 in seconds.
const SOLAR_MASS_SECONDS: f64 = 4.925_491_025_543_576e-6;
/// One megaparsec in light-seconds.
const MPC_SECONDS: f64 = 3.085_677_581_491_367_3e22 / 299_792_458.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspiralBackend {
    /// Smallest supported m_small / m_large.
    pub min_mass_ratio: f64,
    /// Greenwich mean sidereal time (radians) at which antenna patterns are evaluated.
    pub gmst: f64,
}

impl Default for InspiralBackend {
    fn default() -> Self {
        Self {
            min_mass_ratio: 0.01,
            gmst: 0.0,
        }
    }
}

impl InspiralBackend {
    /// Gravitational-wave frequency at the innermost stable circular orbit.
    pub fn isco_frequency(total_mass: f64) -> f64 {
        1.0 / (6.0f64.powf(1.5) * PI * total_mass * SOLAR_MASS_SECONDS)
    }

    pub fn validate(&self, params: &DetectorFrameParams) -> Result<(), WaveformError> {
        let (m1, m2) = (params.mass1, params.mass2);
        if !(m1.is_finite() && m2.is_finite()) {
            return Err(WaveformError::NonFinite("component mass"));
        }
        if m1 <= 0.0 || m2 <= 0.0 {
            return Err(WaveformError::NonPositiveMass(m1, m2));
        }
        let ratio = m1.min(m2) / m1.max(m2);
        if ratio < self.min_mass_ratio {
            return Err(WaveformError::MassRatioOutOfRange {
                ratio,
                minimum: self.min_mass_ratio,
            });
        }
        for spin in [&params.spin1, &params.spin2] {
            let magnitude = spin.iter().map(|c| c * c).sum::<f64>().sqrt();
            if !magnitude.is_finite() {
                return Err(WaveformError::NonFinite("spin"));
            }
            if magnitude > 1.0 {
                return Err(WaveformError::SpinOutOfRange(magnitude));
            }
        }
        Ok(())
    }

    /// SNR of a face-on source directly above the detector at `distance` Mpc.
    pub fn optimal_snr(
        &self,
        params: &DetectorFrameParams,
        distance: f64,
        curve: &SensitivityCurve,
    ) -> Result<f64, WaveformError> {
        self.validate(params)?;
        if !distance.is_finite() {
            return Err(WaveformError::NonFinite("luminosity distance"));
        }
        if distance <= 0.0 {
            return Err(WaveformError::NonPositiveDistance(distance));
        }

        let f_isco = Self::isco_frequency(params.mass1 + params.mass2);
        let moment = curve.chirp_moment(f_isco);
        let mc_seconds = chirp_mass(params.mass1, params.mass2) * SOLAR_MASS_SECONDS;
        let amplitude = (5.0f64 / 24.0).sqrt() * PI.powf(-2.0 / 3.0) * mc_seconds.powf(5.0 / 6.0)
            / (distance * MPC_SECONDS);
        Ok(2.0 * amplitude * moment.sqrt())
    }
}

impl SnrBackend for InspiralBackend {
    fn project_onto_detector(
        &self,
        site: &DetectorSite,
        sky: SkyLocation,
        polarization: f64,
    ) -> AntennaResponse {
        site.antenna_pattern(sky, polarization, self.gmst)
    }

    fn compute_snr(
        &self,
        params: &DetectorFrameParams,
        draw: &ExtrinsicDraw,
        site: &DetectorSite,
        curve: &SensitivityCurve,
    ) -> Result<f64, WaveformError> {
        let optimal = self.optimal_snr(params, draw.luminosity_distance, curve)?;
        let response = self.project_onto_detector(site, draw.sky(), draw.polarization);

        let cos_iota = draw.inclination.cos();
        let plus = 0.5 * (1.0 + cos_iota * cos_iota);
        let cross = cos_iota;
        // h = (F+ h+ - i Fx hx) e^{2i phi_c}, up to the common frequency-domain amplitude.
        let projected = Complex64::new(response.f_plus * plus, -response.f_cross * cross)
            * Complex64::from_polar(1.0, 2.0 * draw.coalescence_phase);
        Ok(optimal * projected.norm())
    }
}
