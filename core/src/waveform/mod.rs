//! Waveform/SNR backends.
//!
//! The estimator only needs an SNR for one detector given intrinsic and
//! extrinsic parameters; any type implementing [`SnrBackend`] can stand in
//! for the built-in [`InspiralBackend`].

pub mod inspiral;

pub use inspiral::InspiralBackend;

use crate::detector::{AntennaResponse, DetectorSite, SensitivityCurve, SkyLocation};
use crate::sampler::ExtrinsicDraw;
use crate::system::BinarySystem;
use serde::{Deserialize, Serialize};

/// Intrinsic parameters as seen by the detector (masses redshifted).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorFrameParams {
    pub mass1: f64,
    pub mass2: f64,
    pub spin1: [f64; 3],
    pub spin2: [f64; 3],
}

impl DetectorFrameParams {
    pub fn from_source(system: &BinarySystem, redshift: f64) -> Self {
        let scale = 1.0 + redshift;
        Self {
            mass1: system.m1 * scale,
            mass2: system.m2 * scale,
            spin1: system.spin1,
            spin2: system.spin2,
        }
    }
}

/// Parameter combinations a backend cannot produce a waveform for.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum WaveformError {
    #[error("component masses must be positive, got {0} and {1}")]
    NonPositiveMass(f64, f64),
    #[error("mass ratio {ratio:.4} below supported minimum {minimum}")]
    MassRatioOutOfRange { ratio: f64, minimum: f64 },
    #[error("spin magnitude {0:.4} exceeds 1")]
    SpinOutOfRange(f64),
    #[error("luminosity distance must be positive, got {0}")]
    NonPositiveDistance(f64),
    #[error("non-finite {0}")]
    NonFinite(&'static str),
}

/// Per-detector matched-filter SNR model.
pub trait SnrBackend: Send + Sync {
    fn project_onto_detector(
        &self,
        site: &DetectorSite,
        sky: SkyLocation,
        polarization: f64,
    ) -> AntennaResponse;

    /// Non-negative SNR of the signal described by `params` and `draw` in one detector.
    fn compute_snr(
        &self,
        params: &DetectorFrameParams,
        draw: &ExtrinsicDraw,
        site: &DetectorSite,
        curve: &SensitivityCurve,
    ) -> Result<f64, WaveformError>;
}
