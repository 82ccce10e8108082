//! Fixtures shared by unit tests here and in downstream crates.

use crate::detector::{
    AntennaResponse, CurveKind, CurveOptions, DetectorSite, SensitivityCurve, SkyLocation,
};
use crate::sampler::ExtrinsicDraw;
use crate::waveform::{DetectorFrameParams, SnrBackend, WaveformError};
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

const CURVE_SAMPLES: usize = 2000;
const CURVE_MIN_HZ: f64 = 10.0;
const CURVE_MAX_HZ: f64 = 2048.0;

/// Analytic fit to the zero-detuned high-power Advanced LIGO noise PSD.
pub fn aligo_like_psd(frequency: f64) -> f64 {
    let x = frequency / 215.0;
    let x2 = x * x;
    1.0e-49 * (x.powf(-4.14) - 5.0 / x2 + 111.0 * (1.0 - x2 + 0.5 * x2 * x2) / (1.0 + 0.5 * x2))
}

fn log_grid() -> Vec<f64> {
    let ratio = CURVE_MAX_HZ / CURVE_MIN_HZ;
    (0..CURVE_SAMPLES)
        .map(|i| CURVE_MIN_HZ * ratio.powf(i as f64 / (CURVE_SAMPLES - 1) as f64))
        .collect()
}

pub fn aligo_like_curve() -> SensitivityCurve {
    let frequencies = log_grid();
    let psd = frequencies.iter().map(|&f| aligo_like_psd(f)).collect();
    let options = CurveOptions {
        kind: CurveKind::PowerSpectralDensity,
        low_frequency_cutoff: CURVE_MIN_HZ,
    };
    SensitivityCurve::from_samples(frequencies, psd, &options)
        .unwrap_or_else(|reason| panic!("analytic curve rejected: {}", reason))
}

/// Writes the analytic curve as an ASD file named the way the file provider expects.
pub fn write_aligo_like_curve(dir: &Path, detector: &str, scenario: &str) -> io::Result<PathBuf> {
    let mut text = String::from("# frequency [Hz]  ASD [1/sqrt(Hz)]\n");
    for f in log_grid() {
        let _ = writeln!(text, "{:.6e} {:.6e}", f, aligo_like_psd(f).sqrt());
    }
    let path = dir.join(format!("{}_{}.txt", detector, scenario));
    fs::write(&path, text)?;
    Ok(path)
}

/// Backend whose SNR is `peak_snr * |cos(inclination)|`, independent of the curve.
///
/// With `fail_every = Some(k)`, every k-th call fails with a waveform error.
pub struct StubBackend {
    pub peak_snr: f64,
    fail_every: Option<usize>,
    calls: AtomicUsize,
}

impl StubBackend {
    pub fn new(peak_snr: f64) -> Self {
        Self {
            peak_snr,
            fail_every: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_every(peak_snr: f64, every: usize) -> Self {
        Self {
            fail_every: Some(every.max(1)),
            ..Self::new(peak_snr)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SnrBackend for StubBackend {
    fn project_onto_detector(
        &self,
        _site: &DetectorSite,
        _sky: SkyLocation,
        _polarization: f64,
    ) -> AntennaResponse {
        AntennaResponse {
            f_plus: 1.0,
            f_cross: 0.0,
        }
    }

    fn compute_snr(
        &self,
        _params: &DetectorFrameParams,
        draw: &ExtrinsicDraw,
        _site: &DetectorSite,
        _curve: &SensitivityCurve,
    ) -> Result<f64, WaveformError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if matches!(self.fail_every, Some(every) if call % every == 0) {
            return Err(WaveformError::NonFinite("stub waveform"));
        }
        Ok(self.peak_snr * draw.inclination.cos().abs())
    }
}
