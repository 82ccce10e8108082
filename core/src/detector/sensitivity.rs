//! Detector noise curves and the provider that loads them from disk.
//!
//! Curves live in one directory as `<detector>_<scenario>.txt`, two
//! whitespace- or comma-separated columns (frequency in Hz, then amplitude or
//! power spectral density). Lines starting with `#` or `%` are comments.

use crate::math::{InterpHelper, QuadratureHelper};
use crate::prelude::{PdetError, PdetResult};
use log::{debug, info};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// What the second column of a curve file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    #[default]
    AmplitudeSpectralDensity,
    PowerSpectralDensity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveOptions {
    pub kind: CurveKind,
    /// Samples below this frequency (Hz) are discarded.
    pub low_frequency_cutoff: f64,
}

impl Default for CurveOptions {
    fn default() -> Self {
        Self {
            kind: CurveKind::AmplitudeSpectralDensity,
            low_frequency_cutoff: 10.0,
        }
    }
}

/// One-sided noise power spectral density sampled on an increasing grid.
#[derive(Debug, Clone)]
pub struct SensitivityCurve {
    frequencies: Array1<f64>,
    psd: Array1<f64>,
    /// Running integral of f^(-7/3) / S(f) from the first sample.
    chirp_moment: Vec<f64>,
}

impl SensitivityCurve {
    /// Builds a curve from raw samples; `values` are interpreted per `options.kind`.
    pub fn from_samples(
        frequencies: Vec<f64>,
        values: Vec<f64>,
        options: &CurveOptions,
    ) -> Result<Self, String> {
        if frequencies.len() != values.len() {
            return Err("frequency and value columns differ in length".into());
        }

        let mut kept_f = Vec::with_capacity(frequencies.len());
        let mut kept_s = Vec::with_capacity(values.len());
        for (f, v) in frequencies.into_iter().zip(values) {
            if f < options.low_frequency_cutoff {
                continue;
            }
            if !(f.is_finite() && v.is_finite()) || v <= 0.0 {
                return Err(format!("non-positive or non-finite sample at {} Hz", f));
            }
            if let Some(&last) = kept_f.last() {
                if f <= last {
                    return Err(format!("frequencies not increasing at {} Hz", f));
                }
            }
            kept_f.push(f);
            kept_s.push(match options.kind {
                CurveKind::AmplitudeSpectralDensity => v * v,
                CurveKind::PowerSpectralDensity => v,
            });
        }

        if kept_f.len() < 2 {
            return Err(format!(
                "fewer than two samples above {} Hz",
                options.low_frequency_cutoff
            ));
        }

        let integrand: Vec<f64> = kept_f
            .iter()
            .zip(&kept_s)
            .map(|(&f, &s)| f.powf(-7.0 / 3.0) / s)
            .collect();
        let chirp_moment = QuadratureHelper::cumulative_trapezoid(&kept_f, &integrand);

        Ok(Self {
            frequencies: Array1::from(kept_f),
            psd: Array1::from(kept_s),
            chirp_moment,
        })
    }

    pub fn parse(text: &str, options: &CurveOptions) -> Result<Self, String> {
        let mut frequencies = Vec::new();
        let mut values = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('%') {
                continue;
            }
            let mut fields = line
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|field| !field.is_empty());
            let (Some(f), Some(v)) = (fields.next(), fields.next()) else {
                return Err(format!("line {}: expected two columns", line_no + 1));
            };
            let parse = |field: &str| {
                field
                    .parse::<f64>()
                    .map_err(|err| format!("line {}: {}", line_no + 1, err))
            };
            frequencies.push(parse(f)?);
            values.push(parse(v)?);
        }
        Self::from_samples(frequencies, values, options)
    }

    pub fn load(path: &Path, options: &CurveOptions) -> PdetResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| PdetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, options).map_err(|reason| PdetError::MalformedCurve {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn frequencies(&self) -> ArrayView1<'_, f64> {
        self.frequencies.view()
    }

    pub fn psd(&self) -> ArrayView1<'_, f64> {
        self.psd.view()
    }

    pub fn minimum_frequency(&self) -> f64 {
        self.frequencies[0]
    }

    pub fn maximum_frequency(&self) -> f64 {
        self.frequencies[self.frequencies.len() - 1]
    }

    /// ∫ f^(-7/3) / S(f) df over the curve's band, truncated at `f_upper`.
    pub fn chirp_moment(&self, f_upper: f64) -> f64 {
        if !(f_upper > self.minimum_frequency()) {
            return 0.0;
        }
        let upper = f_upper.min(self.maximum_frequency());
        self.frequencies
            .as_slice()
            .and_then(|fs| InterpHelper::linear(fs, &self.chirp_moment, upper))
            .unwrap_or(0.0)
    }
}

/// Source of noise curves keyed by detector and sensitivity scenario.
pub trait SensitivityProvider: Send + Sync {
    fn get_psd(&self, detector: &str, scenario: &str) -> PdetResult<Arc<SensitivityCurve>>;
}

/// Reads curve files from a directory and memoizes them per (detector, scenario).
pub struct FileSensitivityProvider {
    directory: PathBuf,
    options: CurveOptions,
    cache: RwLock<HashMap<(String, String), Arc<SensitivityCurve>>>,
}

impl FileSensitivityProvider {
    pub fn new<P: Into<PathBuf>>(directory: P, options: CurveOptions) -> Self {
        Self {
            directory: directory.into(),
            options,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn curve_path(&self, detector: &str, scenario: &str) -> PathBuf {
        self.directory.join(format!("{}_{}.txt", detector, scenario))
    }

    pub fn cached_curves(&self) -> usize {
        self.cache.read().map(|cache| cache.len()).unwrap_or(0)
    }
}

impl SensitivityProvider for FileSensitivityProvider {
    fn get_psd(&self, detector: &str, scenario: &str) -> PdetResult<Arc<SensitivityCurve>> {
        let key = (detector.to_string(), scenario.to_string());
        if let Ok(cache) = self.cache.read() {
            if let Some(curve) = cache.get(&key) {
                return Ok(Arc::clone(curve));
            }
        }

        let path = self.curve_path(detector, scenario);
        if !path.is_file() {
            return Err(PdetError::UnknownScenario {
                detector: detector.to_string(),
                scenario: scenario.to_string(),
                path,
            });
        }
        let curve = Arc::new(SensitivityCurve::load(&path, &self.options)?);
        info!(
            "loaded sensitivity curve {} ({} samples, {:.1}-{:.1} Hz)",
            path.display(),
            curve.frequencies.len(),
            curve.minimum_frequency(),
            curve.maximum_frequency()
        );

        // Concurrent first loads race benignly: the first inserted curve wins.
        match self.cache.write() {
            Ok(mut cache) => Ok(Arc::clone(cache.entry(key).or_insert(curve))),
            Err(_) => {
                debug!("sensitivity cache poisoned, serving uncached curve");
                Ok(curve)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn flat_curve(value: f64) -> String {
        (0..=100)
            .map(|i| format!("{} {}\n", 10.0 + i as f64, value))
            .collect()
    }

    #[test]
    fn parse_squares_amplitude_columns() {
        let curve = SensitivityCurve::parse(
            "# f asd\n10 2e-23\n20, 4e-23\n\n30\t1e-23\n",
            &CurveOptions::default(),
        )
        .unwrap();
        assert_eq!(curve.frequencies().len(), 3);
        assert!((curve.psd()[1] - 16e-46).abs() < 1e-58);
        assert!((curve.psd()[2] - 1e-46).abs() < 1e-58);
    }

    #[test]
    fn parse_applies_low_frequency_cutoff() {
        let options = CurveOptions {
            kind: CurveKind::PowerSpectralDensity,
            low_frequency_cutoff: 15.0,
        };
        let curve = SensitivityCurve::parse("10 1\n20 1\n30 1\n", &options).unwrap();
        assert_eq!(curve.minimum_frequency(), 20.0);
        assert_eq!(curve.maximum_frequency(), 30.0);
    }

    #[test]
    fn padding_below_cutoff_is_ignored() {
        let curve = SensitivityCurve::parse(
            "1 inf\n5 0\n10 1e-23\n20 1e-23\n30 1e-23\n",
            &CurveOptions::default(),
        )
        .unwrap();
        assert_eq!(curve.frequencies().len(), 3);
        assert_eq!(curve.minimum_frequency(), 10.0);
        assert!(SensitivityCurve::parse("5 0\n10 0\n20 1e-23\n", &CurveOptions::default()).is_err());
    }

    #[test]
    fn parse_rejects_malformed_input() {
        let options = CurveOptions::default();
        assert!(SensitivityCurve::parse("10 1e-23\n", &options).is_err());
        assert!(SensitivityCurve::parse("10 1e-23\n20\n", &options).is_err());
        assert!(SensitivityCurve::parse("20 1e-23\n10 1e-23\n", &options).is_err());
        assert!(SensitivityCurve::parse("10 0\n20 1e-23\n", &options).is_err());
        assert!(SensitivityCurve::parse("10 abc\n20 1e-23\n", &options).is_err());
    }

    #[test]
    fn chirp_moment_matches_flat_noise_integral() {
        let options = CurveOptions {
            kind: CurveKind::PowerSpectralDensity,
            low_frequency_cutoff: 10.0,
        };
        let curve = SensitivityCurve::parse(&flat_curve(1.0), &options).unwrap();
        let exact = |f: f64| -0.75 * f.powf(-4.0 / 3.0);
        let expected = exact(50.0) - exact(10.0);
        assert!((curve.chirp_moment(50.0) - expected).abs() / expected < 1e-2);
        assert_eq!(curve.chirp_moment(5.0), 0.0);
        assert_eq!(curve.chirp_moment(1.0e4), curve.chirp_moment(110.0));
    }

    #[test]
    fn provider_caches_loaded_curves() {
        let dir = TempDir::new().unwrap();
        let mut file = fs::File::create(dir.path().join("H1_design.txt")).unwrap();
        file.write_all(flat_curve(1e-23).as_bytes()).unwrap();

        let provider = FileSensitivityProvider::new(dir.path(), CurveOptions::default());
        let first = provider.get_psd("H1", "design").unwrap();
        let second = provider.get_psd("H1", "design").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(provider.cached_curves(), 1);
    }

    #[test]
    fn concurrent_first_loads_share_one_curve() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("H1_design.txt"), flat_curve(1e-23)).unwrap();
        let provider = FileSensitivityProvider::new(dir.path(), CurveOptions::default());

        let curves: Vec<Arc<SensitivityCurve>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| provider.get_psd("H1", "design").unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(provider.cached_curves(), 1);
        let cached = provider.get_psd("H1", "design").unwrap();
        for curve in &curves {
            assert!(Arc::ptr_eq(curve, &cached));
        }
    }

    #[test]
    fn provider_reports_missing_scenarios() {
        let dir = TempDir::new().unwrap();
        let provider = FileSensitivityProvider::new(dir.path(), CurveOptions::default());
        match provider.get_psd("L1", "o9") {
            Err(PdetError::UnknownScenario {
                detector, scenario, ..
            }) => {
                assert_eq!(detector, "L1");
                assert_eq!(scenario, "o9");
            }
            other => panic!("unexpected result {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn provider_reports_malformed_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("V1_design.txt"), "not a curve\n").unwrap();
        let provider = FileSensitivityProvider::new(dir.path(), CurveOptions::default());
        assert!(matches!(
            provider.get_psd("V1", "design"),
            Err(PdetError::MalformedCurve { .. })
        ));
    }
}
