use std::path::PathBuf;

pub use crate::cosmology::Cosmology;
pub use crate::detector::{
    AntennaResponse, CurveKind, CurveOptions, DetectorId, DetectorSite, FileSensitivityProvider,
    SensitivityCurve, SensitivityProvider, SkyLocation,
};
pub use crate::estimator::{
    DetectionEstimate, DetectionEstimator, EstimatorSettings, RedshiftAggregation,
};
pub use crate::evaluator::{NetworkSnrEvaluator, TrialResult};
pub use crate::network::{NetworkConfiguration, NetworkMember, ResolvedNetwork};
pub use crate::sampler::{ExtrinsicDraw, ExtrinsicSampler};
pub use crate::system::BinarySystem;
pub use crate::waveform::{DetectorFrameParams, InspiralBackend, SnrBackend, WaveformError};

/// Common error type for estimation and its collaborators.
#[derive(thiserror::Error, Debug)]
pub enum PdetError {
    #[error("trial count must be positive, got {0}")]
    InvalidTrialCount(usize),
    #[error("detection threshold must be a non-negative number, got {0}")]
    InvalidThreshold(f64),
    #[error("redshift horizon must be finite and positive, got {0}")]
    InvalidHorizon(f64),
    #[error("invalid redshift {0}")]
    InvalidRedshift(f64),
    #[error("invalid distance {0} Mpc")]
    InvalidDistance(f64),
    #[error("invalid cosmology: {0}")]
    InvalidCosmology(String),
    #[error("unknown detector site {0:?}")]
    UnknownDetector(String),
    #[error("no sensitivity curve for detector {detector} scenario {scenario} (expected {})", .path.display())]
    UnknownScenario {
        detector: String,
        scenario: String,
        path: PathBuf,
    },
    #[error("malformed sensitivity curve {}: {reason}", .path.display())]
    MalformedCurve { path: PathBuf, reason: String },
    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("waveform generation failed: {0}")]
    WaveformGeneration(#[from] WaveformError),
    #[error("gave up after {failures} failed trials ({completed} valid): {last}")]
    TrialBudgetExhausted {
        failures: usize,
        completed: usize,
        last: WaveformError,
    },
}

pub type PdetResult<T> = Result<T, PdetError>;
