//! Monte Carlo detection probability for one binary and one network.
//!
//! Each trial draws extrinsic parameters, evaluates the network SNR and tests
//! it against the threshold. Trials whose waveform cannot be generated are
//! resampled, so the denominator is always exactly the configured trial
//! count; a failure budget bounds how long that can go on.

use crate::cosmology::Cosmology;
use crate::evaluator::NetworkSnrEvaluator;
use crate::math::StatsHelper;
use crate::network::ResolvedNetwork;
use crate::prelude::{PdetError, PdetResult};
use crate::sampler::ExtrinsicSampler;
use crate::system::BinarySystem;
use crate::waveform::SnrBackend;
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How the reported redshift is chosen when the system's redshift is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedshiftAggregation {
    /// Mean over all valid trials.
    #[default]
    Mean,
    /// Mean over detected trials, falling back to `Mean` when none are detected.
    DetectedMean,
    /// Redshift of the final valid trial.
    Last,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorSettings {
    pub trials: usize,
    pub snr_threshold: f64,
    pub z_max: f64,
    /// Waveform failures tolerated per estimate before giving up.
    pub max_trial_failures: usize,
    pub redshift_aggregation: RedshiftAggregation,
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self {
            trials: 1000,
            snr_threshold: 8.0,
            z_max: 2.0,
            max_trial_failures: 1000,
            redshift_aggregation: RedshiftAggregation::Mean,
        }
    }
}

impl EstimatorSettings {
    pub fn validate(&self) -> PdetResult<()> {
        if self.trials == 0 {
            return Err(PdetError::InvalidTrialCount(self.trials));
        }
        if !(self.snr_threshold >= 0.0) || self.snr_threshold.is_infinite() {
            return Err(PdetError::InvalidThreshold(self.snr_threshold));
        }
        if !(self.z_max.is_finite() && self.z_max > 0.0) {
            return Err(PdetError::InvalidHorizon(self.z_max));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionEstimate {
    /// `detected / trials`.
    pub probability: f64,
    pub redshift: f64,
    pub trials: usize,
    pub detected: usize,
    /// Waveform failures that were resampled.
    pub failed_trials: usize,
}

pub struct DetectionEstimator<B> {
    settings: EstimatorSettings,
    sampler: ExtrinsicSampler,
    evaluator: NetworkSnrEvaluator<B>,
}

impl<B: SnrBackend> DetectionEstimator<B> {
    pub fn new(settings: EstimatorSettings, cosmology: Cosmology, backend: B) -> PdetResult<Self> {
        settings.validate()?;
        let sampler = ExtrinsicSampler::new(cosmology, settings.z_max)?;
        Ok(Self {
            settings,
            sampler,
            evaluator: NetworkSnrEvaluator::new(backend, cosmology),
        })
    }

    pub fn settings(&self) -> &EstimatorSettings {
        &self.settings
    }

    pub fn backend(&self) -> &B {
        self.evaluator.backend()
    }

    pub fn estimate<R: Rng + ?Sized>(
        &self,
        system: &BinarySystem,
        network: &ResolvedNetwork,
        rng: &mut R,
    ) -> PdetResult<DetectionEstimate> {
        let trials = self.settings.trials;
        let threshold = self.settings.snr_threshold;
        let mut snrs = Vec::with_capacity(trials);
        let mut redshifts = Vec::with_capacity(trials);
        let mut failures = 0;

        while snrs.len() < trials {
            let draw = self.sampler.draw(system, rng)?;
            match self.evaluator.evaluate(system, &draw, network) {
                Ok(result) => {
                    snrs.push(result.network_snr);
                    redshifts.push(result.redshift);
                }
                Err(PdetError::WaveformGeneration(err)) => {
                    failures += 1;
                    debug!(
                        "{}: skipping trial ({} so far): {}",
                        network.name, failures, err
                    );
                    if failures > self.settings.max_trial_failures {
                        return Err(PdetError::TrialBudgetExhausted {
                            failures,
                            completed: snrs.len(),
                            last: err,
                        });
                    }
                }
                Err(other) => return Err(other),
            }
        }

        let detected = StatsHelper::count_at_least(&snrs, threshold);
        let redshift = match system.redshift {
            Some(z) => z,
            None => self.aggregate_redshift(&snrs, &redshifts),
        };

        Ok(DetectionEstimate {
            probability: detected as f64 / trials as f64,
            redshift,
            trials,
            detected,
            failed_trials: failures,
        })
    }

    fn aggregate_redshift(&self, snrs: &[f64], redshifts: &[f64]) -> f64 {
        match self.settings.redshift_aggregation {
            RedshiftAggregation::Mean => StatsHelper::mean(redshifts),
            RedshiftAggregation::Last => redshifts.last().copied().unwrap_or(0.0),
            RedshiftAggregation::DetectedMean => {
                let detected: Vec<f64> = snrs
                    .iter()
                    .zip(redshifts)
                    .filter(|(snr, _)| **snr >= self.settings.snr_threshold)
                    .map(|(_, &z)| z)
                    .collect();
                if detected.is_empty() {
                    StatsHelper::mean(redshifts)
                } else {
                    StatsHelper::mean(&detected)
                }
            }
        }
    }
}
