use crate::cosmology::Cosmology;
use crate::network::ResolvedNetwork;
use crate::prelude::PdetResult;
use crate::sampler::ExtrinsicDraw;
use crate::system::BinarySystem;
use crate::waveform::{DetectorFrameParams, SnrBackend};
use serde::{Deserialize, Serialize};

/// Network SNR and the redshift it was evaluated at, for one draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub network_snr: f64,
    pub redshift: f64,
}

/// Combines per-detector SNRs from a backend into a network SNR.
pub struct NetworkSnrEvaluator<B> {
    backend: B,
    cosmology: Cosmology,
}

impl<B: SnrBackend> NetworkSnrEvaluator<B> {
    pub fn new(backend: B, cosmology: Cosmology) -> Self {
        Self { backend, cosmology }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Root-sum-square of the member SNRs. A backend failure surfaces as
    /// [`PdetError::WaveformGeneration`](crate::PdetError::WaveformGeneration).
    pub fn evaluate(
        &self,
        system: &BinarySystem,
        draw: &ExtrinsicDraw,
        network: &ResolvedNetwork,
    ) -> PdetResult<TrialResult> {
        let redshift = match system.redshift.or(draw.redshift) {
            Some(z) => z,
            None => self.cosmology.redshift_of(draw.luminosity_distance)?,
        };
        let params = DetectorFrameParams::from_source(system, redshift);

        let mut sum_sq = 0.0;
        for member in &network.members {
            let snr = self
                .backend
                .compute_snr(&params, draw, &member.site, &member.curve)?;
            sum_sq += snr * snr;
        }

        Ok(TrialResult {
            network_snr: sum_sq.sqrt(),
            redshift,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::{CurveOptions, DetectorId, DetectorSite, FileSensitivityProvider};
    use crate::network::{NetworkConfiguration, NetworkMember};
    use crate::prelude::PdetError;
    use crate::testing::{aligo_like_curve, write_aligo_like_curve, StubBackend};
    use crate::waveform::InspiralBackend;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn draw(distance: f64) -> ExtrinsicDraw {
        ExtrinsicDraw {
            ra: 0.4,
            dec: -0.2,
            inclination: 0.0,
            polarization: 1.0,
            coalescence_phase: 0.5,
            luminosity_distance: distance,
            redshift: None,
        }
    }

    fn network(ids: &[DetectorId]) -> ResolvedNetwork {
        let curve = Arc::new(aligo_like_curve());
        ResolvedNetwork {
            name: "test".into(),
            members: ids
                .iter()
                .map(|&id| NetworkMember {
                    site: DetectorSite::new(id),
                    scenario: "design".into(),
                    curve: Arc::clone(&curve),
                })
                .collect(),
        }
    }

    #[test]
    fn network_snr_is_quadrature_sum() {
        let evaluator = NetworkSnrEvaluator::new(StubBackend::new(6.0), Cosmology::planck15());
        let system = BinarySystem::non_spinning(30.0, 25.0, Some(0.1));
        let result = evaluator
            .evaluate(&system, &draw(500.0), &network(&[DetectorId::H1, DetectorId::L1]))
            .unwrap();
        assert!((result.network_snr - 72.0f64.sqrt()).abs() < 1e-12);
        assert_eq!(result.redshift, 0.1);
    }

    #[test]
    fn empty_network_has_zero_snr() {
        let evaluator = NetworkSnrEvaluator::new(StubBackend::new(6.0), Cosmology::planck15());
        let system = BinarySystem::non_spinning(30.0, 25.0, Some(0.1));
        let result = evaluator.evaluate(&system, &draw(500.0), &network(&[])).unwrap();
        assert_eq!(result.network_snr, 0.0);
    }

    #[test]
    fn unset_redshift_is_recovered_from_distance() {
        let cosmology = Cosmology::planck15();
        let evaluator = NetworkSnrEvaluator::new(StubBackend::new(6.0), cosmology);
        let system = BinarySystem::non_spinning(30.0, 25.0, None);
        let distance = cosmology.distance_of(0.7).unwrap();
        let result = evaluator
            .evaluate(&system, &draw(distance), &network(&[DetectorId::V1]))
            .unwrap();
        assert!((result.redshift - 0.7).abs() < 1e-6);
    }

    #[test]
    fn sampled_redshift_on_the_draw_is_used() {
        let evaluator = NetworkSnrEvaluator::new(StubBackend::new(6.0), Cosmology::planck15());
        let system = BinarySystem::non_spinning(30.0, 25.0, None);
        let mut sampled = draw(1000.0);
        sampled.redshift = Some(0.25);
        let result = evaluator
            .evaluate(&system, &sampled, &network(&[DetectorId::H1]))
            .unwrap();
        assert_eq!(result.redshift, 0.25);

        let fixed = BinarySystem::non_spinning(30.0, 25.0, Some(0.1));
        let result = evaluator
            .evaluate(&fixed, &sampled, &network(&[DetectorId::H1]))
            .unwrap();
        assert_eq!(result.redshift, 0.1);
    }

    #[test]
    fn combined_network_beats_single_detector() {
        let evaluator = NetworkSnrEvaluator::new(InspiralBackend::default(), Cosmology::planck15());
        let system = BinarySystem::non_spinning(30.0, 25.0, Some(0.1));
        let single = evaluator
            .evaluate(&system, &draw(475.0), &network(&[DetectorId::H1]))
            .unwrap();
        let triple = evaluator
            .evaluate(
                &system,
                &draw(475.0),
                &network(&[DetectorId::H1, DetectorId::L1, DetectorId::V1]),
            )
            .unwrap();
        assert!(triple.network_snr >= single.network_snr);
        assert!(single.network_snr > 0.0);
    }

    #[test]
    fn backend_failures_surface_as_waveform_errors() {
        let evaluator = NetworkSnrEvaluator::new(InspiralBackend::default(), Cosmology::planck15());
        let system = BinarySystem::new(30.0, 25.0, Some(0.1), [1.5, 0.0, 0.0], [0.0; 3]);
        assert!(matches!(
            evaluator.evaluate(&system, &draw(475.0), &network(&[DetectorId::H1])),
            Err(PdetError::WaveformGeneration(_))
        ));
    }

    #[test]
    fn evaluates_networks_loaded_from_disk() {
        let dir = TempDir::new().unwrap();
        write_aligo_like_curve(dir.path(), "H1", "design").unwrap();
        let provider = FileSensitivityProvider::new(dir.path(), CurveOptions::default());
        let resolved = NetworkConfiguration::new("pdet_design", [("H1", "design")])
            .resolve(&provider)
            .unwrap();
        let evaluator = NetworkSnrEvaluator::new(InspiralBackend::default(), Cosmology::planck15());

        let from_disk = evaluator
            .evaluate(&BinarySystem::non_spinning(30.0, 25.0, Some(0.1)), &draw(475.0), &resolved)
            .unwrap();
        let in_memory = evaluator
            .evaluate(
                &BinarySystem::non_spinning(30.0, 25.0, Some(0.1)),
                &draw(475.0),
                &network(&[DetectorId::H1]),
            )
            .unwrap();
        // The ASD file is written with six significant digits.
        assert!((from_disk.network_snr - in_memory.network_snr).abs() < 1e-3 * in_memory.network_snr);
    }
}
