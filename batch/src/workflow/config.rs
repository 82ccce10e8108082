use crate::population::table::{REDSHIFT_COLUMN, REQUIRED_COLUMNS};
use anyhow::{bail, Context};
use pdetcore::prelude::{
    Cosmology, CurveOptions, EstimatorSettings, InspiralBackend, NetworkConfiguration,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Everything a batch run needs, loaded once at startup.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub population_dir: PathBuf,
    pub output_dir: PathBuf,
    pub psd_dir: PathBuf,
    pub workers: usize,
    /// Base seed; row `i` uses `seed + i`. Drawn at random when unset.
    pub seed: Option<u64>,
    pub estimator: EstimatorSettings,
    pub cosmology: Cosmology,
    pub curves: CurveOptions,
    pub backend: InspiralBackend,
    pub networks: Vec<NetworkConfiguration>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            population_dir: PathBuf::from("data/unprocessed"),
            output_dir: PathBuf::from("data/processed"),
            psd_dir: PathBuf::from("data/psds"),
            workers: 1,
            seed: None,
            estimator: EstimatorSettings::default(),
            cosmology: Cosmology::planck15(),
            curves: CurveOptions::default(),
            backend: InspiralBackend::default(),
            networks: default_networks(),
        }
    }
}

/// Single-detector and three-detector networks at O3 and design sensitivity.
pub fn default_networks() -> Vec<NetworkConfiguration> {
    let o3 = "midhighlatelow";
    let design = "design";
    vec![
        NetworkConfiguration::new("pdet_O3", [("H1", o3)]),
        NetworkConfiguration::new("pdet_O3network", [("H1", o3), ("L1", o3), ("V1", o3)]),
        NetworkConfiguration::new("pdet_design", [("H1", design)]),
        NetworkConfiguration::new(
            "pdet_designnetwork",
            [("H1", design), ("L1", design), ("V1", design)],
        ),
    ]
}

impl RunConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading run config {}", path_ref.display()))?;
        let config: RunConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing run config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Checks every setting that would otherwise fail mid-run.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.estimator
            .validate()
            .context("invalid estimator settings")?;
        self.cosmology.validate().context("invalid cosmology")?;
        if self.workers == 0 {
            bail!("worker pool needs at least one worker");
        }
        if self.networks.is_empty() {
            bail!("no network configurations to evaluate");
        }
        if !(0.0..=1.0).contains(&self.backend.min_mass_ratio) {
            bail!(
                "minimum mass ratio must lie in [0, 1], got {}",
                self.backend.min_mass_ratio
            );
        }

        let mut names = HashSet::new();
        for network in &self.networks {
            if network.detectors.is_empty() {
                bail!("network {} has no detectors", network.name);
            }
            let reserved = network.name == REDSHIFT_COLUMN
                || REQUIRED_COLUMNS.contains(&network.name.as_str());
            if reserved {
                bail!("network name {} collides with an input column", network.name);
            }
            if !names.insert(network.name.as_str()) {
                bail!("network name {} is used twice", network.name);
            }
        }
        Ok(())
    }
}
