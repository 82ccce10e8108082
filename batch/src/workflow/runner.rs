use crate::population::table::{PopulationTable, REDSHIFT_COLUMN};
use crate::workflow::config::RunConfig;
use anyhow::Context;
use log::{debug, info, warn};
use pdetcore::prelude::{
    DetectionEstimate, DetectionEstimator, FileSensitivityProvider, InspiralBackend,
    SensitivityProvider, SnrBackend,
};
use pdetcore::telemetry::{MetricsRecorder, MetricsSnapshot};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;

/// One (row, configuration) estimate that produced no value.
#[derive(Debug, Clone, PartialEq)]
pub struct CellFailure {
    pub row: usize,
    pub network: String,
    pub reason: String,
}

/// A configuration whose network could not be resolved; its whole column is null.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFailure {
    pub network: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub seed: u64,
    pub rows: usize,
    pub failed_cells: Vec<CellFailure>,
    pub failed_columns: Vec<ColumnFailure>,
    pub metrics: MetricsSnapshot,
}

impl BatchReport {
    pub fn log_summary(&self) {
        info!(
            "processed {} rows (seed {}): {} estimates, {} failed, {} trials resampled",
            self.rows,
            self.seed,
            self.metrics.completed,
            self.metrics.failed,
            self.metrics.skipped_trials
        );
        for column in &self.failed_columns {
            warn!("{}: column left empty: {}", column.network, column.reason);
        }
        for cell in &self.failed_cells {
            warn!("{} row {}: {}", cell.network, cell.row, cell.reason);
        }
    }
}

/// Attaches one detection-probability column per configured network to a population.
pub struct BatchRunner<B> {
    config: RunConfig,
    estimator: Arc<DetectionEstimator<B>>,
    provider: Arc<dyn SensitivityProvider>,
}

impl BatchRunner<InspiralBackend> {
    pub fn from_config(config: RunConfig) -> anyhow::Result<Self> {
        let provider = Arc::new(FileSensitivityProvider::new(
            config.psd_dir.clone(),
            config.curves.clone(),
        ));
        let backend = config.backend;
        Self::new(config, backend, provider)
    }
}

impl<B: SnrBackend + 'static> BatchRunner<B> {
    pub fn new(
        config: RunConfig,
        backend: B,
        provider: Arc<dyn SensitivityProvider>,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        let estimator =
            DetectionEstimator::new(config.estimator.clone(), config.cosmology, backend)
                .context("building detection estimator")?;
        Ok(Self {
            config,
            estimator: Arc::new(estimator),
            provider,
        })
    }

    /// Estimates every (row, network) cell, then writes the probability
    /// columns and the resolved `z` column back into `table`.
    pub fn execute(&self, table: &mut PopulationTable) -> anyhow::Result<BatchReport> {
        let mut systems = table.systems()?;
        let rows = systems.len();
        let seed = match self.config.seed {
            Some(seed) => seed,
            None => {
                let seed: u64 = rand::thread_rng().gen();
                info!("no seed configured, drew {}", seed);
                seed
            }
        };

        let workers = self.config.workers;
        let runtime = TokioBuilder::new_multi_thread()
            .worker_threads(workers)
            .max_blocking_threads(workers)
            .thread_name("pdet-worker")
            .build()
            .context("creating worker pool")?;

        let metrics = Arc::new(MetricsRecorder::new());
        let mut failed_cells = Vec::new();
        let mut failed_columns = Vec::new();
        let mut columns: Vec<Vec<Option<DetectionEstimate>>> = Vec::new();

        for network_config in &self.config.networks {
            let name = &network_config.name;
            let network = match network_config.resolve(self.provider.as_ref()) {
                Ok(network) => Arc::new(network),
                Err(err) => {
                    debug!("{}: cannot resolve network: {}", name, err);
                    failed_columns.push(ColumnFailure {
                        network: name.clone(),
                        reason: err.to_string(),
                    });
                    columns.push(vec![None; rows]);
                    continue;
                }
            };
            info!(
                "{}: {} systems over {} detectors, {} trials each",
                name,
                rows,
                network.len(),
                self.config.estimator.trials
            );

            let current = Arc::new(systems.clone());
            let handles: Vec<_> = (0..rows)
                .map(|row| {
                    let estimator = Arc::clone(&self.estimator);
                    let network = Arc::clone(&network);
                    let systems = Arc::clone(&current);
                    let metrics = Arc::clone(&metrics);
                    let row_seed = seed.wrapping_add(row as u64);
                    runtime.spawn_blocking(move || {
                        let mut rng = StdRng::seed_from_u64(row_seed);
                        let result = estimator.estimate(&systems[row], &network, &mut rng);
                        match &result {
                            Ok(estimate) => metrics.record_completed(estimate.failed_trials),
                            Err(_) => metrics.record_failed(),
                        }
                        result
                    })
                })
                .collect();

            let outcomes = runtime.block_on(async move {
                let mut outcomes = Vec::with_capacity(handles.len());
                for handle in handles {
                    outcomes.push(handle.await);
                }
                outcomes
            });

            let mut column = Vec::with_capacity(rows);
            for (row, outcome) in outcomes.into_iter().enumerate() {
                let reason = match outcome {
                    Ok(Ok(estimate)) => {
                        // Later configurations evaluate the row at this redshift.
                        systems[row].redshift = Some(estimate.redshift);
                        column.push(Some(estimate));
                        continue;
                    }
                    Ok(Err(err)) => err.to_string(),
                    Err(join_err) => {
                        metrics.record_failed();
                        format!("task failure: {}", join_err)
                    }
                };
                debug!("{} row {}: {}", name, row, reason);
                failed_cells.push(CellFailure {
                    row,
                    network: name.clone(),
                    reason,
                });
                column.push(None);
            }
            columns.push(column);
        }

        let redshifts: Vec<Option<f64>> = systems.iter().map(|s| s.redshift).collect();

        for (network_config, column) in self.config.networks.iter().zip(&columns) {
            let values = column.iter().map(|e| e.map(|e| e.probability)).collect();
            table.set_column(&network_config.name, values)?;
        }
        table.set_column(REDSHIFT_COLUMN, redshifts)?;

        Ok(BatchReport {
            seed,
            rows,
            failed_cells,
            failed_columns,
            metrics: metrics.snapshot(),
        })
    }
}
