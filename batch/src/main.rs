use anyhow::Context;
use clap::Parser;
use log::{debug, info, warn};
use population::store;
use std::path::PathBuf;
use workflow::config::RunConfig;
use workflow::runner::BatchRunner;

mod population;
mod workflow;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Attach detection probabilities to a simulated binary population"
)]
struct Args {
    /// Population model; reads `<population-dir>/<model>.json`
    #[arg(short, long)]
    model: String,
    /// Channel within the model document
    #[arg(short, long)]
    channel: String,
    /// Monte Carlo trials per system
    #[arg(short, long)]
    ntrials: Option<usize>,
    /// Network SNR detection threshold
    #[arg(short, long)]
    snr_min: Option<f64>,
    /// Worker threads
    #[arg(short, long, alias = "multiproc")]
    workers: Option<usize>,
    /// Horizon redshift for sampled distances
    #[arg(long)]
    z_max: Option<f64>,
    /// Load a run config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    population_dir: Option<PathBuf>,
    #[arg(long)]
    output_dir: Option<PathBuf>,
    #[arg(long)]
    psd_dir: Option<PathBuf>,
}

impl Args {
    fn apply(&self, config: &mut RunConfig) {
        if let Some(trials) = self.ntrials {
            config.estimator.trials = trials;
        }
        if let Some(threshold) = self.snr_min {
            config.estimator.snr_threshold = threshold;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(z_max) = self.z_max {
            config.estimator.z_max = z_max;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(dir) = &self.population_dir {
            config.population_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(dir) = &self.psd_dir {
            config.psd_dir = dir.clone();
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    args.apply(&mut config);
    config.validate().context("validating run config")?;

    let input = store::model_path(&config.population_dir, &args.model);
    let output = store::model_path(&config.output_dir, &args.model);
    let mut table = store::read_channel(&input, &args.channel)?;
    if table.is_empty() {
        warn!("{}/{} has no rows", args.model, args.channel);
    }
    debug!("input columns: {}", table.column_names().join(", "));
    info!(
        "{}/{}: {} systems, {} configurations",
        args.model,
        args.channel,
        table.len(),
        config.networks.len()
    );

    let runner = BatchRunner::from_config(config)?;
    let report = runner.execute(&mut table)?;
    store::write_channel(&output, &args.channel, &table)?;
    report.log_summary();

    println!(
        "{}/{} -> {}: {} rows, {} estimates, {} failed cells, {} failed columns",
        args.model,
        args.channel,
        output.display(),
        report.rows,
        report.metrics.completed,
        report.failed_cells.len(),
        report.failed_columns.len()
    );
    Ok(())
}
