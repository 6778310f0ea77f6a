//! @acp:module "Efficiency Study"
//! @acp:summary "Times every model variant on every simulated dataset"
//! @acp:domain stats
//! @acp:layer service
//!
//! For each configured dataset the study simulates data once, fits every
//! model `runs` times and writes `binomial_runtimes_{dataset}.json` with
//! one row per model, labelled `"{model} {dataset}"`.

use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};

use super::sampler::{CmdStanExecutable, Sampler};
use super::timing::{summarize_times, time_fits, write_runtimes_json, TimingSummary};
use crate::config::{Config, ModelConfig};
use crate::error::Result;
use crate::simulate::{simulate_data, SimulationInputs};

/// Runtimes of one dataset across all models
#[derive(Debug, Clone)]
pub struct DatasetResult {
    pub dataset: String,
    pub data_file: PathBuf,
    pub runtimes_file: PathBuf,
    pub summaries: Vec<TimingSummary>,
}

/// @acp:summary "Driver for the ESS/sec comparison"
pub struct EfficiencyStudy {
    config: Config,
    show_progress: bool,
}

impl EfficiencyStudy {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            show_progress: false,
        }
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Directory for simulated data and chain CSVs
    pub fn work_dir(&self) -> PathBuf {
        self.config.efficiency.output_dir.join("runs")
    }

    /// @acp:summary "Run the study against compiled CmdStan models"
    pub fn run(&self) -> Result<Vec<DatasetResult>> {
        let chains = self.config.efficiency.chains;
        let work_dir = self.work_dir();
        let samplers = self
            .config
            .efficiency
            .models
            .iter()
            .map(|m: &ModelConfig| {
                CmdStanExecutable::new(&m.label, &m.executable, chains, work_dir.join(&m.label))
                    .map(|s| Box::new(s) as Box<dyn Sampler>)
            })
            .collect::<Result<Vec<_>>>()?;

        self.run_with(&samplers)
    }

    /// @acp:summary "Run the study with the given samplers"
    pub fn run_with(&self, samplers: &[Box<dyn Sampler>]) -> Result<Vec<DatasetResult>> {
        let runs = self.config.efficiency.runs;
        let output_dir = &self.config.efficiency.output_dir;
        let work_dir = self.work_dir();
        std::fs::create_dir_all(&work_dir)?;

        let total = (self.config.simulation.datasets.len() * samplers.len() * runs) as u64;
        let progress = if self.show_progress {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        let mut results = Vec::new();
        for dataset in &self.config.simulation.datasets {
            let inputs = SimulationInputs::from_config(&self.config.simulation, dataset.obs_per_stratum);
            let data = simulate_data(&inputs)?;
            let data_file = work_dir.join(format!("binomial_{}.data.json", dataset.label));
            data.write_data_json(&data_file)?;
            tracing::info!(dataset = %dataset.label, strata = data.n, "Simulated dataset");

            let mut timings = Vec::with_capacity(samplers.len());
            for sampler in samplers {
                progress.set_message(format!("{} {}", sampler.label(), dataset.label));
                let fits = time_fits(runs, sampler.as_ref(), &data_file)?;
                progress.inc(runs as u64);
                timings.push((format!("{} {}", sampler.label(), dataset.label), fits));
            }

            let summaries = summarize_times(&timings)?;
            let runtimes_file = output_dir.join(format!("binomial_runtimes_{}.json", dataset.label));
            write_runtimes_json(&runtimes_file, &summaries)?;
            tracing::info!(file = %runtimes_file.display(), "Wrote runtimes");

            results.push(DatasetResult {
                dataset: dataset.label.clone(),
                data_file,
                runtimes_file,
                summaries,
            });
        }

        progress.finish_and_clear();
        Ok(results)
    }
}
