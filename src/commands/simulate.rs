//! @acp:module "Simulate Command"
//! @acp:summary "Write a simulated binomial dataset"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;

use crate::config::Config;
use crate::simulate::{simulate_data, BinomialData, SimulationInputs};

/// Options for the simulate command
#[derive(Debug, Clone)]
pub struct SimulateOptions {
    /// Output .data.json path
    pub output: PathBuf,
    /// Observations per stratum (defaults to the first configured dataset)
    pub obs_per_stratum: Option<usize>,
    /// Seed override
    pub seed: Option<u64>,
}

/// Execute the simulate command
pub fn execute_simulate(options: SimulateOptions, config: Config) -> Result<BinomialData> {
    let obs = options
        .obs_per_stratum
        .or_else(|| config.simulation.datasets.first().map(|d| d.obs_per_stratum))
        .context("No --obs-per-stratum given and no datasets configured")?;

    let mut inputs = SimulationInputs::from_config(&config.simulation, obs);
    if let Some(seed) = options.seed {
        inputs.seed = seed;
    }

    inputs.validate()?;

    println!(
        "{} Simulating {} strata, {} tests (seed {})...",
        style("→").cyan(),
        inputs.strata(),
        inputs.total_tests(),
        inputs.seed
    );

    let data = simulate_data(&inputs)?;
    data.write_data_json(&options.output)
        .with_context(|| format!("Failed to write {}", options.output.display()))?;

    println!("{} Data written to {}", style("✓").green(), options.output.display());
    println!("  Strata: {}", data.n);
    println!("  Tests: {}", data.tests.iter().sum::<u64>());
    println!("  Positive tests: {}", data.pos_tests.iter().sum::<u64>());

    Ok(data)
}
