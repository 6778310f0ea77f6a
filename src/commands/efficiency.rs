//! @acp:module "Efficiency Command"
//! @acp:summary "Run the ESS/sec timing study"
//! @acp:domain cli
//! @acp:layer handler

use anyhow::Result;
use console::style;

use crate::config::Config;
use crate::efficiency::{DatasetResult, EfficiencyStudy};

/// Options for the efficiency command
#[derive(Debug, Clone, Default)]
pub struct EfficiencyOptions {
    /// Override the configured number of fits
    pub runs: Option<usize>,
    /// Hide the progress bar
    pub quiet: bool,
}

/// Execute the efficiency command
pub fn execute_efficiency(options: EfficiencyOptions, mut config: Config) -> Result<Vec<DatasetResult>> {
    if let Some(runs) = options.runs {
        config.efficiency.runs = runs;
    }

    println!(
        "{} Timing {} model(s) x {} dataset(s), {} fits each...",
        style("→").cyan(),
        config.efficiency.models.len(),
        config.simulation.datasets.len(),
        config.efficiency.runs
    );

    let results = EfficiencyStudy::new(config).show_progress(!options.quiet).run()?;

    for result in &results {
        println!(
            "\n{} {} → {}",
            style("✓").green(),
            style(&result.dataset).bold(),
            result.runtimes_file.display()
        );
        println!("  {:<16} {:>10} {:>10} {:>12}", "label", "mean", "std dev", "ESS_bulk/s");
        for s in &result.summaries {
            println!(
                "  {:<16} {:>10.2} {:>10.2} {:>12.2}",
                s.label, s.mean, s.std_dev, s.ess_bulk_per_sec
            );
        }
    }

    Ok(results)
}
