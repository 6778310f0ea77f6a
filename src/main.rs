#![forbid(unsafe_code)]
//! Case study command line interface

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use console::style;

use casestudy::commands::{
    execute_efficiency, execute_init, execute_map, execute_pages, execute_simulate,
    execute_summarize, EfficiencyOptions, InitOptions, MapOptions, PagesOptions, SimulateOptions,
    SummarizeOptions,
};
use casestudy::config::DEFAULT_CONFIG_FILE;
use casestudy::logging::init_logging;
use casestudy::{Config, Contiguity};

#[derive(Parser)]
#[command(name = "casestudy")]
#[command(about = "Stan case study tooling: site indexes, data simulation, posterior summaries, BYM2 maps")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Verbose output (repeat for more)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Create index.md files embedding Stan programs in Stan Playground
    Pages {
        /// Root directory of the site
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Show what would be written without touching any file
        #[arg(long)]
        dry_run: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Simulate a binomial dataset for the sum-to-zero models
    Simulate {
        /// Output .data.json file
        #[arg(short, long)]
        output: PathBuf,

        /// Observations per stratum
        #[arg(long)]
        obs_per_stratum: Option<usize>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Render a stansummary CSV for one predictor as an HTML table
    Summarize {
        /// stansummary CSV file
        summary: PathBuf,

        /// Parameter name, e.g. beta_eth
        #[arg(short, long)]
        predictor: String,

        /// Second summary rendered next to the first
        #[arg(long)]
        compare: Option<PathBuf>,

        /// Draw a divider every N rows (0 disables)
        #[arg(short, long, default_value_t = 3)]
        modulus: usize,

        /// True parameter values shown beside a comparison
        #[arg(long, value_delimiter = ',')]
        truth: Vec<f64>,

        /// Write HTML to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Time each compiled model on the configured datasets
    Efficiency {
        /// Number of fits per model
        #[arg(long)]
        runs: Option<usize>,

        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Build BYM2 edge list and scaling factor from a GeoJSON map
    Map {
        /// GeoJSON FeatureCollection of polygons
        input: PathBuf,

        /// Output .data.json file
        #[arg(short, long)]
        output: PathBuf,

        /// Feature property holding the region id
        #[arg(long)]
        id_property: Option<String>,

        /// Neighbour rule: queen or rook
        #[arg(long)]
        contiguity: Option<Contiguity>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        tracing::debug!("No config at {}, using defaults", cli.config.display());
        Config::default()
    };

    if matches!(cli.command, Commands::Efficiency { .. }) && !cli.config.exists() {
        eprintln!("{} No {} found", style("⚠").yellow(), cli.config.display());
        eprintln!("  Using built-in model paths; run 'casestudy init' to customize them");
    }

    match cli.command {
        Commands::Init { force } => {
            execute_init(InitOptions { path: cli.config, force })?;
        }

        Commands::Pages { root, dry_run, json } => {
            let options = PagesOptions { root, dry_run, json };
            execute_pages(options, config)?;
        }

        Commands::Simulate { output, obs_per_stratum, seed } => {
            let options = SimulateOptions { output, obs_per_stratum, seed };
            execute_simulate(options, config)?;
        }

        Commands::Summarize { summary, predictor, compare, modulus, truth, output } => {
            let options = SummarizeOptions {
                summary,
                compare,
                predictor,
                modulus,
                truth,
                output,
            };
            execute_summarize(options)?;
        }

        Commands::Efficiency { runs, quiet } => {
            execute_efficiency(EfficiencyOptions { runs, quiet }, config)?;
        }

        Commands::Map { input, output, id_property, contiguity } => {
            let options = MapOptions { input, output, id_property, contiguity };
            execute_map(options, config)?;
        }
    }

    Ok(())
}
