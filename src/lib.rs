#![forbid(unsafe_code)]

//! @acp:module "Case Study Library"
//! @acp:summary "Tooling behind the sum_to_zero_vector case study and its published site"
//! @acp:domain cli
//! @acp:layer api
//! @acp:stability stable
//!
//! # Case study tools
//!
//! Two independent groups of utilities:
//!
//! - **Case study helpers**: seeded binomial data simulation, sum-to-zero
//!   transforms, posterior summary tables rendered as HTML, BYM2 edge
//!   lists built from GeoJSON maps, and an ESS/sec timing study over
//!   compiled CmdStan models
//! - **Pages**: an `index.md` generator that embeds every Stan program of
//!   a directory tree in Stan Playground
//!
//! ## Example
//!
//! ```rust,no_run
//! use casestudy::{Config, IndexGenerator};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load_or_default();
//!     let report = IndexGenerator::new(config.pages).generate(".")?;
//!     println!("{} directories", report.stats.directories_scanned);
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod config;
pub mod efficiency;
pub mod error;
pub mod logging;
pub mod map;
pub mod pages;
pub mod posterior;
pub mod simulate;
pub mod sum_to_zero;
pub mod summary;

// Re-exports
pub use config::Config;
pub use efficiency::{CmdStanExecutable, EfficiencyStudy, FitTiming, Sampler, TimingSummary};
pub use error::{CaseStudyError, Result};
pub use map::{AdjacencyGraph, Bym2Data, Contiguity};
pub use pages::{GenerateStats, IndexGenerator, StanPair};
pub use posterior::Draws;
pub use simulate::{simulate_data, BinomialData, SimulationInputs};
pub use sum_to_zero::{sum_to_zero_constrain, sum_to_zero_free, Constraint};
pub use summary::{summarize_predictor, SummaryTable};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
