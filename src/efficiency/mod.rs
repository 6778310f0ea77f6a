//! @acp:module "Efficiency"
//! @acp:summary "ESS/sec comparison of the sum-to-zero model variants"
//! @acp:domain stats
//! @acp:layer api

pub mod sampler;
pub mod study;
pub mod timing;

pub use sampler::{CmdStanExecutable, Sampler};
pub use study::{DatasetResult, EfficiencyStudy};
pub use timing::{
    runtimes_json, summarize_times, time_fit, time_fits, write_runtimes_json, FitTiming, TimingSummary,
};
