//! @acp:module "Posterior"
//! @acp:summary "CmdStan draws and convergence diagnostics"
//! @acp:domain stats
//! @acp:layer api

pub mod diagnostics;
pub mod draws;

pub use diagnostics::{ess, ess_bulk, normal_quantile, rank_normalize, rhat, split_chains};
pub use draws::{parse_timing, ChainTiming, Draws, LP_COLUMN, SUMMARY_COLUMNS};
