//! @acp:module "Commands"
//! @acp:summary "CLI command implementations"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Provides implementations for all CLI commands.
//! Each command is in its own submodule for maintainability.

pub mod efficiency;
pub mod init;
pub mod map;
pub mod pages;
pub mod simulate;
pub mod summarize;

pub use efficiency::{execute_efficiency, EfficiencyOptions};
pub use init::{execute_init, InitOptions};
pub use map::{execute_map, MapOptions};
pub use pages::{execute_pages, PagesOptions};
pub use simulate::{execute_simulate, SimulateOptions};
pub use summarize::{execute_summarize, SummarizeOptions};
