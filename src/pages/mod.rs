//! @acp:module "Pages"
//! @acp:summary "index.md generator for the GitHub Pages deployment"
//! @acp:domain pages
//! @acp:layer api
//!
//! Every directory of the published tree gets an `index.md`:
//! - directories with `.stan` programs embed each program in Stan
//!   Playground (with its `.data.json` when present) and link all files
//! - other directories list subdirectories, split by whether they hold
//!   Stan programs anywhere below, followed by their files
//!
//! Hidden directories and `node_modules`, `__pycache__`, `.git`, `_site`
//! are skipped.

pub mod generator;
pub mod render;
pub mod scan;

pub use generator::{generate_index_files, GenerateReport, GenerateStats, IndexAction, IndexEntry, IndexGenerator};
pub use render::{render_directory_listing, render_playground_index};
pub use scan::{find_stan_pairs, has_stan_pairs_recursive, list_files, list_subdirs, StanPair, INDEX_FILE};
