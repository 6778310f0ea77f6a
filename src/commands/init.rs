//! @acp:module "Init Command"
//! @acp:summary "Write a default configuration file"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::{bail, Result};
use console::style;

use crate::config::Config;

/// Options for the init command
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Config path to create
    pub path: PathBuf,
    /// Force overwrite existing config
    pub force: bool,
}

/// Execute the init command
pub fn execute_init(options: InitOptions) -> Result<()> {
    if options.path.exists() && !options.force {
        bail!(
            "{} already exists. Use --force to overwrite.",
            options.path.display()
        );
    }

    Config::default().save(&options.path)?;
    println!("{} Created {}", style("✓").green(), options.path.display());

    println!("\n{}", style("Next steps:").bold());
    println!("  1. Run {} to build the site indexes", style("casestudy pages").cyan());
    println!(
        "  2. Compile the binomial models, then run {}",
        style("casestudy efficiency").cyan()
    );

    Ok(())
}
