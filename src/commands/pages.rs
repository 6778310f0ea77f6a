//! @acp:module "Pages Command"
//! @acp:summary "Generate index.md files for the GitHub Pages tree"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `casestudy pages`.

use std::path::PathBuf;

use anyhow::Result;
use console::style;

use crate::config::Config;
use crate::pages::{GenerateReport, IndexAction, IndexGenerator};

/// Options for the pages command
#[derive(Debug, Clone)]
pub struct PagesOptions {
    /// Root of the tree to index
    pub root: PathBuf,
    /// Render without writing
    pub dry_run: bool,
    /// Emit the report as JSON
    pub json: bool,
}

impl Default for PagesOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            dry_run: false,
            json: false,
        }
    }
}

/// Execute the pages command
pub fn execute_pages(options: PagesOptions, config: Config) -> Result<GenerateReport> {
    let generator = IndexGenerator::new(config.pages).dry_run(options.dry_run);

    if options.json {
        let report = generator.generate(&options.root)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report);
    }

    println!("{} Creating index.md files under {}", style("→").cyan(), options.root.display());
    if options.dry_run {
        println!("  {}", style("(dry run, nothing is written)").dim());
    }
    println!();

    let report = generator.generate(&options.root)?;

    for entry in &report.entries {
        if !entry.pairs.is_empty() {
            println!(
                "Found {} Stan/data pair(s) in {}",
                entry.pairs.len(),
                entry.path.parent().map(|p| p.display().to_string()).unwrap_or_default()
            );
            for pair in &entry.pairs {
                println!(
                    "  - {} + {}",
                    pair.stan,
                    pair.data.as_deref().unwrap_or("(no data)")
                );
            }
        }
        match &entry.action {
            IndexAction::Created => {
                println!("  {} Created {}", style("✓").green(), entry.path.display())
            }
            IndexAction::Updated => {
                println!("  {} Updated {}", style("✓").green(), entry.path.display())
            }
            IndexAction::Failed(e) => {
                println!("  {} Error writing {}: {}", style("✗").red(), entry.path.display(), e)
            }
        }
    }

    let stats = report.stats;
    println!();
    println!("{}", style("Summary").bold());
    println!("  Directories scanned: {}", stats.directories_scanned);
    println!("  Index files created: {}", stats.created);
    println!("  Index files updated: {}", stats.updated);
    println!("  Errors encountered: {}", stats.errors);

    if stats.processed() > 0 {
        println!(
            "\n{} Successfully processed {} directories",
            style("✓").green(),
            stats.processed()
        );
    } else {
        println!("\nNo directories found to process.");
    }

    Ok(report)
}
