//! @acp:module "Index Generator"
//! @acp:summary "Walks a site tree and writes index.md into every directory"
//! @acp:domain pages
//! @acp:layer service
//!
//! Directories holding `.stan` programs get Stan Playground embeds,
//! every other directory gets a navigation listing. Existing index
//! files are always overwritten.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use super::render::{render_directory_listing, render_playground_index};
use super::scan::{find_stan_pairs, has_stan_pairs_recursive, list_files, list_subdirs, StanPair, INDEX_FILE};
use crate::config::PagesConfig;
use crate::error::Result;

/// Counters reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenerateStats {
    pub directories_scanned: usize,
    pub created: usize,
    pub updated: usize,
    pub errors: usize,
}

impl GenerateStats {
    /// Directories whose index was written (or would be, in a dry run)
    pub fn processed(&self) -> usize {
        self.created + self.updated
    }
}

/// What happened to one directory's index file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "action", content = "detail")]
pub enum IndexAction {
    Created,
    Updated,
    Failed(String),
}

/// Per-directory result
#[derive(Debug, Clone, Serialize)]
pub struct IndexEntry {
    /// Path of the index file
    pub path: PathBuf,
    /// Stan programs found directly in the directory
    pub pairs: Vec<StanPair>,
    pub action: IndexAction,
}

/// Result of a full run
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateReport {
    pub stats: GenerateStats,
    pub entries: Vec<IndexEntry>,
}

/// @acp:summary "Index file generator for a GitHub Pages tree"
pub struct IndexGenerator {
    config: PagesConfig,
    dry_run: bool,
}

impl IndexGenerator {
    pub fn new(config: PagesConfig) -> Self {
        Self {
            config,
            dry_run: false,
        }
    }

    /// Render and report without touching the filesystem
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// @acp:summary "Generate index.md for root and every non-skipped descendant"
    pub fn generate<P: AsRef<Path>>(&self, root: P) -> Result<GenerateReport> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(crate::CaseStudyError::invalid(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let mut report = GenerateReport::default();
        self.process_directory(root, &mut report);

        let walker = WalkDir::new(root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                !e.file_type().is_dir() || !self.config.is_skipped(&e.file_name().to_string_lossy())
            });

        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_dir() => {
                    self.process_directory(entry.path(), &mut report);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                }
            }
        }

        tracing::info!(
            scanned = report.stats.directories_scanned,
            created = report.stats.created,
            updated = report.stats.updated,
            errors = report.stats.errors,
            "Index generation finished"
        );
        Ok(report)
    }

    /// @acp:summary "Render and write one directory's index.md"
    /// Failures are recorded in the report; the walk continues.
    pub fn process_directory(&self, dir: &Path, report: &mut GenerateReport) {
        report.stats.directories_scanned += 1;
        let index_path = dir.join(INDEX_FILE);
        let existed_before = index_path.exists();

        let (pairs, rendered) = match self.render_directory(dir) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Cannot render {}: {}", index_path.display(), e);
                report.stats.errors += 1;
                report.entries.push(IndexEntry {
                    path: index_path,
                    pairs: Vec::new(),
                    action: IndexAction::Failed(e.to_string()),
                });
                return;
            }
        };

        if !pairs.is_empty() {
            tracing::debug!("Found {} Stan/data pair(s) in {}", pairs.len(), dir.display());
        }

        let written = if self.dry_run {
            Ok(())
        } else {
            fs::write(&index_path, rendered)
        };

        let action = match written {
            Ok(()) if existed_before => {
                report.stats.updated += 1;
                IndexAction::Updated
            }
            Ok(()) => {
                report.stats.created += 1;
                IndexAction::Created
            }
            Err(e) => {
                tracing::warn!("Error writing {}: {}", index_path.display(), e);
                report.stats.errors += 1;
                IndexAction::Failed(e.to_string())
            }
        };

        report.entries.push(IndexEntry {
            path: index_path,
            pairs,
            action,
        });
    }

    /// Pick the template for `dir` and render it
    pub fn render_directory(&self, dir: &Path) -> Result<(Vec<StanPair>, String)> {
        let pairs = find_stan_pairs(dir)?;
        let files = list_files(dir)?;

        if !pairs.is_empty() {
            let content = render_playground_index(&pairs, &files, &self.config);
            return Ok((pairs, content));
        }

        let (with_stan, other): (Vec<String>, Vec<String>) = list_subdirs(dir, &self.config)?
            .into_iter()
            .partition(|name| has_stan_pairs_recursive(&dir.join(name), &self.config));

        let content = render_directory_listing(&directory_name(dir), &with_stan, &other, &files);
        Ok((pairs, content))
    }
}

/// @acp:summary "Generate index files under `root` with the default page settings"
pub fn generate_index_files<P: AsRef<Path>>(root: P) -> Result<GenerateStats> {
    Ok(IndexGenerator::new(PagesConfig::default()).generate(root)?.stats)
}

/// Display name of a directory; `.` and other relative roots resolve to their real name
fn directory_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .or_else(|| {
            dir.canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        })
        .unwrap_or_else(|| dir.display().to_string())
}
