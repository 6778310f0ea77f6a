//! @acp:module "Sampler"
//! @acp:summary "Runs compiled CmdStan models and collects their draws"
//! @acp:domain stats
//! @acp:layer service

use std::path::{Path, PathBuf};
use std::process::Command;

use rayon::prelude::*;

use crate::error::{CaseStudyError, Result};
use crate::posterior::Draws;

/// Progress output interval passed to CmdStan; large enough to keep it quiet
const REFRESH: u32 = 10_000;

/// @acp:summary "Something that can fit a model to a data file"
pub trait Sampler: Send + Sync {
    /// Label used in logs and output rows
    fn label(&self) -> &str;

    /// Run one fit (all chains) and return its draws and timings
    fn sample(&self, data: &Path) -> Result<Draws>;
}

/// @acp:summary "A compiled CmdStan model binary"
#[derive(Debug, Clone)]
pub struct CmdStanExecutable {
    label: String,
    executable: PathBuf,
    chains: usize,
    work_dir: PathBuf,
}

impl CmdStanExecutable {
    pub fn new(
        label: impl Into<String>,
        executable: impl Into<PathBuf>,
        chains: usize,
        work_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let executable = executable.into();
        if !executable.is_file() {
            return Err(CaseStudyError::invalid(format!(
                "model executable not found: {}",
                executable.display()
            )));
        }
        if chains == 0 {
            return Err(CaseStudyError::invalid("at least one chain is required"));
        }
        Ok(Self {
            label: label.into(),
            executable,
            chains,
            work_dir: work_dir.into(),
        })
    }

    fn output_path(&self, chain_id: usize) -> PathBuf {
        self.work_dir
            .join(format!("{}-{}.csv", self.label, chain_id))
    }

    fn run_chain(&self, data: &Path, chain_id: usize, seed: u32) -> Result<PathBuf> {
        let output = self.output_path(chain_id);
        let result = Command::new(&self.executable)
            .arg("sample")
            .arg("data")
            .arg(format!("file={}", data.display()))
            .arg("output")
            .arg(format!("file={}", output.display()))
            .arg(format!("refresh={}", REFRESH))
            .arg("random")
            .arg(format!("seed={}", seed))
            .arg(format!("id={}", chain_id))
            .output()
            .map_err(|e| CaseStudyError::Sampler {
                path: self.executable.clone(),
                message: e.to_string(),
            })?;

        if !result.status.success() {
            return Err(CaseStudyError::Sampler {
                path: self.executable.clone(),
                message: format!(
                    "chain {} exited with {}: {}",
                    chain_id,
                    result.status,
                    String::from_utf8_lossy(&result.stderr).trim()
                ),
            });
        }
        Ok(output)
    }
}

impl Sampler for CmdStanExecutable {
    fn label(&self) -> &str {
        &self.label
    }

    fn sample(&self, data: &Path) -> Result<Draws> {
        std::fs::create_dir_all(&self.work_dir)?;
        // chains share one seed and differ by id, as CmdStan expects
        let seed: u32 = rand::random();

        let outputs = (1..=self.chains)
            .into_par_iter()
            .map(|id| self.run_chain(data, id, seed))
            .collect::<Result<Vec<_>>>()?;

        tracing::trace!(model = %self.label, seed, chains = self.chains, "Fit finished");
        Draws::from_cmdstan_csv(&outputs)
    }
}
