//! @acp:module "Draws"
//! @acp:summary "Per-chain draws and timings read from CmdStan output CSV files"
//! @acp:domain stats
//! @acp:layer service

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use super::diagnostics::{ess_bulk, rhat};
use crate::error::{CaseStudyError, Result};
use crate::summary::SummaryTable;

/// Log density column written by every CmdStan sampler
pub const LP_COLUMN: &str = "lp__";

/// Columns of the summary computed from draws
pub const SUMMARY_COLUMNS: [&str; 5] = ["Mean", "StdDev", "ESS_bulk", "ESS_bulk/s", "R_hat"];

/// Wall-clock timings CmdStan reports at the end of a chain's CSV
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChainTiming {
    pub warmup: f64,
    pub sampling: f64,
    pub total: f64,
}

/// @acp:summary "Draws of one fit, one matrix per chain"
#[derive(Debug, Clone, Default)]
pub struct Draws {
    /// Column names from the CSV header
    pub columns: Vec<String>,
    /// `chains[chain][column][draw]`
    pub chains: Vec<Vec<Vec<f64>>>,
    /// Timing block of each chain
    pub timings: Vec<ChainTiming>,
}

fn timing_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"#\s*(?:Elapsed Time:)?\s*([0-9.eE+-]+)\s*seconds\s*\((Warm-up|Sampling|Total)\)")
            .expect("static pattern is valid")
    })
}

/// Parse the `Elapsed Time` comment block of one chain
pub fn parse_timing(content: &str) -> Option<ChainTiming> {
    let mut timing = ChainTiming::default();
    let mut found_total = false;
    for caps in timing_pattern().captures_iter(content) {
        let seconds: f64 = caps[1].parse().ok()?;
        match &caps[2] {
            "Warm-up" => timing.warmup = seconds,
            "Sampling" => timing.sampling = seconds,
            _ => {
                timing.total = seconds;
                found_total = true;
            }
        }
    }
    found_total.then_some(timing)
}

impl Draws {
    /// @acp:summary "Read one CSV per chain"
    pub fn from_cmdstan_csv(paths: &[PathBuf]) -> Result<Self> {
        let mut draws = Draws::default();
        for path in paths {
            let (columns, chain, timing) = read_chain(path)?;
            if draws.columns.is_empty() {
                draws.columns = columns;
            } else if draws.columns != columns {
                return Err(CaseStudyError::parse(path, "columns differ from the first chain"));
            }
            draws.chains.push(chain);
            draws.timings.push(timing);
        }
        Ok(draws)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Draws of one column, one vector per chain
    pub fn column(&self, name: &str) -> Option<Vec<Vec<f64>>> {
        let idx = self.column_index(name)?;
        Some(self.chains.iter().map(|c| c[idx].clone()).collect())
    }

    /// Sum of the per-chain total times
    pub fn total_seconds(&self) -> f64 {
        self.timings.iter().map(|t| t.total).sum()
    }

    /// @acp:summary "Summarize every parameter plus lp__"
    ///
    /// Sampler diagnostics (other `__` columns) are left out. `ESS_bulk/s`
    /// divides by `seconds`, normally [`Draws::total_seconds`].
    pub fn summary(&self, seconds: f64) -> Result<SummaryTable> {
        let mut table = SummaryTable::new(SUMMARY_COLUMNS.iter().map(|c| c.to_string()).collect());

        for (idx, name) in self.columns.iter().enumerate() {
            if name.ends_with("__") && name != LP_COLUMN {
                continue;
            }
            let chains: Vec<Vec<f64>> = self.chains.iter().map(|c| c[idx].clone()).collect();
            let pooled: Vec<f64> = chains.iter().flatten().copied().collect();
            let n = pooled.len() as f64;
            let mean = pooled.iter().sum::<f64>() / n;
            let sd = (pooled.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();
            let ess = ess_bulk(&chains);

            table.push_row(name.clone(), vec![mean, sd, ess, ess / seconds, rhat(&chains)])?;
        }

        Ok(table)
    }
}

fn read_chain(path: &Path) -> Result<(Vec<String>, Vec<Vec<f64>>, ChainTiming)> {
    let content = std::fs::read_to_string(path)?;
    let timing = parse_timing(&content)
        .ok_or_else(|| CaseStudyError::parse(path, "no elapsed time block"))?;

    let mut reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .from_reader(content.as_bytes());
    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut chain: Vec<Vec<f64>> = vec![Vec::new(); columns.len()];

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        for (col, field) in record.iter().enumerate().take(columns.len()) {
            let value = field.trim().parse::<f64>().map_err(|_| {
                CaseStudyError::parse(path, format!("draw {}: bad value {:?} in {}", row + 1, field, columns[col]))
            })?;
            chain[col].push(value);
        }
    }

    Ok((columns, chain, timing))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAIN_CSV: &str = "\
# model = binomial_4preds_ozs_model
# id = 1
lp__,accept_stat__,beta_0
# Adaptation terminated
# Step size = 0.5
-10.5,0.9,1.0
-10.1,0.8,1.2
-9.8,0.95,0.9
-10.0,0.7,1.1
-10.2,0.85,1.05
#
#  Elapsed Time: 0.012 seconds (Warm-up)
#                0.010 seconds (Sampling)
#                0.022 seconds (Total)
#
";

    #[test]
    fn test_parse_timing() {
        let t = parse_timing(CHAIN_CSV).unwrap();
        assert_eq!(t.warmup, 0.012);
        assert_eq!(t.sampling, 0.010);
        assert_eq!(t.total, 0.022);
        assert!(parse_timing("lp__\n1.0\n").is_none());
    }

    #[test]
    fn test_read_two_chains() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = (1..=2)
            .map(|i| {
                let p = dir.path().join(format!("output_{}.csv", i));
                std::fs::write(&p, CHAIN_CSV).unwrap();
                p
            })
            .collect();

        let draws = Draws::from_cmdstan_csv(&paths).unwrap();
        assert_eq!(draws.columns, vec!["lp__", "accept_stat__", "beta_0"]);
        assert_eq!(draws.chains.len(), 2);
        assert_eq!(draws.column("beta_0").unwrap()[1].len(), 5);
        assert!((draws.total_seconds() - 0.044).abs() < 1e-12);

        let summary = draws.summary(draws.total_seconds()).unwrap();
        let names: Vec<_> = summary.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["lp__", "beta_0"]);
        assert!((summary.get("beta_0", "Mean").unwrap() - 1.05).abs() < 1e-12);
    }

    #[test]
    fn test_missing_timing_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("bad.csv");
        std::fs::write(&p, "lp__\n-1.0\n").unwrap();
        assert!(Draws::from_cmdstan_csv(&[p]).is_err());
    }
}
