//! @acp:module "Fit Timing"
//! @acp:summary "Wall-clock time and ESS/sec of repeated fits"
//! @acp:domain stats
//! @acp:layer service

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::sampler::Sampler;
use crate::error::{CaseStudyError, Result};
use crate::posterior::{ess_bulk, LP_COLUMN};

/// One fit's cost
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitTiming {
    /// Sum of the chains' total times
    pub total_seconds: f64,
    /// Bulk ESS of lp__ per second of total time
    pub ess_bulk_per_sec: f64,
}

/// Aggregate over all fits of one model/dataset combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingSummary {
    pub label: String,
    pub mean: f64,
    pub std_dev: f64,
    pub ess_bulk_per_sec: f64,
}

/// Fit once and measure
pub fn time_fit(sampler: &dyn Sampler, data: &Path) -> Result<FitTiming> {
    let draws = sampler.sample(data)?;
    let total_seconds = draws.total_seconds();
    if total_seconds <= 0.0 {
        return Err(CaseStudyError::Sampler {
            path: data.to_path_buf(),
            message: format!("{} reported no elapsed time", sampler.label()),
        });
    }

    let lp = draws
        .column(LP_COLUMN)
        .ok_or_else(|| CaseStudyError::MissingColumn(LP_COLUMN.to_string()))?;

    Ok(FitTiming {
        total_seconds,
        ess_bulk_per_sec: ess_bulk(&lp) / total_seconds,
    })
}

/// @acp:summary "Fit `n` times and record each fit's timing"
pub fn time_fits(n: usize, sampler: &dyn Sampler, data: &Path) -> Result<Vec<FitTiming>> {
    (0..n)
        .map(|i| {
            tracing::debug!(model = sampler.label(), run = i, "Timing fit");
            time_fit(sampler, data)
        })
        .collect()
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// @acp:summary "Mean and spread of run times per label"
///
/// `std_dev` is the population standard deviation. All values are rounded
/// to two decimals; input order is kept.
pub fn summarize_times(runs: &[(String, Vec<FitTiming>)]) -> Result<Vec<TimingSummary>> {
    runs.iter()
        .map(|(label, timings)| {
            if timings.is_empty() {
                return Err(CaseStudyError::invalid(format!("no timings for {}", label)));
            }
            let n = timings.len() as f64;
            let mean = timings.iter().map(|t| t.total_seconds).sum::<f64>() / n;
            let var = timings
                .iter()
                .map(|t| (t.total_seconds - mean).powi(2))
                .sum::<f64>()
                / n;
            let ess = timings.iter().map(|t| t.ess_bulk_per_sec).sum::<f64>() / n;

            Ok(TimingSummary {
                label: label.clone(),
                mean: round2(mean),
                std_dev: round2(var.sqrt()),
                ess_bulk_per_sec: round2(ess),
            })
        })
        .collect()
}

/// Column-oriented JSON: `{"mean": {label: v}, "std dev": {...}, "ESS_bulk/s": {...}}`
pub fn runtimes_json(summaries: &[TimingSummary]) -> Result<String> {
    let mut columns: IndexMap<&str, IndexMap<&str, f64>> = IndexMap::new();
    for s in summaries {
        columns.entry("mean").or_default().insert(&s.label, s.mean);
        columns.entry("std dev").or_default().insert(&s.label, s.std_dev);
        columns
            .entry("ESS_bulk/s")
            .or_default()
            .insert(&s.label, s.ess_bulk_per_sec);
    }
    Ok(serde_json::to_string(&columns)?)
}

/// @acp:summary "Write summaries as a runtimes JSON file"
pub fn write_runtimes_json<P: AsRef<Path>>(path: P, summaries: &[TimingSummary]) -> Result<()> {
    std::fs::write(path, runtimes_json(summaries)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(total: f64, ess: f64) -> FitTiming {
        FitTiming {
            total_seconds: total,
            ess_bulk_per_sec: ess,
        }
    }

    #[test]
    fn test_summarize_population_std() {
        let out = summarize_times(&[
            ("ozs small".to_string(), vec![t(1.0, 100.0), t(3.0, 200.0)]),
            ("hard small".to_string(), vec![t(2.0, 50.0)]),
        ])
        .unwrap();

        assert_eq!(out[0].label, "ozs small");
        assert_eq!(out[0].mean, 2.0);
        assert_eq!(out[0].std_dev, 1.0);
        assert_eq!(out[0].ess_bulk_per_sec, 150.0);
        assert_eq!(out[1].std_dev, 0.0);
    }

    #[test]
    fn test_summarize_rounds() {
        let out = summarize_times(&[("x".to_string(), vec![t(1.0 / 3.0, 2.0 / 3.0)])]).unwrap();
        assert_eq!(out[0].mean, 0.33);
        assert_eq!(out[0].ess_bulk_per_sec, 0.67);
    }

    #[test]
    fn test_empty_runs_rejected() {
        assert!(summarize_times(&[("x".to_string(), vec![])]).is_err());
    }

    #[test]
    fn test_runtimes_json_layout() {
        let summaries = summarize_times(&[
            ("ozs large".to_string(), vec![t(4.0, 10.0)]),
            ("soft large".to_string(), vec![t(8.0, 5.0)]),
        ])
        .unwrap();
        let json = runtimes_json(&summaries).unwrap();
        assert_eq!(
            json,
            r#"{"mean":{"ozs large":4.0,"soft large":8.0},"std dev":{"ozs large":0.0,"soft large":0.0},"ESS_bulk/s":{"ozs large":10.0,"soft large":5.0}}"#
        );
    }
}
