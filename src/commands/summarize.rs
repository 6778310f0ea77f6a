//! @acp:module "Summarize Command"
//! @acp:summary "Render a predictor's posterior summary as HTML"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Reads one stansummary CSV, or two for a small/large comparison laid
//! out side by side.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use console::style;

use crate::summary::{
    expand_true, side_by_side, style_table, summarize_predictor, SummaryTable, DEFAULT_TITLE_LEFT,
    DEFAULT_TITLE_RIGHT,
};

/// Options for the summarize command
#[derive(Debug, Clone)]
pub struct SummarizeOptions {
    /// stansummary CSV file
    pub summary: PathBuf,
    /// Second summary shown on the right
    pub compare: Option<PathBuf>,
    /// Parameter name pattern
    pub predictor: String,
    /// Divider every N rows
    pub modulus: usize,
    /// True values shown as a label column
    pub truth: Vec<f64>,
    /// Write HTML here instead of stdout
    pub output: Option<PathBuf>,
}

fn predictor_html(path: &Path, predictor: &str, modulus: usize) -> Result<String> {
    let table = SummaryTable::from_csv(path)
        .with_context(|| format!("Failed to read summary {}", path.display()))?;
    let rows = summarize_predictor(&table, predictor)?;
    if rows.rows.is_empty() {
        eprintln!(
            "{} No parameters match {:?} in {}",
            style("⚠").yellow(),
            predictor,
            path.display()
        );
    }
    Ok(style_table(&rows, modulus))
}

/// Execute the summarize command
pub fn execute_summarize(options: SummarizeOptions) -> Result<String> {
    let left = predictor_html(&options.summary, &options.predictor, options.modulus)?;

    let html = match options.compare {
        Some(ref right_path) => {
            let right = predictor_html(right_path, &options.predictor, options.modulus)?;
            let labels = if options.truth.is_empty() {
                String::new()
            } else {
                expand_true(&options.truth, "true value")
            };
            side_by_side(&left, &right, &labels, DEFAULT_TITLE_LEFT, DEFAULT_TITLE_RIGHT)?
        }
        None => left,
    };

    match options.output {
        Some(ref path) => {
            std::fs::write(path, &html)?;
            println!("{} HTML written to {}", style("✓").green(), path.display());
        }
        None => println!("{}", html),
    }

    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUMMARY_CSV: &str = "\
name,Mean,MCSE,StdDev,ESS_bulk,ESS_bulk/s,R_hat
\"lp__\",-120.5,0.1,2.0,800,400,1.0
\"beta_eth[2]\",-0.31,0.01,0.2,900,450,1.0
\"beta_eth[1]\",0.52,0.01,0.2,950,475,1.0
\"beta_eth[3]\",-0.21,0.01,0.2,870,435,1.01
";

    fn options(dir: &Path, compare: bool) -> SummarizeOptions {
        let summary = dir.join("small.csv");
        std::fs::write(&summary, SUMMARY_CSV).unwrap();
        let compare = compare.then(|| {
            let large = dir.join("large.csv");
            std::fs::write(&large, SUMMARY_CSV).unwrap();
            large
        });
        SummarizeOptions {
            summary,
            compare,
            predictor: "beta_eth".to_string(),
            modulus: 3,
            truth: vec![0.5, -0.3, -0.2],
            output: Some(dir.join("out.html")),
        }
    }

    #[test]
    fn test_single_summary_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let html = execute_summarize(options(dir.path(), false)).unwrap();

        assert_eq!(std::fs::read_to_string(dir.path().join("out.html")).unwrap(), html);
        assert!(html.starts_with("<table"));
        assert!(!html.contains("lp__"));
        let first = html.find("beta_eth[1]").unwrap();
        let third = html.find("beta_eth[3]").unwrap();
        assert!(first < third);
        assert!(html.contains("0.52"));
    }

    #[test]
    fn test_comparison_has_both_titles() {
        let dir = tempfile::tempdir().unwrap();
        let html = execute_summarize(options(dir.path(), true)).unwrap();

        assert!(html.contains(DEFAULT_TITLE_LEFT));
        assert!(html.contains(DEFAULT_TITLE_RIGHT));
        assert!(html.contains("true value"));
    }

    #[test]
    fn test_missing_summary_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(dir.path(), false);
        opts.summary = dir.path().join("absent.csv");
        let err = execute_summarize(opts).unwrap_err();
        assert!(err.to_string().contains("absent.csv"));
    }
}
