//! @acp:module "Summary Table"
//! @acp:summary "Posterior summary rows keyed by parameter name"
//! @acp:domain stats
//! @acp:layer core

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CaseStudyError, Result};

/// Columns shown for each predictor in the case study tables
pub const PREDICTOR_COLUMNS: [&str; 4] = ["Mean", "StdDev", "ESS_bulk/s", "R_hat"];

/// One parameter's summary statistics, aligned with `SummaryTable::columns`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub name: String,
    pub values: Vec<f64>,
}

/// @acp:summary "A posterior summary table (stansummary layout)"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryTable {
    pub columns: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(CaseStudyError::invalid(format!(
                "row has {} values, table has {} columns",
                values.len(),
                self.columns.len()
            )));
        }
        self.rows.push(SummaryRow {
            name: name.into(),
            values,
        });
        Ok(())
    }

    /// @acp:summary "Read a stansummary --csv_filename file"
    /// Lines starting with `#` are ignored; the first column holds the name.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .comment(Some(b'#'))
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        if headers.len() < 2 {
            return Err(CaseStudyError::parse(path, "expected a name column and at least one statistic"));
        }
        let mut table = Self::new(headers.iter().skip(1).map(str::to_string).collect());

        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let Some(name) = record.get(0) else { continue };
            let mut values = Vec::with_capacity(table.columns.len());
            for i in 1..=table.columns.len() {
                values.push(parse_stat(record.get(i).unwrap_or("")).ok_or_else(|| {
                    CaseStudyError::parse(path, format!("row {}: bad value in column {}", line + 1, i))
                })?);
            }
            table.push_row(name, values)?;
        }

        Ok(table)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn row(&self, name: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.name == name)
    }

    /// Value of one statistic for one parameter
    pub fn get(&self, name: &str, column: &str) -> Option<f64> {
        let idx = self.column_index(column)?;
        self.row(name).map(|r| r.values[idx])
    }

    /// Keep only the given columns, in the given order
    pub fn select(&self, columns: &[&str]) -> Result<Self> {
        let indices = columns
            .iter()
            .map(|c| {
                self.column_index(c)
                    .ok_or_else(|| CaseStudyError::MissingColumn(c.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| SummaryRow {
                    name: r.name.clone(),
                    values: indices.iter().map(|&i| r.values[i]).collect(),
                })
                .collect(),
        })
    }

    /// Rows whose name matches `pattern` anywhere
    pub fn filter(&self, pattern: &Regex) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|r| pattern.is_match(&r.name))
                .cloned()
                .collect(),
        }
    }
}

fn parse_stat(raw: &str) -> Option<f64> {
    let raw = raw.trim_matches('"');
    if raw.is_empty() {
        return Some(f64::NAN);
    }
    raw.parse().ok()
}

fn index_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[a-z_]*\[(\d+)\]").expect("static pattern is valid"))
}

/// Element index of a container parameter, e.g. `beta_age[3]` -> 3
pub fn extract_numeric_index(name: &str) -> Option<usize> {
    index_pattern()
        .captures(name)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// @acp:summary "Summary rows for one predictor, in element order"
///
/// `name` is a regular expression matched anywhere in the parameter name.
/// Rows are sorted by name; when `name` mentions an element (`[`), they are
/// then ordered by element index so `[10]` follows `[9]`.
pub fn summarize_predictor(table: &SummaryTable, name: &str) -> Result<SummaryTable> {
    let pattern = Regex::new(name)?;
    let mut filtered = table.filter(&pattern);
    filtered.rows.sort_by(|a, b| a.name.cmp(&b.name));

    if name.contains('[') {
        filtered.rows.sort_by_key(|r| extract_numeric_index(&r.name).unwrap_or(usize::MAX));
    }

    filtered.select(&PREDICTOR_COLUMNS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> SummaryTable {
        let mut t = SummaryTable::new(
            ["Mean", "StdDev", "ESS_bulk", "ESS_bulk/s", "R_hat"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        for (name, mean) in [
            ("lp__", -100.0),
            ("beta_age[10]", 0.10),
            ("beta_age[2]", 0.02),
            ("beta_age[1]", 0.01),
            ("beta_eth[1]", 0.5),
        ] {
            t.push_row(name, vec![mean, 1.0, 800.0, 400.0, 1.0]).unwrap();
        }
        t
    }

    #[test]
    fn test_extract_numeric_index() {
        assert_eq!(extract_numeric_index("beta_age[12]"), Some(12));
        assert_eq!(extract_numeric_index("lp__"), None);
    }

    #[test]
    fn test_predictor_numeric_order() {
        let out = summarize_predictor(&sample_table(), r"beta_age\[").unwrap();
        let names: Vec<_> = out.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["beta_age[1]", "beta_age[2]", "beta_age[10]"]);
        assert_eq!(out.columns, PREDICTOR_COLUMNS);
        assert_eq!(out.rows[2].values, vec![0.10, 1.0, 400.0, 1.0]);
    }

    #[test]
    fn test_predictor_lexical_without_bracket() {
        let out = summarize_predictor(&sample_table(), "beta_age").unwrap();
        let names: Vec<_> = out.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["beta_age[10]", "beta_age[1]", "beta_age[2]"]);
    }

    #[test]
    fn test_missing_column() {
        let t = sample_table().select(&["Mean"]).unwrap();
        assert!(matches!(
            summarize_predictor(&t, "beta"),
            Err(CaseStudyError::MissingColumn(c)) if c == "StdDev"
        ));
    }

    #[test]
    fn test_from_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        std::fs::write(
            &path,
            "name,Mean,StdDev,R_hat\n\
             \"lp__\",-12.5,1.1,1.00\n\
             \"beta[1]\",0.25,0.05,nan\n\
             # Samples were drawn using hmc with nuts.\n",
        )
        .unwrap();

        let t = SummaryTable::from_csv(&path).unwrap();
        assert_eq!(t.columns, vec!["Mean", "StdDev", "R_hat"]);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.get("lp__", "Mean"), Some(-12.5));
        assert!(t.get("beta[1]", "R_hat").unwrap().is_nan());
    }
}
