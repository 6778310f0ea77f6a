//! @acp:module "Sum To Zero"
//! @acp:summary "Zero-sum constraint transforms and the model variants compared in the case study"
//! @acp:domain stats
//! @acp:layer core
//!
//! # Sum-to-zero constraints
//!
//! A categorical predictor with an intercept is only identified up to an
//! additive constant. The case study compares three ways of pinning it down:
//!
//! - **Isometric** (`sum_to_zero_vector`): `N - 1` unconstrained values are
//!   mapped onto the zero-sum hyperplane by an orthogonal transform, so
//!   every element gets the same marginal variance
//! - **Hard**: the last element is the negated sum of the others
//!   (equivalently, subtract the mean)
//! - **Soft**: all `N` elements are free and `sum(x) ~ normal(0, 0.001 * N)`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CaseStudyError, Result};

/// Scale factor of the soft constraint used by the binomial models
pub const SOFT_SCALE: f64 = 0.001;

/// Tolerance for deciding a vector already sums to zero
pub const ZERO_SUM_TOLERANCE: f64 = 1e-8;

/// Constraint variant of a model in the timing study
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Constraint {
    /// `sum_to_zero_vector` (label `ozs`)
    #[serde(rename = "ozs")]
    Isometric,
    Hard,
    Soft,
}

impl Constraint {
    pub const ALL: [Constraint; 3] = [Constraint::Isometric, Constraint::Hard, Constraint::Soft];

    pub fn label(&self) -> &'static str {
        match self {
            Constraint::Isometric => "ozs",
            Constraint::Hard => "hard",
            Constraint::Soft => "soft",
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Constraint {
    type Err = CaseStudyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ozs" | "isometric" | "sum_to_zero_vector" => Ok(Constraint::Isometric),
            "hard" => Ok(Constraint::Hard),
            "soft" => Ok(Constraint::Soft),
            _ => Err(CaseStudyError::invalid(format!("Unknown constraint: {}", s))),
        }
    }
}

/// Map `N - 1` free values onto a zero-sum vector of length `N`.
///
/// An empty input yields `[0.0]`.
pub fn sum_to_zero_constrain(y: &[f64]) -> Vec<f64> {
    let n = y.len();
    let mut z = vec![0.0; n + 1];
    let mut sum_w = 0.0;

    for i in (1..=n).rev() {
        let k = i as f64;
        let w = y[i - 1] / (k * (k + 1.0)).sqrt();
        sum_w += w;
        z[i - 1] += sum_w;
        z[i] -= w * k;
    }

    z
}

/// Inverse of [`sum_to_zero_constrain`].
///
/// Fails if `z` is empty or does not sum to zero.
pub fn sum_to_zero_free(z: &[f64]) -> Result<Vec<f64>> {
    if z.is_empty() {
        return Err(CaseStudyError::invalid("cannot free an empty vector"));
    }
    let total: f64 = z.iter().sum();
    let scale = z.iter().fold(1.0_f64, |m, v| m.max(v.abs()));
    if total.abs() > ZERO_SUM_TOLERANCE * scale * z.len() as f64 {
        return Err(CaseStudyError::invalid(format!(
            "vector sums to {}, not zero",
            total
        )));
    }

    let n = z.len() - 1;
    let mut y = vec![0.0; n];
    if n == 0 {
        return Ok(y);
    }

    let nf = n as f64;
    y[n - 1] = -z[n] * (nf * (nf + 1.0)).sqrt() / nf;

    let mut sum_w = 0.0;
    for i in (0..n - 1).rev() {
        let k = (i + 1) as f64;
        let w = y[i + 1] / ((k + 1.0) * (k + 2.0)).sqrt();
        sum_w += w;
        y[i] = (sum_w - z[i + 1]) * (k * (k + 1.0)).sqrt() / k;
    }

    Ok(y)
}

/// Hard constraint: subtract the mean
pub fn center(x: &[f64]) -> Vec<f64> {
    if x.is_empty() {
        return Vec::new();
    }
    let mean = x.iter().sum::<f64>() / x.len() as f64;
    x.iter().map(|v| v - mean).collect()
}

/// Hard constraint as written in the `hard` model: append the negated sum
pub fn append_negated_sum(free: &[f64]) -> Vec<f64> {
    let mut out = free.to_vec();
    out.push(-free.iter().sum::<f64>());
    out
}

/// Soft constraint log density: `normal_lpdf(sum(x) | 0, scale * N)`
pub fn soft_penalty(x: &[f64], scale: f64) -> f64 {
    let sigma = scale * x.len() as f64;
    let s: f64 = x.iter().sum();
    -0.5 * (s / sigma).powi(2) - sigma.ln() - 0.5 * (2.0 * std::f64::consts::PI).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-10, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn test_constrain_sums_to_zero() {
        let z = sum_to_zero_constrain(&[0.3, -1.2, 2.5, 0.0, 4.1]);
        assert_eq!(z.len(), 6);
        assert!(z.iter().sum::<f64>().abs() < 1e-12);
    }

    #[test]
    fn test_constrain_single_value() {
        let z = sum_to_zero_constrain(&[2.0]);
        let h = 2.0 / 2.0_f64.sqrt();
        assert_close(&z, &[h, -h]);
    }

    #[test]
    fn test_constrain_is_isometric() {
        let y = [1.0, -0.5, 0.25];
        let z = sum_to_zero_constrain(&y);
        let norm_y: f64 = y.iter().map(|v| v * v).sum();
        let norm_z: f64 = z.iter().map(|v| v * v).sum();
        assert!((norm_y - norm_z).abs() < 1e-12);
    }

    #[test]
    fn test_free_inverts_constrain() {
        let y = vec![0.7, -2.0, 1.5, 3.25, -0.1, 0.0, 9.0];
        let z = sum_to_zero_constrain(&y);
        assert_close(&sum_to_zero_free(&z).unwrap(), &y);
    }

    #[test]
    fn test_free_rejects_nonzero_sum() {
        assert!(sum_to_zero_free(&[1.0, 1.0]).is_err());
        assert!(sum_to_zero_free(&[]).is_err());
        assert!(sum_to_zero_free(&[0.0]).unwrap().is_empty());
    }

    #[test]
    fn test_hard_variants() {
        let c = center(&[1.0, 2.0, 6.0]);
        assert_close(&c, &[-2.0, -1.0, 3.0]);
        assert_close(&append_negated_sum(&[1.0, 2.0]), &[1.0, 2.0, -3.0]);
    }

    #[test]
    fn test_soft_penalty_prefers_zero_sum() {
        let balanced = soft_penalty(&[1.0, -1.0, 0.0], SOFT_SCALE);
        let off = soft_penalty(&[1.0, -1.0, 0.01], SOFT_SCALE);
        assert!(balanced > off);
    }

    #[test]
    fn test_constraint_labels() {
        assert_eq!("ozs".parse::<Constraint>().unwrap(), Constraint::Isometric);
        assert_eq!("HARD".parse::<Constraint>().unwrap(), Constraint::Hard);
        assert!("loose".parse::<Constraint>().is_err());
        assert_eq!(serde_json::to_string(&Constraint::Isometric).unwrap(), "\"ozs\"");
        assert_eq!(Constraint::Soft.to_string(), "soft");
    }
}
