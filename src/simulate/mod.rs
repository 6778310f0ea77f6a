//! @acp:module "Simulate"
//! @acp:summary "Seeded binomial data generation for the four-predictor models"
//! @acp:domain stats
//! @acp:layer service
//!
//! Generates one observation per demographic stratum
//! (sex × age × eth × edu). Each stratum gets a number of tests
//! proportional to its population share and a count of positive tests
//! drawn through an imperfect test with known sensitivity and specificity.
//!
//! The true effects of the three multi-level predictors are drawn from a
//! standard normal and centred, so they sum to zero like the parameters
//! the models estimate.

use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Beta, Binomial, Distribution, Gamma, StandardNormal};
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::error::{CaseStudyError, Result};
use crate::sum_to_zero::center;

/// Prior scale for the intercept written into every dataset
pub const INTERCEPT_PRIOR_SCALE: f64 = 2.5;

/// Dirichlet concentration for the demographic proportions
const PCT_CONCENTRATION: f64 = 2.0;

/// Inputs of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationInputs {
    pub n_eth: usize,
    pub n_edu: usize,
    pub n_age: usize,
    /// Intercept on the log-odds scale
    pub baseline: f64,
    pub sens: f64,
    pub spec: f64,
    pub obs_per_stratum: usize,
    pub seed: u64,
}

impl SimulationInputs {
    /// Inputs for one configured dataset size
    pub fn from_config(config: &SimulationConfig, obs_per_stratum: usize) -> Self {
        Self {
            n_eth: config.n_eth,
            n_edu: config.n_edu,
            n_age: config.n_age,
            baseline: config.baseline,
            sens: config.sens,
            spec: config.spec,
            obs_per_stratum,
            seed: config.seed,
        }
    }

    /// Number of strata, one observation each. Call [`SimulationInputs::validate`]
    /// first; the product is not overflow-checked here.
    pub fn strata(&self) -> usize {
        2 * self.n_age * self.n_eth * self.n_edu
    }

    /// Total number of tests spread over all strata
    pub fn total_tests(&self) -> usize {
        self.strata() * self.obs_per_stratum
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("N_eth", self.n_eth),
            ("N_edu", self.n_edu),
            ("N_age", self.n_age),
            ("obs_per_stratum", self.obs_per_stratum),
        ] {
            if value == 0 {
                return Err(CaseStudyError::invalid(format!("{} must be at least 1", name)));
            }
        }
        for (name, value) in [("sens", self.sens), ("spec", self.spec)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CaseStudyError::invalid(format!(
                    "{} must be in [0, 1], got {}",
                    name, value
                )));
            }
        }
        if !self.baseline.is_finite() {
            return Err(CaseStudyError::invalid("baseline must be finite"));
        }
        let total = [self.n_age, self.n_eth, self.n_edu, self.obs_per_stratum]
            .iter()
            .try_fold(2usize, |acc, &n| acc.checked_mul(n));
        if total.is_none() {
            return Err(CaseStudyError::invalid(format!(
                "2 x {} x {} x {} strata with {} tests each is too large",
                self.n_age, self.n_eth, self.n_edu, self.obs_per_stratum
            )));
        }
        Ok(())
    }
}

/// Simulated dataset, serialized with the variable names the Stan models expect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinomialData {
    #[serde(rename = "N")]
    pub n: usize,
    #[serde(rename = "N_age")]
    pub n_age: usize,
    #[serde(rename = "N_eth")]
    pub n_eth: usize,
    #[serde(rename = "N_edu")]
    pub n_edu: usize,
    pub sens: f64,
    pub spec: f64,
    pub intercept_prior_mean: f64,
    pub intercept_prior_scale: f64,
    pub pos_tests: Vec<u64>,
    pub tests: Vec<u64>,
    pub sex: Vec<usize>,
    pub age: Vec<usize>,
    pub eth: Vec<usize>,
    pub edu: Vec<usize>,
    pub beta_0: f64,
    pub pct_sex: f64,
    pub beta_sex: f64,
    pub pct_age: Vec<f64>,
    pub beta_age: Vec<f64>,
    pub pct_eth: Vec<f64>,
    pub beta_eth: Vec<f64>,
    pub pct_edu: Vec<f64>,
    pub beta_edu: Vec<f64>,
    pub seed: u64,
}

impl BinomialData {
    /// @acp:summary "Write the dataset as a .data.json file"
    pub fn write_data_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// @acp:summary "Simulate one binomial dataset"
pub fn simulate_data(inputs: &SimulationInputs) -> Result<BinomialData> {
    inputs.validate()?;
    let mut rng = StdRng::seed_from_u64(inputs.seed);

    let pct_sex = Beta::new(40.0, 60.0)
        .map_err(|e| CaseStudyError::invalid(e.to_string()))?
        .sample(&mut rng);
    let beta_sex: f64 = rng.sample(StandardNormal);

    let pct_age = dirichlet(&mut rng, inputs.n_age)?;
    let beta_age = centered_effects(&mut rng, inputs.n_age);
    let pct_eth = dirichlet(&mut rng, inputs.n_eth)?;
    let beta_eth = centered_effects(&mut rng, inputs.n_eth);
    let pct_edu = dirichlet(&mut rng, inputs.n_edu)?;
    let beta_edu = centered_effects(&mut rng, inputs.n_edu);

    let strata = inputs.strata();
    let total = inputs.total_tests() as f64;
    let mut data = BinomialData {
        n: strata,
        n_age: inputs.n_age,
        n_eth: inputs.n_eth,
        n_edu: inputs.n_edu,
        sens: inputs.sens,
        spec: inputs.spec,
        intercept_prior_mean: inputs.baseline,
        intercept_prior_scale: INTERCEPT_PRIOR_SCALE,
        pos_tests: Vec::with_capacity(strata),
        tests: Vec::with_capacity(strata),
        sex: Vec::with_capacity(strata),
        age: Vec::with_capacity(strata),
        eth: Vec::with_capacity(strata),
        edu: Vec::with_capacity(strata),
        beta_0: inputs.baseline,
        pct_sex,
        beta_sex,
        pct_age,
        beta_age,
        pct_eth,
        beta_eth,
        pct_edu,
        beta_edu,
        seed: inputs.seed,
    };

    for sex in 1..=2 {
        let share_sex = if sex == 1 { pct_sex } else { 1.0 - pct_sex };
        let effect_sex = if sex == 2 { beta_sex } else { 0.0 };
        for a in 0..inputs.n_age {
            for e in 0..inputs.n_eth {
                for d in 0..inputs.n_edu {
                    let share = share_sex * data.pct_age[a] * data.pct_eth[e] * data.pct_edu[d];
                    let tests = ((total * share).round() as u64).max(1);

                    let eta = inputs.baseline
                        + effect_sex
                        + data.beta_age[a]
                        + data.beta_eth[e]
                        + data.beta_edu[d];
                    let p = inv_logit(eta);
                    let p_sample = p * inputs.sens + (1.0 - p) * (1.0 - inputs.spec);

                    let pos = Binomial::new(tests, p_sample.clamp(0.0, 1.0))
                        .map_err(|err| CaseStudyError::invalid(err.to_string()))?
                        .sample(&mut rng);

                    data.sex.push(sex);
                    data.age.push(a + 1);
                    data.eth.push(e + 1);
                    data.edu.push(d + 1);
                    data.tests.push(tests);
                    data.pos_tests.push(pos);
                }
            }
        }
    }

    tracing::debug!(
        strata,
        seed = inputs.seed,
        tests = data.tests.iter().sum::<u64>(),
        positives = data.pos_tests.iter().sum::<u64>(),
        "Simulated binomial dataset"
    );
    Ok(data)
}

pub fn inv_logit(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Symmetric Dirichlet draw via normalized gamma variates
fn dirichlet(rng: &mut StdRng, k: usize) -> Result<Vec<f64>> {
    let gamma = Gamma::new(PCT_CONCENTRATION, 1.0).map_err(|e| CaseStudyError::invalid(e.to_string()))?;
    let draws: Vec<f64> = (0..k).map(|_| gamma.sample(&mut *rng)).collect();
    let total: f64 = draws.iter().sum();
    Ok(draws.into_iter().map(|g| g / total).collect())
}

fn centered_effects(rng: &mut StdRng, k: usize) -> Vec<f64> {
    let raw: Vec<f64> = (0..k).map(|_| rng.sample(StandardNormal)).collect();
    center(&raw)
}
