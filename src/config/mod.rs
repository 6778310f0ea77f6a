//! @acp:module "Configuration"
//! @acp:summary "Project configuration loading and defaults"
//! @acp:domain cli
//! @acp:layer config

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::map::Contiguity;

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = ".casestudy.config.json";

/// @acp:summary "Top-level configuration for all subcommands"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Index generator settings
    #[serde(default)]
    pub pages: PagesConfig,

    /// Data simulation settings
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Timing study settings
    #[serde(default)]
    pub efficiency: EfficiencyConfig,

    /// Map preprocessing settings
    #[serde(default)]
    pub map: MapConfig,
}

impl Config {
    /// @acp:summary "Load config from a JSON file"
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// @acp:summary "Save config to a file"
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// @acp:summary "Load from default location or create default config"
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_CONFIG_FILE).unwrap_or_default()
    }
}

// =============================================================================
// Pages: index.md generation
// =============================================================================

fn default_embed_script() -> String {
    "https://stan-playground.flatironinstitute.org/stan-playground-embed.js".to_string()
}

fn default_iframe_height() -> String {
    "800px".to_string()
}

fn default_skip_dirs() -> Vec<String> {
    vec![
        "node_modules".to_string(),
        "__pycache__".to_string(),
        ".git".to_string(),
        "_site".to_string(),
    ]
}

/// @acp:summary "Static-site index generator configuration"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagesConfig {
    /// Script that defines the `<stan-playground-embed>` element
    #[serde(default = "default_embed_script", rename = "embedScript")]
    pub embed_script: String,

    /// Height attribute for the embedded playground iframe
    #[serde(default = "default_iframe_height", rename = "iframeHeight")]
    pub iframe_height: String,

    /// Directory names never descended into (hidden directories are always skipped)
    #[serde(default = "default_skip_dirs", rename = "skipDirs")]
    pub skip_dirs: Vec<String>,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            embed_script: default_embed_script(),
            iframe_height: default_iframe_height(),
            skip_dirs: default_skip_dirs(),
        }
    }
}

impl PagesConfig {
    /// Whether a directory with this name is left out of the walk
    pub fn is_skipped(&self, name: &str) -> bool {
        name.starts_with('.') || self.skip_dirs.iter().any(|d| d == name)
    }
}

// =============================================================================
// Simulation: binomial data generation
// =============================================================================

fn default_n_eth() -> usize {
    3
}

fn default_n_edu() -> usize {
    5
}

fn default_n_age() -> usize {
    9
}

fn default_baseline() -> f64 {
    -3.5
}

fn default_sens() -> f64 {
    0.75
}

fn default_spec() -> f64 {
    0.9995
}

fn default_seed() -> u64 {
    45678
}

fn default_datasets() -> Vec<DatasetConfig> {
    vec![
        DatasetConfig {
            label: "small".to_string(),
            obs_per_stratum: 17,
        },
        DatasetConfig {
            label: "large".to_string(),
            obs_per_stratum: 200,
        },
    ]
}

/// @acp:summary "Simulated population shape and test characteristics"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of ethnicity categories
    #[serde(default = "default_n_eth", rename = "nEth")]
    pub n_eth: usize,

    /// Number of education categories
    #[serde(default = "default_n_edu", rename = "nEdu")]
    pub n_edu: usize,

    /// Number of age categories
    #[serde(default = "default_n_age", rename = "nAge")]
    pub n_age: usize,

    /// Intercept on the log-odds scale
    #[serde(default = "default_baseline")]
    pub baseline: f64,

    /// Test sensitivity
    #[serde(default = "default_sens")]
    pub sens: f64,

    /// Test specificity
    #[serde(default = "default_spec")]
    pub spec: f64,

    /// RNG seed shared by all datasets
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Named dataset sizes
    #[serde(default = "default_datasets")]
    pub datasets: Vec<DatasetConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_eth: default_n_eth(),
            n_edu: default_n_edu(),
            n_age: default_n_age(),
            baseline: default_baseline(),
            sens: default_sens(),
            spec: default_spec(),
            seed: default_seed(),
            datasets: default_datasets(),
        }
    }
}

/// @acp:summary "A named dataset size"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Label used in output file names and row labels
    pub label: String,

    /// Observations per demographic stratum
    #[serde(rename = "obsPerStratum")]
    pub obs_per_stratum: usize,
}

// =============================================================================
// Efficiency: ESS/sec timing study
// =============================================================================

fn default_runs() -> usize {
    100
}

fn default_chains() -> usize {
    4
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_models() -> Vec<ModelConfig> {
    ["ozs", "hard", "soft"]
        .iter()
        .map(|label| ModelConfig {
            label: label.to_string(),
            executable: PathBuf::from(format!("stan/binomial_4preds_{}", label)),
        })
        .collect()
}

/// @acp:summary "Timing study configuration"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EfficiencyConfig {
    /// Fits per model and dataset
    #[serde(default = "default_runs")]
    pub runs: usize,

    /// Chains per fit, run in parallel
    #[serde(default = "default_chains")]
    pub chains: usize,

    /// Compiled model executables to compare
    #[serde(default = "default_models")]
    pub models: Vec<ModelConfig>,

    /// Where runtimes JSON and scratch files go
    #[serde(default = "default_output_dir", rename = "outputDir")]
    pub output_dir: PathBuf,
}

impl Default for EfficiencyConfig {
    fn default() -> Self {
        Self {
            runs: default_runs(),
            chains: default_chains(),
            models: default_models(),
            output_dir: default_output_dir(),
        }
    }
}

/// @acp:summary "A compiled CmdStan model under test"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Short label (ozs, hard, soft)
    pub label: String,

    /// Path to the compiled model binary
    pub executable: PathBuf,
}

// =============================================================================
// Map: BYM2 spatial inputs
// =============================================================================

/// @acp:summary "Map preprocessing configuration"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapConfig {
    /// Feature property holding the region id; feature position when unset
    #[serde(default, rename = "idProperty", skip_serializing_if = "Option::is_none")]
    pub id_property: Option<String>,

    /// Neighbour rule for shared boundaries
    #[serde(default)]
    pub contiguity: Contiguity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_case_study() {
        let config = Config::default();
        assert_eq!(config.simulation.n_age, 9);
        assert_eq!(config.simulation.seed, 45678);
        assert_eq!(config.efficiency.runs, 100);
        assert_eq!(config.efficiency.models.len(), 3);
        assert_eq!(
            config.efficiency.models[0].executable,
            PathBuf::from("stan/binomial_4preds_ozs")
        );
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"pages": {"iframeHeight": "600px"}, "efficiency": {"runs": 5}}"#)
                .unwrap();
        assert_eq!(config.pages.iframe_height, "600px");
        assert_eq!(config.pages.skip_dirs.len(), 4);
        assert_eq!(config.efficiency.runs, 5);
        assert_eq!(config.efficiency.chains, 4);
        assert_eq!(config.simulation.sens, 0.75);
        assert_eq!(config.map.contiguity, Contiguity::Queen);
    }

    #[test]
    fn test_map_section() {
        let config: Config =
            serde_json::from_str(r#"{"map": {"idProperty": "GEOID", "contiguity": "rook"}}"#).unwrap();
        assert_eq!(config.map.id_property.as_deref(), Some("GEOID"));
        assert_eq!(config.map.contiguity, Contiguity::Rook);
    }

    #[test]
    fn test_skip_rules() {
        let pages = PagesConfig::default();
        assert!(pages.is_skipped(".github"));
        assert!(pages.is_skipped("node_modules"));
        assert!(pages.is_skipped("_site"));
        assert!(!pages.is_skipped("sum-to-zero"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        let mut config = Config::default();
        config.simulation.seed = 7;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.simulation.seed, 7);
        assert_eq!(loaded.simulation.datasets[1].obs_per_stratum, 200);
    }
}
