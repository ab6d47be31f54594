//! Simulation configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use dmwda_retarget::RetargetError;
use dmwda_types::RetargetParams;
use dmwda_utils::LogFormat;

use crate::analytics::AnalysisSettings;
use crate::scenario::Scenario;
use crate::SimError;

/// Configuration for a simulation run.
///
/// Every field is optional in TOML; an empty file yields
/// [`SimConfig::default`]. Tables come last so the serialized form stays valid
/// TOML.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Difficulty at genesis.
    #[serde(default = "default_initial_difficulty")]
    pub initial_difficulty: u64,

    /// Base seed; each scenario derives its own from it.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Scenarios to run, in report order.
    #[serde(default = "default_scenarios")]
    pub scenarios: Vec<Scenario>,

    /// Directory receiving the JSON and Markdown reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Retargeting parameters. Missing keys take production values.
    #[serde(default)]
    pub params: RetargetParams,

    #[serde(default)]
    pub analysis: AnalysisSettings,
}

fn default_initial_difficulty() -> u64 {
    1_000_000
}

fn default_seed() -> u64 {
    42
}

fn default_scenarios() -> Vec<Scenario> {
    Scenario::ALL.to_vec()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./dmwda_reports")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl SimConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SimError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, SimError> {
        toml::from_str(s).map_err(|e| SimError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, SimError> {
        toml::to_string_pretty(self).map_err(|e| SimError::Config(e.to_string()))
    }

    /// Check everything a run depends on before any work starts.
    pub fn validate(&self) -> Result<(), SimError> {
        self.params
            .validate()
            .and_then(|()| self.params.check_initial_difficulty(self.initial_difficulty))
            .map_err(RetargetError::from)?;
        if self.scenarios.is_empty() {
            return Err(SimError::Config("no scenarios selected".to_string()));
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            initial_difficulty: default_initial_difficulty(),
            seed: default_seed(),
            scenarios: default_scenarios(),
            output_dir: default_output_dir(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            params: RetargetParams::default(),
            analysis: AnalysisSettings::default(),
        }
    }
}
