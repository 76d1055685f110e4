use std::{fmt, fs, path::Path};

use serde::{Deserialize, Serialize};

const DEFAULT_EVALUATION_CONFIG_YAML: &str =
    include_str!("../../config/evaluation.default.yaml");

/// Parameters shared by the sampling, Monte Carlo, and occupancy routines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub gamma: f64,
    /// Step limit for episodes fed to Monte Carlo evaluation.
    pub max_steps: usize,
    /// Number of episodes sampled for Monte Carlo evaluation.
    pub episodes: usize,
    /// Step limit and time horizon for occupancy estimation.
    pub occupancy_max_steps: usize,
    /// Number of episodes sampled per policy for occupancy estimation.
    pub occupancy_episodes: usize,
    pub seed: u64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        EvaluationConfig {
            gamma: 0.5,
            max_steps: 20,
            episodes: 1000,
            occupancy_max_steps: 1000,
            occupancy_episodes: 1000,
            seed: 0,
        }
    }
}

impl EvaluationConfig {
    /// Parse an evaluation config from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: EvaluationConfig = serde_yaml::from_str(yaml).map_err(ConfigError::Yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse an evaluation config from a YAML file path.
    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_yaml_str(&yaml)
    }

    /// Return the default YAML config included with this crate.
    pub fn default_yaml() -> &'static str {
        DEFAULT_EVALUATION_CONFIG_YAML
    }

    /// Parse the default YAML config included with this crate.
    pub fn from_default_yaml() -> Result<Self, ConfigError> {
        Self::from_yaml_str(Self::default_yaml())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gamma.is_finite() || self.gamma <= 0.0 || self.gamma > 1.0 {
            return Err(ConfigError::Invalid(
                "gamma must be finite and in (0, 1]".to_string(),
            ));
        }
        if self.max_steps == 0 {
            return Err(ConfigError::Invalid(
                "max_steps must be greater than 0".to_string(),
            ));
        }
        if self.episodes == 0 {
            return Err(ConfigError::Invalid(
                "episodes must be greater than 0".to_string(),
            ));
        }
        if self.occupancy_max_steps == 0 {
            return Err(ConfigError::Invalid(
                "occupancy_max_steps must be greater than 0".to_string(),
            ));
        }
        if self.occupancy_episodes == 0 {
            return Err(ConfigError::Invalid(
                "occupancy_episodes must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Error type for loading YAML models and `EvaluationConfig`.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "failed to read file: {err}"),
            ConfigError::Yaml(err) => write!(f, "failed to parse YAML: {err}"),
            ConfigError::Invalid(err) => write!(f, "invalid evaluation config: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Yaml(err) => Some(err),
            ConfigError::Invalid(_) => None,
        }
    }
}
