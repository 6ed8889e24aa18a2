// League configuration loaded from a TOML file.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::{DEFAULT_MIN_COMPLETED_WEEKS, DEFAULT_SIMULATION_COUNT, MAX_STRENGTH};
use crate::league::PredictionPolicy;
use crate::season::SeasonSimulator;
use crate::team::{default_roster, Team};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// File layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationSection {
    #[serde(default = "default_simulations")]
    pub simulations: usize,

    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for SimulationSection {
    fn default() -> Self {
        SimulationSection {
            simulations: DEFAULT_SIMULATION_COUNT,
            seed: None,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionsSection {
    #[serde(default = "default_min_completed_weeks")]
    pub min_completed_weeks: u32,
}

impl Default for PredictionsSection {
    fn default() -> Self {
        PredictionsSection {
            min_completed_weeks: DEFAULT_MIN_COMPLETED_WEEKS,
        }
    }
}

fn default_simulations() -> usize {
    DEFAULT_SIMULATION_COUNT
}

fn default_parallel() -> bool {
    true
}

fn default_min_completed_weeks() -> u32 {
    DEFAULT_MIN_COMPLETED_WEEKS
}

/// Whole-file configuration. Every section is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    #[serde(default = "default_roster")]
    pub teams: Vec<Team>,

    #[serde(default)]
    pub simulation: SimulationSection,

    #[serde(default)]
    pub predictions: PredictionsSection,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        LeagueConfig {
            teams: default_roster(),
            simulation: SimulationSection::default(),
            predictions: PredictionsSection::default(),
        }
    }
}

impl LeagueConfig {
    pub fn simulator(&self) -> SeasonSimulator {
        SeasonSimulator {
            simulations: self.simulation.simulations,
            seed: self.simulation.seed,
            parallel: self.simulation.parallel,
        }
    }

    pub fn prediction_policy(&self) -> PredictionPolicy {
        PredictionPolicy {
            min_completed_weeks: self.predictions.min_completed_weeks,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate a league configuration file.
pub fn load_config(path: &Path) -> Result<LeagueConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config: LeagueConfig = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    validate(&config)?;
    Ok(config)
}

/// Load `path` if given, otherwise fall back to the built-in roster.
pub fn load_or_default(path: Option<&Path>) -> Result<LeagueConfig, ConfigError> {
    match path {
        Some(p) => load_config(p),
        None => Ok(LeagueConfig::default()),
    }
}

fn validation_error(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Check values serde cannot: unique ids, strengths in range, non-empty
/// names and a usable simulation count. Team-count rules for fixtures are
/// left to fixture generation.
pub fn validate(config: &LeagueConfig) -> Result<(), ConfigError> {
    let mut ids = HashSet::new();
    for team in &config.teams {
        if !ids.insert(team.id) {
            return Err(validation_error(
                "teams.id",
                format!("{} is listed more than once", team.id),
            ));
        }
        if team.name.trim().is_empty() {
            return Err(validation_error(
                "teams.name",
                format!("{} has an empty name", team.id),
            ));
        }
        if team.strength == 0 || team.strength > MAX_STRENGTH {
            return Err(validation_error(
                "teams.strength",
                format!(
                    "{} has strength {}; expected 1..={}",
                    team.name, team.strength, MAX_STRENGTH
                ),
            ));
        }
    }

    if config.simulation.simulations == 0 {
        return Err(validation_error(
            "simulation.simulations",
            "must be at least 1",
        ));
    }

    Ok(())
}
