//! Configuration management for imckids.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "imckids";

/// Default record log file name.
const RECORDS_FILE_NAME: &str = "dados_criancas.csv";

/// Default certificates directory name.
const CERTIFICATES_DIR_NAME: &str = "certificados";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `IMCKIDS_`, sections split on `__`)
/// 2. TOML config file at `~/.config/imckids/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Intake form limits.
    pub intake: IntakeConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the record log.
    /// Defaults to `~/.local/share/imckids/dados_criancas.csv`
    pub records_path: Option<PathBuf>,
    /// Directory holding generated certificates.
    /// Defaults to `~/.local/share/imckids/certificados`
    pub certificates_dir: Option<PathBuf>,
}

/// Accepted ranges for entered measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Minimum height in meters.
    pub min_height_m: f64,
    /// Maximum height in meters.
    pub max_height_m: f64,
    /// Minimum weight in kilograms.
    pub min_weight_kg: f64,
    /// Maximum weight in kilograms.
    pub max_weight_kg: f64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            min_height_m: 0.5,
            max_height_m: 2.5,
            min_weight_kg: 5.0,
            max_weight_kg: 100.0,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("IMCKIDS_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let intake = &self.intake;
        check_range("height_m", intake.min_height_m, intake.max_height_m)?;
        check_range("weight_kg", intake.min_weight_kg, intake.max_weight_kg)?;

        if self.records_path() == self.certificates_dir() {
            return Err(Error::ConfigValidation {
                message: "records_path and certificates_dir must differ".to_string(),
            });
        }

        Ok(())
    }

    /// Get the record log path, resolving defaults if not set.
    #[must_use]
    pub fn records_path(&self) -> PathBuf {
        self.storage
            .records_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(RECORDS_FILE_NAME))
    }

    /// Get the certificates directory, resolving defaults if not set.
    #[must_use]
    pub fn certificates_dir(&self) -> PathBuf {
        self.storage
            .certificates_dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(CERTIFICATES_DIR_NAME))
    }
}

fn check_range(name: &str, min: f64, max: f64) -> Result<()> {
    if !(min.is_finite() && min > 0.0) {
        return Err(Error::ConfigValidation {
            message: format!("min_{name} must be a positive number, got {min}"),
        });
    }
    if !(max.is_finite() && max >= min) {
        return Err(Error::ConfigValidation {
            message: format!("max_{name} ({max}) cannot be less than min_{name} ({min})"),
        });
    }
    Ok(())
}
