//! Configuration management for the churn prediction service

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub detection: DetectionConfig,
    pub training: TrainingConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Model artifact configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Path the service loads the artifact from at startup, and the default
    /// path training writes to
    #[serde(default = "default_artifact_path")]
    pub artifact_path: String,
}

/// Risk detection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// Threshold applied when a request omits `risk_threshold`
    #[serde(default = "default_risk_threshold")]
    pub default_risk_threshold: f64,
}

/// Training hyperparameters
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    /// Number of boosting rounds
    #[serde(default = "default_n_trees")]
    pub n_trees: usize,
    /// Maximum tree depth
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Shrinkage per boosting round
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Row fraction drawn per tree; 1.0 disables subsampling
    #[serde(default = "default_subsample")]
    pub subsample: f64,
    /// Seed for the stratified split and row subsampling
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Fraction of rows held out for evaluation
    #[serde(default = "default_holdout_fraction")]
    pub holdout_fraction: f64,
    /// Smallest dataset training accepts
    #[serde(default = "default_min_rows")]
    pub min_rows: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_artifact_path() -> String {
    "models/churn_model.bin".to_string()
}

fn default_risk_threshold() -> f64 {
    crate::types::DEFAULT_RISK_THRESHOLD
}

fn default_n_trees() -> usize {
    200
}

fn default_max_depth() -> usize {
    3
}

fn default_learning_rate() -> f64 {
    0.1
}

fn default_subsample() -> f64 {
    1.0
}

fn default_seed() -> u64 {
    42
}

fn default_holdout_fraction() -> f64 {
    0.2
}

fn default_min_rows() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from the default file location
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            model: ModelConfig {
                artifact_path: default_artifact_path(),
            },
            detection: DetectionConfig {
                default_risk_threshold: default_risk_threshold(),
            },
            training: TrainingConfig::default(),
            logging: LoggingConfig {
                level: default_log_level(),
            },
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_trees: default_n_trees(),
            max_depth: default_max_depth(),
            learning_rate: default_learning_rate(),
            subsample: default_subsample(),
            seed: default_seed(),
            holdout_fraction: default_holdout_fraction(),
            min_rows: default_min_rows(),
        }
    }
}
