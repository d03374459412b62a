//! Customer Churn Prediction Pipeline Library
//!
//! A tabular churn-prediction pipeline: a fixed feature contract,
//! median/mode imputation with standardization and one-hot encoding, a
//! gradient-boosted tree classifier, artifact persistence, and an HTTP
//! prediction service on top.

pub mod config;
pub mod error;
pub mod features;
pub mod metrics;
pub mod models;
pub mod service;
pub mod synthetic;
pub mod types;

pub use config::AppConfig;
pub use error::{PipelineError, Result};
pub use models::{ChurnModel, InferenceEngine};
pub use types::{CustomerRecord, LabeledCustomer, PredictionResult};
