//! Offline Model Training
//!
//! Trains a churn model and writes the artifact the service loads at
//! startup. Never exposed over the network.
//!
//! Usage: `train [data.json] [artifact_path]`
//!
//! With a data file, rows are read as a JSON array of labeled customers;
//! without one, the synthetic dataset (1000 rows, configured seed) is used.
//! The artifact path defaults to the configured `model.artifact_path`.

use anyhow::{Context, Result};
use churn_prediction_pipeline::{
    config::AppConfig,
    models::training,
    synthetic::SyntheticDataGenerator,
    types::LabeledCustomer,
};
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "churn_prediction_pipeline=info,train=info".into()),
        )
        .init();

    info!("Starting model training");

    let config = AppConfig::load().unwrap_or_else(|_| AppConfig::default());

    let args: Vec<String> = std::env::args().collect();
    let data_path = args.get(1).map(|s| s.as_str());
    let artifact_path = args
        .get(2)
        .cloned()
        .unwrap_or_else(|| config.model.artifact_path.clone());

    let data: Vec<LabeledCustomer> = match data_path {
        Some(path) => {
            info!(path = %path, "Loading labeled training data");
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read training data from {path}"))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse training data in {path}"))?
        }
        None => {
            info!(
                rows = 1000,
                seed = config.training.seed,
                "No data file given, generating synthetic training data"
            );
            SyntheticDataGenerator::new(config.training.seed).generate(1000)
        }
    };

    if let Some(parent) = std::path::Path::new(&artifact_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create artifact directory {parent:?}"))?;
        }
    }

    let output = training::train(&data, &config.training, &artifact_path)?;

    info!(
        artifact = %output.artifact_path.display(),
        train_rows = output.train_rows,
        holdout_rows = output.holdout_rows,
        holdout_log_loss = ?output.holdout_log_loss,
        holdout_accuracy = ?output.holdout_accuracy,
        "Model trained and saved successfully"
    );

    Ok(())
}
