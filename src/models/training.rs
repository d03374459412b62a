//! Training procedure: stratified split, leak-free fit, artifact persistence.

use crate::config::TrainingConfig;
use crate::error::{PipelineError, Result};
use crate::models::artifact::ChurnModel;
use crate::models::gbdt::{GbdtConfig, GradientBoostedTrees};
use crate::models::preprocess::Preprocessor;
use crate::types::{CustomerRecord, LabeledCustomer};
use std::path::{Path, PathBuf};
use tracing::info;

/// Summary of a completed training run.
#[derive(Debug, Clone)]
pub struct TrainingOutput {
    /// Where the artifact was written
    pub artifact_path: PathBuf,
    /// Rows in the training split
    pub train_rows: usize,
    /// Rows in the holdout split
    pub holdout_rows: usize,
    /// Log-loss on the holdout split (None when the holdout is empty)
    pub holdout_log_loss: Option<f64>,
    /// Accuracy at 0.5 on the holdout split
    pub holdout_accuracy: Option<f64>,
}

/// Train a churn model and persist it to `artifact_path`.
///
/// Splits the labeled data into training and holdout sets with a seeded
/// stratified split, fits the preprocessor and classifier on the training
/// split only, evaluates on the holdout, and writes one artifact file. The
/// holdout never influences any fitted statistic.
pub fn train<P: AsRef<Path>>(
    data: &[LabeledCustomer],
    config: &TrainingConfig,
    artifact_path: P,
) -> Result<TrainingOutput> {
    if data.len() < config.min_rows {
        return Err(PipelineError::DataValidation(format!(
            "training requires at least {} rows, got {}",
            config.min_rows,
            data.len()
        )));
    }

    let labels: Vec<u8> = data.iter().map(|l| l.churned).collect();
    let (train_idx, holdout_idx) =
        stratified_split(&labels, config.holdout_fraction, config.seed)?;

    info!(
        total = data.len(),
        train = train_idx.len(),
        holdout = holdout_idx.len(),
        seed = config.seed,
        "Stratified split complete"
    );

    let train_records: Vec<CustomerRecord> = train_idx
        .iter()
        .map(|&i| data[i].record.clone())
        .collect();
    let train_labels: Vec<u8> = train_idx.iter().map(|&i| labels[i]).collect();

    let preprocessor = Preprocessor::fit(&train_records)?;
    let matrix = preprocessor.transform(&train_records);

    let gbdt_config = GbdtConfig {
        n_trees: config.n_trees,
        max_depth: config.max_depth,
        learning_rate: config.learning_rate,
        min_samples_leaf: 1,
        subsample: config.subsample,
        seed: config.seed,
    };
    let classifier = GradientBoostedTrees::fit(&matrix, &train_labels, gbdt_config)?;

    // Holdout evaluation uses the frozen preprocessor; nothing is refitted
    let (holdout_log_loss, holdout_accuracy) = if holdout_idx.is_empty() {
        (None, None)
    } else {
        let holdout_records: Vec<CustomerRecord> = holdout_idx
            .iter()
            .map(|&i| data[i].record.clone())
            .collect();
        let holdout_labels: Vec<u8> = holdout_idx.iter().map(|&i| labels[i]).collect();
        let probs = classifier.predict_probability(&preprocessor.transform(&holdout_records));
        (
            Some(log_loss(&probs, &holdout_labels)),
            Some(accuracy(&probs, &holdout_labels)),
        )
    };

    info!(
        trees = classifier.n_trees(),
        holdout_log_loss = ?holdout_log_loss,
        holdout_accuracy = ?holdout_accuracy,
        "Training complete"
    );

    let model = ChurnModel::new(preprocessor, classifier);
    model.save(artifact_path.as_ref())?;

    Ok(TrainingOutput {
        artifact_path: artifact_path.as_ref().to_path_buf(),
        train_rows: train_idx.len(),
        holdout_rows: holdout_idx.len(),
        holdout_log_loss,
        holdout_accuracy,
    })
}

/// Split row indices into (train, holdout), preserving class proportions.
///
/// Fails with a data-validation error when fewer than two classes are
/// present; the split is never silently downgraded to an unstratified one.
/// The training side always keeps at least one row of every class.
fn stratified_split(
    labels: &[u8],
    holdout_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    let mut by_class: std::collections::BTreeMap<u8, Vec<usize>> = Default::default();
    for (i, &label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(i);
    }

    if by_class.len() < 2 {
        return Err(PipelineError::DataValidation(
            "stratified split requires at least two label classes".to_string(),
        ));
    }

    let mut train = Vec::new();
    let mut holdout = Vec::new();
    for (class, mut indices) in by_class {
        shuffle_indices(&mut indices, seed ^ u64::from(class));

        let want = (indices.len() as f64 * holdout_fraction).round() as usize;
        let take = want.min(indices.len() - 1);
        holdout.extend_from_slice(&indices[..take]);
        train.extend_from_slice(&indices[take..]);
    }

    train.sort_unstable();
    holdout.sort_unstable();
    Ok((train, holdout))
}

/// Fisher-Yates shuffle driven by a simple LCG, so splits reproduce exactly
/// for a given seed on any platform.
fn shuffle_indices(indices: &mut [usize], seed: u64) {
    let mut state = seed.wrapping_add(0x9e3779b97f4a7c15);
    for i in (1..indices.len()).rev() {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let j = ((state >> 33) as usize) % (i + 1);
        indices.swap(i, j);
    }
}

fn log_loss(probs: &[f64], labels: &[u8]) -> f64 {
    let eps = 1e-15;
    let total: f64 = probs
        .iter()
        .zip(labels)
        .map(|(p, &y)| {
            let p = p.clamp(eps, 1.0 - eps);
            if y == 1 {
                -p.ln()
            } else {
                -(1.0 - p).ln()
            }
        })
        .sum();
    total / probs.len() as f64
}

fn accuracy(probs: &[f64], labels: &[u8]) -> f64 {
    let correct = probs
        .iter()
        .zip(labels)
        .filter(|(p, &y)| (**p >= 0.5) == (y == 1))
        .count();
    correct as f64 / probs.len() as f64
}
