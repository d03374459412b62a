//! Inference engine serving predictions from a loaded model.

use crate::error::{PipelineError, Result};
use crate::models::artifact::ChurnModel;
use crate::types::{CustomerRecord, PredictionResult};
use std::path::Path;
use tracing::debug;

/// A loaded model plus the configured default risk threshold.
///
/// All state is frozen at construction; `predict` is a pure read, so one
/// engine can serve any number of concurrent requests behind an `Arc`.
pub struct InferenceEngine {
    model: ChurnModel,
    default_threshold: f64,
}

impl InferenceEngine {
    /// Wrap an already-loaded model.
    pub fn new(model: ChurnModel, default_threshold: f64) -> Self {
        Self {
            model,
            default_threshold,
        }
    }

    /// Load the artifact at `path` and build an engine around it.
    pub fn from_artifact<P: AsRef<Path>>(path: P, default_threshold: f64) -> Result<Self> {
        Ok(Self::new(ChurnModel::load(path)?, default_threshold))
    }

    /// Threshold applied when a request does not supply one.
    pub fn default_threshold(&self) -> f64 {
        self.default_threshold
    }

    /// The wrapped model.
    pub fn model(&self) -> &ChurnModel {
        &self.model
    }

    /// Score a batch of customers.
    ///
    /// Returns exactly one result per input row, in input order. Rows with
    /// missing values are imputed; a feature absent from every row is a
    /// data-validation error. The loaded model is never mutated.
    pub fn predict(
        &self,
        records: &[CustomerRecord],
        risk_threshold: Option<f64>,
    ) -> Result<Vec<PredictionResult>> {
        let threshold = risk_threshold.unwrap_or(self.default_threshold);
        if !(0.0..=1.0).contains(&threshold) {
            return Err(PipelineError::DataValidation(format!(
                "risk threshold must be within [0, 1], got {threshold}"
            )));
        }

        let probabilities = self.model.predict_probability(records)?;

        let results: Vec<PredictionResult> = records
            .iter()
            .zip(&probabilities)
            .map(|(record, &probability)| {
                PredictionResult::new(record.customer_id.clone(), probability, threshold)
            })
            .collect();

        debug!(
            batch = results.len(),
            threshold,
            high_risk = results.iter().filter(|r| r.is_high_risk).count(),
            "Batch scored"
        );

        Ok(results)
    }
}
