//! Persisted model artifact: fitted preprocessor + fitted classifier.

use crate::error::{PipelineError, Result};
use crate::features::{self, FeatureSchema};
use crate::models::gbdt::GradientBoostedTrees;
use crate::models::preprocess::FittedPreprocessor;
use crate::types::CustomerRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// A trained churn model.
///
/// Immutable once constructed: prediction reads the frozen preprocessing
/// statistics and tree ensemble and never writes back, so a loaded model can
/// be shared across request handlers behind an `Arc` without locking.
/// Retraining produces a new artifact rather than patching this one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnModel {
    schema: FeatureSchema,
    preprocessor: FittedPreprocessor,
    classifier: GradientBoostedTrees,
    trained_at: DateTime<Utc>,
}

impl ChurnModel {
    pub fn new(preprocessor: FittedPreprocessor, classifier: GradientBoostedTrees) -> Self {
        Self {
            schema: FeatureSchema::current(),
            preprocessor,
            classifier,
            trained_at: Utc::now(),
        }
    }

    /// When training finished.
    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    /// Churn probability per record, in input order.
    ///
    /// Validates the batch against the feature contract first; per-row nulls
    /// are imputed by the frozen preprocessor.
    pub fn predict_probability(&self, records: &[CustomerRecord]) -> Result<Vec<f64>> {
        features::validate_batch(records)?;
        let matrix = self.preprocessor.transform(records);
        Ok(self.classifier.predict_probability(&matrix))
    }

    /// Persist the model as a single binary blob.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = bincode::serialize(self)
            .map_err(|e| PipelineError::Artifact(format!("failed to encode model: {e}")))?;
        std::fs::write(path, &bytes)?;

        info!(
            path = %path.display(),
            bytes = bytes.len(),
            trees = self.classifier.n_trees(),
            "Model artifact saved"
        );
        Ok(())
    }

    /// Load a previously persisted model.
    ///
    /// Fails with an artifact error if the file is missing, undecodable, or
    /// was trained against a different feature contract. Independent of the
    /// training path, so inference-only deployments never link training data.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PipelineError::Artifact(format!("model artifact not found at {}", path.display()))
            } else {
                PipelineError::Io(e)
            }
        })?;

        let model: ChurnModel = bincode::deserialize(&bytes).map_err(|e| {
            PipelineError::Artifact(format!(
                "model artifact at {} is not readable: {e}",
                path.display()
            ))
        })?;

        if model.schema != FeatureSchema::current() {
            return Err(PipelineError::Artifact(format!(
                "model artifact at {} was trained against a different feature contract",
                path.display()
            )));
        }

        info!(
            path = %path.display(),
            trees = model.classifier.n_trees(),
            trained_at = %model.trained_at,
            "Model artifact loaded"
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::gbdt::GbdtConfig;
    use crate::models::preprocess::Preprocessor;
    use crate::synthetic::SyntheticDataGenerator;

    fn trained_model() -> (ChurnModel, Vec<CustomerRecord>) {
        let labeled = SyntheticDataGenerator::new(42).generate(80);
        let records: Vec<CustomerRecord> = labeled.iter().map(|l| l.record.clone()).collect();
        let labels: Vec<u8> = labeled.iter().map(|l| l.churned).collect();

        let preprocessor = Preprocessor::fit(&records).unwrap();
        let matrix = preprocessor.transform(&records);
        let config = GbdtConfig {
            n_trees: 15,
            ..GbdtConfig::default()
        };
        let classifier = GradientBoostedTrees::fit(&matrix, &labels, config).unwrap();

        (ChurnModel::new(preprocessor, classifier), records)
    }

    #[test]
    fn test_save_load_round_trip_is_bit_identical() {
        let (model, records) = trained_model();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("churn_model.bin");

        model.save(&path).unwrap();
        let loaded = ChurnModel::load(&path).unwrap();

        assert_eq!(
            model.predict_probability(&records).unwrap(),
            loaded.predict_probability(&records).unwrap()
        );
        assert_eq!(model.trained_at(), loaded.trained_at());
    }

    #[test]
    fn test_load_missing_path_is_artifact_error() {
        let err = ChurnModel::load("/nonexistent/churn_model.bin").unwrap_err();
        assert!(matches!(err, PipelineError::Artifact(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_corrupt_bytes_is_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.bin");
        std::fs::write(&path, b"not a model").unwrap();

        let err = ChurnModel::load(&path).unwrap_err();
        assert!(matches!(err, PipelineError::Artifact(_)));
    }

    #[test]
    fn test_load_rejects_foreign_schema() {
        let (mut model, _) = trained_model();
        model.schema.numeric.push("loyalty_score".to_string());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foreign.bin");
        std::fs::write(&path, bincode::serialize(&model).unwrap()).unwrap();

        let err = ChurnModel::load(&path).unwrap_err();
        assert!(err.to_string().contains("feature contract"));
    }

    #[test]
    fn test_predict_is_idempotent() {
        let (model, records) = trained_model();

        let first = model.predict_probability(&records).unwrap();
        let second = model.predict_probability(&records).unwrap();
        assert_eq!(first, second);
        assert!(first.iter().all(|p| (0.0..=1.0).contains(p)));
    }
}
