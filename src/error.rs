//! Error types for the churn prediction pipeline

use thiserror::Error;

/// Errors surfaced by the pipeline core.
///
/// Every failure is reported to the immediate caller; the core never retries
/// and never substitutes a default probability for a failed prediction.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An operation was invoked before the state it requires existed,
    /// e.g. predict before a model was trained or loaded.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Malformed input: a feature missing from every row of a batch, or a
    /// training set with fewer than two label classes.
    #[error("data validation error: {0}")]
    DataValidation(String),

    /// A persisted model is missing, undecodable, or was produced against a
    /// different feature contract.
    #[error("artifact error: {0}")]
    Artifact(String),

    /// Reading or writing the artifact failed at the filesystem level.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::DataValidation("labels contain a single class".to_string());
        assert_eq!(
            err.to_string(),
            "data validation error: labels contain a single class"
        );

        let err = PipelineError::Configuration("model not trained or loaded".to_string());
        assert!(err.to_string().starts_with("configuration error"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: PipelineError = io.into();
        assert!(matches!(err, PipelineError::Io(_)));
    }
}
