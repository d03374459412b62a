//! Model pipeline: preprocessing, classifier, training, persistence, inference

pub mod artifact;
pub mod gbdt;
pub mod inference;
pub mod preprocess;
pub mod training;

pub use artifact::ChurnModel;
pub use gbdt::{GbdtConfig, GradientBoostedTrees};
pub use inference::InferenceEngine;
pub use preprocess::{FittedPreprocessor, Preprocessor};
pub use training::{train, TrainingOutput};
