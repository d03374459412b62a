//! Type definitions for the churn prediction pipeline

pub mod customer;
pub mod prediction;

pub use customer::{CustomerRecord, LabeledCustomer};
pub use prediction::{PredictionResult, DEFAULT_RISK_THRESHOLD};
