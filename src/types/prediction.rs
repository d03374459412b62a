//! Prediction output data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default high-risk threshold when a request does not supply one.
pub const DEFAULT_RISK_THRESHOLD: f64 = 0.5;

/// Churn prediction for a single customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Identifier of the scored customer
    pub customer_id: String,

    /// Churn probability in [0, 1]
    pub churn_probability: f64,

    /// Whether the probability meets or exceeds the request threshold
    pub is_high_risk: bool,

    /// When the prediction was produced
    pub prediction_time: DateTime<Utc>,
}

impl PredictionResult {
    /// Build a result from a probability and the caller's risk threshold.
    pub fn new(customer_id: String, churn_probability: f64, risk_threshold: f64) -> Self {
        Self {
            customer_id,
            churn_probability,
            is_high_risk: is_high_risk(churn_probability, risk_threshold),
            prediction_time: Utc::now(),
        }
    }
}

/// Risk flag rule: a probability exactly at the threshold is high-risk.
pub fn is_high_risk(probability: f64, threshold: f64) -> bool {
    probability >= threshold
}
