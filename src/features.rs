//! Feature contract shared by training and inference.
//!
//! The contract is the fixed schema both sides agree on: two named column
//! groups projected from a [`CustomerRecord`] in a stable order. A model
//! artifact records the schema it was fitted against, and loading refuses a
//! schema that no longer matches.

use crate::error::{PipelineError, Result};
use crate::types::CustomerRecord;
use serde::{Deserialize, Serialize};

/// Numeric feature columns, in contract order.
pub const NUMERIC_FEATURES: [&str; 9] = [
    "tenure",
    "monthly_charges",
    "total_charges",
    "avg_session_length",
    "avg_session_count_monthly",
    "days_since_last_activity",
    "support_tickets_count",
    "items_purchased_6m",
    "avg_purchase_value",
];

/// Categorical feature columns, in contract order. Boolean flags are
/// categorical columns whose values are "true" and "false".
pub const CATEGORICAL_FEATURES: [&str; 6] = [
    "contract_type",
    "payment_method",
    "subscription_tier",
    "has_premium_support",
    "has_family_plan",
    "has_multiple_devices",
];

/// Total number of raw input features.
pub fn feature_count() -> usize {
    NUMERIC_FEATURES.len() + CATEGORICAL_FEATURES.len()
}

/// Project a record onto the numeric group, in contract order.
pub fn numeric_values(record: &CustomerRecord) -> [Option<f64>; 9] {
    [
        record.tenure,
        record.monthly_charges,
        record.total_charges,
        record.avg_session_length,
        record.avg_session_count_monthly,
        record.days_since_last_activity,
        record.support_tickets_count,
        record.items_purchased_6m,
        record.avg_purchase_value,
    ]
}

/// Project a record onto the categorical group, in contract order.
pub fn categorical_values(record: &CustomerRecord) -> [Option<String>; 6] {
    [
        record.contract_type.clone(),
        record.payment_method.clone(),
        record.subscription_tier.clone(),
        record.has_premium_support.map(flag_category),
        record.has_family_plan.map(flag_category),
        record.has_multiple_devices.map(flag_category),
    ]
}

fn flag_category(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}

/// Validate a prediction batch against the contract.
///
/// Nulls within a column are fine (they are imputed downstream), but a
/// feature that is null in every row of a non-empty batch means the caller
/// sent a malformed batch rather than sparse data.
pub fn validate_batch(records: &[CustomerRecord]) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }

    for (i, name) in NUMERIC_FEATURES.iter().enumerate() {
        if records.iter().all(|r| numeric_values(r)[i].is_none()) {
            return Err(PipelineError::DataValidation(format!(
                "feature '{name}' is missing from every row in the batch"
            )));
        }
    }

    for (i, name) in CATEGORICAL_FEATURES.iter().enumerate() {
        if records.iter().all(|r| categorical_values(r)[i].is_none()) {
            return Err(PipelineError::DataValidation(format!(
                "feature '{name}' is missing from every row in the batch"
            )));
        }
    }

    Ok(())
}

/// The named column groups a fitted model was trained against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl FeatureSchema {
    /// Schema of the contract compiled into this binary.
    pub fn current() -> Self {
        Self {
            numeric: NUMERIC_FEATURES.iter().map(|s| s.to_string()).collect(),
            categorical: CATEGORICAL_FEATURES.iter().map(|s| s.to_string()).collect(),
        }
    }
}
