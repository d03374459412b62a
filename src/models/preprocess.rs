//! Column-wise preprocessing stage.
//!
//! Two independent transforms composed side by side: numeric columns are
//! median-imputed then standardized, categorical columns are mode-imputed
//! then one-hot encoded. All statistics are learned once at fit time and
//! frozen; transforming new data never updates them.

use crate::error::{PipelineError, Result};
use crate::features::{self, CATEGORICAL_FEATURES, NUMERIC_FEATURES};
use crate::types::CustomerRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Frozen statistics for one numeric column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericColumnStats {
    /// Imputation value: median of the non-missing training values
    pub median: f64,
    /// Standardization offset
    pub mean: f64,
    /// Standardization divisor; 1.0 for zero-variance columns
    pub scale: f64,
}

/// Frozen vocabulary for one categorical column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalColumnVocab {
    /// Imputation value: most frequent training category (ties break to the
    /// lexicographically smallest)
    pub most_frequent: String,
    /// Observed training categories, sorted; one indicator column each
    pub categories: Vec<String>,
}

/// Preprocessing transform fitted on a training set.
///
/// Output layout is fixed: the 9 standardized numeric columns first, then one
/// indicator block per categorical column in contract order. A category seen
/// at transform time but not at fit time encodes as an all-zero block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedPreprocessor {
    numeric: Vec<NumericColumnStats>,
    categorical: Vec<CategoricalColumnVocab>,
    n_output_features: usize,
}

/// Learns imputation statistics, scaling parameters, and category
/// vocabularies from labeled training rows.
pub struct Preprocessor;

impl Preprocessor {
    /// Fit the transform on training records.
    ///
    /// Fails with a data-validation error if any contract feature is missing
    /// from every training row; per-row gaps are expected and imputable.
    pub fn fit(records: &[CustomerRecord]) -> Result<FittedPreprocessor> {
        if records.is_empty() {
            return Err(PipelineError::DataValidation(
                "cannot fit preprocessor on an empty training set".to_string(),
            ));
        }

        let mut numeric = Vec::with_capacity(NUMERIC_FEATURES.len());
        for (i, name) in NUMERIC_FEATURES.iter().enumerate() {
            let values: Vec<f64> = records
                .iter()
                .filter_map(|r| features::numeric_values(r)[i])
                .collect();

            if values.is_empty() {
                return Err(PipelineError::DataValidation(format!(
                    "numeric feature '{name}' has no observed training values"
                )));
            }

            numeric.push(fit_numeric_column(&values));
        }

        let mut categorical = Vec::with_capacity(CATEGORICAL_FEATURES.len());
        for (i, name) in CATEGORICAL_FEATURES.iter().enumerate() {
            let values: Vec<String> = records
                .iter()
                .filter_map(|r| features::categorical_values(r)[i].clone())
                .collect();

            if values.is_empty() {
                return Err(PipelineError::DataValidation(format!(
                    "categorical feature '{name}' has no observed training values"
                )));
            }

            categorical.push(fit_categorical_column(&values));
        }

        let n_output_features = NUMERIC_FEATURES.len()
            + categorical.iter().map(|c| c.categories.len()).sum::<usize>();

        Ok(FittedPreprocessor {
            numeric,
            categorical,
            n_output_features,
        })
    }
}

fn fit_numeric_column(values: &[f64]) -> NumericColumnStats {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let n = sorted.len();
    let median = if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    };

    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    let std_dev = variance.sqrt();

    NumericColumnStats {
        median,
        mean,
        // Constant columns standardize to zero instead of dividing by zero
        scale: if std_dev > 0.0 { std_dev } else { 1.0 },
    }
}

fn fit_categorical_column(values: &[String]) -> CategoricalColumnVocab {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value.as_str()).or_insert(0) += 1;
    }

    let most_frequent = counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(value, _)| value.to_string())
        .unwrap_or_default();

    let mut categories: Vec<String> = counts.keys().map(|v| v.to_string()).collect();
    categories.sort();

    CategoricalColumnVocab {
        most_frequent,
        categories,
    }
}

impl FittedPreprocessor {
    /// Width of the transformed feature matrix.
    pub fn n_output_features(&self) -> usize {
        self.n_output_features
    }

    /// Frozen statistics for a numeric column, by contract index.
    pub fn numeric_stats(&self, index: usize) -> &NumericColumnStats {
        &self.numeric[index]
    }

    /// Apply the frozen transform to a batch of records.
    ///
    /// Pure function of the fitted state and the input; rows come back in
    /// input order.
    pub fn transform(&self, records: &[CustomerRecord]) -> Vec<Vec<f64>> {
        records.iter().map(|r| self.transform_row(r)).collect()
    }

    fn transform_row(&self, record: &CustomerRecord) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.n_output_features);

        for (value, stats) in features::numeric_values(record).iter().zip(&self.numeric) {
            let imputed = value.unwrap_or(stats.median);
            row.push((imputed - stats.mean) / stats.scale);
        }

        for (value, vocab) in features::categorical_values(record).iter().zip(&self.categorical) {
            let category = value.as_deref().unwrap_or(&vocab.most_frequent);
            let hit = vocab.categories.binary_search_by(|c| c.as_str().cmp(category));
            for (i, _) in vocab.categories.iter().enumerate() {
                row.push(if hit == Ok(i) { 1.0 } else { 0.0 });
            }
        }

        row
    }
}
