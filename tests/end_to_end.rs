//! End-to-end pipeline scenario: train on synthetic data, persist, reload,
//! and score the dashboard sample rows through the inference engine.

use churn_prediction_pipeline::config::TrainingConfig;
use churn_prediction_pipeline::models::{training, ChurnModel, InferenceEngine};
use churn_prediction_pipeline::synthetic::{dashboard_sample_rows, SyntheticDataGenerator};
use churn_prediction_pipeline::types::CustomerRecord;
use churn_prediction_pipeline::PipelineError;

#[test]
fn train_persist_reload_and_score_dashboard_rows() {
    let data = SyntheticDataGenerator::new(42).generate(1000);
    let churned = data.iter().filter(|r| r.churned == 1).count();
    assert!((200..400).contains(&churned), "expected ~30% churn rate");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("churn_model.bin");

    let config = TrainingConfig::default();
    let output = training::train(&data, &config, &path).unwrap();
    assert_eq!(output.train_rows + output.holdout_rows, 1000);
    assert_eq!(output.holdout_rows, 200);

    let engine = InferenceEngine::from_artifact(&path, 0.5).unwrap();
    let results = engine.predict(&dashboard_sample_rows(), Some(0.5)).unwrap();

    assert_eq!(results.len(), 5);
    for result in &results {
        assert!((0.0..=1.0).contains(&result.churn_probability));
        assert_eq!(result.is_high_risk, result.churn_probability >= 0.5);
    }

    // Results come back in request order
    let ids: Vec<&str> = results.iter().map(|r| r.customer_id.as_str()).collect();
    assert_eq!(
        ids,
        ["CUST-00001", "CUST-00002", "CUST-00003", "CUST-00004", "CUST-00005"]
    );
}

#[test]
fn persistence_round_trip_preserves_predictions_exactly() {
    let data = SyntheticDataGenerator::new(7).generate(300);
    let dir = tempfile::tempdir().unwrap();
    let first_path = dir.path().join("first.bin");

    let config = TrainingConfig {
        n_trees: 40,
        ..TrainingConfig::default()
    };
    training::train(&data, &config, &first_path).unwrap();

    let model = ChurnModel::load(&first_path).unwrap();
    let second_path = dir.path().join("second.bin");
    model.save(&second_path).unwrap();
    let reloaded = ChurnModel::load(&second_path).unwrap();

    let batch: Vec<CustomerRecord> = data.into_iter().take(50).map(|l| l.record).collect();
    assert_eq!(
        model.predict_probability(&batch).unwrap(),
        reloaded.predict_probability(&batch).unwrap()
    );
}

#[test]
fn retraining_with_same_seed_reproduces_predictions() {
    let data = SyntheticDataGenerator::new(42).generate(300);
    let dir = tempfile::tempdir().unwrap();
    let config = TrainingConfig {
        n_trees: 30,
        subsample: 0.8,
        ..TrainingConfig::default()
    };

    let path_a = dir.path().join("a.bin");
    let path_b = dir.path().join("b.bin");
    training::train(&data, &config, &path_a).unwrap();
    training::train(&data, &config, &path_b).unwrap();

    let batch: Vec<CustomerRecord> = data.into_iter().take(25).map(|l| l.record).collect();
    let a = ChurnModel::load(&path_a).unwrap();
    let b = ChurnModel::load(&path_b).unwrap();
    assert_eq!(
        a.predict_probability(&batch).unwrap(),
        b.predict_probability(&batch).unwrap()
    );
}

#[test]
fn degraded_inputs_still_score() {
    let data = SyntheticDataGenerator::new(42).generate(200);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    let config = TrainingConfig {
        n_trees: 20,
        ..TrainingConfig::default()
    };
    training::train(&data, &config, &path).unwrap();
    let engine = InferenceEngine::from_artifact(&path, 0.5).unwrap();

    let mut rows = dashboard_sample_rows();
    rows[0].tenure = None; // imputed from the training median
    rows[1].payment_method = Some("Cryptocurrency".to_string()); // unseen category
    rows[2].has_premium_support = None; // imputed from the training mode

    let results = engine.predict(&rows, None).unwrap();
    assert_eq!(results.len(), 5);
    assert!(results
        .iter()
        .all(|r| (0.0..=1.0).contains(&r.churn_probability)));
}

#[test]
fn single_class_training_set_is_rejected() {
    let mut data = SyntheticDataGenerator::new(42).generate(100);
    for row in &mut data {
        row.churned = 1;
    }

    let dir = tempfile::tempdir().unwrap();
    let err = training::train(
        &data,
        &TrainingConfig::default(),
        dir.path().join("model.bin"),
    )
    .unwrap_err();

    assert!(matches!(err, PipelineError::DataValidation(_)));
    assert!(!dir.path().join("model.bin").exists());
}
