//! Sample Dashboard Client
//!
//! Posts the five illustrative dashboard customers to a running prediction
//! service and prints the returned probabilities and risk flags. Stands in
//! for the dashboard's data fetch when exercising the service by hand.

use churn_prediction_pipeline::synthetic::dashboard_sample_rows;
use churn_prediction_pipeline::types::PredictionResult;
use serde_json::json;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sample_client=info".into()),
        )
        .init();

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let base_url = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("http://localhost:8000");
    let risk_threshold: f64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(0.5);

    info!(base_url = %base_url, risk_threshold, "Querying churn prediction service");

    let client = reqwest::Client::new();

    // Check service health first
    let health: serde_json::Value = client
        .get(format!("{base_url}/health"))
        .send()
        .await?
        .json()
        .await?;
    info!(health = %health, "Service health");

    if health.get("model_loaded") != Some(&json!(true)) {
        warn!("Service reports no model loaded; predictions will be refused");
    }

    let customers = dashboard_sample_rows();
    let response = client
        .post(format!("{base_url}/predict"))
        .json(&json!({
            "customers": customers,
            "risk_threshold": risk_threshold,
        }))
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("prediction request failed: {status} - {body}");
    }

    let predictions: Vec<PredictionResult> = response.json().await?;

    println!("{:<12} {:>18} {:>10}", "customer", "churn_probability", "high_risk");
    for prediction in &predictions {
        println!(
            "{:<12} {:>18.4} {:>10}",
            prediction.customer_id, prediction.churn_probability, prediction.is_high_risk
        );
    }

    let high_risk = predictions.iter().filter(|p| p.is_high_risk).count();
    info!(
        customers = predictions.len(),
        high_risk,
        "Predictions received"
    );

    Ok(())
}
