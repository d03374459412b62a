//! Churn Prediction Service - Main Entry Point
//!
//! Loads the model artifact, builds the inference context, and serves batch
//! predictions over HTTP.

use anyhow::Result;
use churn_prediction_pipeline::{
    config::AppConfig,
    metrics::{MetricsReporter, ServiceMetrics},
    models::InferenceEngine,
    service::{create_router, AppState},
};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let loaded_config = AppConfig::load();

    // Initialize logging; RUST_LOG wins over the configured level
    let fallback_level = loaded_config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "churn_prediction_pipeline={fallback_level},tower_http=info"
                ))
            }),
        )
        .init();

    info!("Starting Churn Prediction Service");

    let config = match loaded_config {
        Ok(config) => {
            info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            warn!(error = %e, "Failed to load configuration, using defaults");
            AppConfig::default()
        }
    };

    // Initialize metrics
    let metrics = Arc::new(ServiceMetrics::new());

    // Build the inference context once; a load failure leaves the service
    // running but degraded, and /health reports it
    let engine = match InferenceEngine::from_artifact(
        &config.model.artifact_path,
        config.detection.default_risk_threshold,
    ) {
        Ok(engine) => {
            info!(
                artifact = %config.model.artifact_path,
                default_threshold = engine.default_threshold(),
                trained_at = %engine.model().trained_at(),
                "Inference engine initialized"
            );
            Some(Arc::new(engine))
        }
        Err(e) => {
            error!(
                artifact = %config.model.artifact_path,
                error = %e,
                "Failed to load model; serving in degraded mode until restart"
            );
            None
        }
    };

    let state = AppState {
        engine,
        metrics: metrics.clone(),
    };

    // Start metrics reporter (prints summary every 60 seconds)
    let reporter_metrics = metrics.clone();
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(reporter_metrics, 60);
        reporter.start().await;
    });

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(addr = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    info!("Service shutting down");
    metrics.print_summary();

    Ok(())
}
