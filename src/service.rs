//! HTTP prediction service.
//!
//! Exposes the inference procedure over two routes: `POST /predict` for
//! batch scoring and `GET /health` for liveness plus model state. The
//! inference context is built once at startup and injected into handlers
//! through [`AppState`]; a failed model load leaves the service up but
//! degraded, and prediction requests are refused until an artifact is
//! available at restart.

use crate::error::PipelineError;
use crate::metrics::ServiceMetrics;
use crate::models::InferenceEngine;
use crate::types::{CustomerRecord, PredictionResult};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Shared application state, constructed once by the startup routine.
#[derive(Clone)]
pub struct AppState {
    /// Loaded inference engine; `None` when the startup load failed
    pub engine: Option<Arc<InferenceEngine>>,
    pub metrics: Arc<ServiceMetrics>,
}

/// Batch prediction request body
#[derive(Debug, Deserialize)]
pub struct BatchPredictionRequest {
    pub customers: Vec<CustomerRecord>,
    /// Optional per-request high-risk threshold; the configured default
    /// applies when omitted
    #[serde(default)]
    pub risk_threshold: Option<f64>,
}

/// Health check response body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub version: &'static str,
    pub timestamp: i64,
}

/// Pipeline error surfaced over HTTP
#[derive(Debug)]
pub struct ApiError(pub PipelineError);

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            err @ PipelineError::DataValidation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
            err @ (PipelineError::Configuration(_) | PipelineError::Artifact(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
            }
            err @ PipelineError::Io(_) => {
                tracing::error!(error = %err, "I/O failure while serving request");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

/// Create the service router with all routes and layers
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Batch churn scoring endpoint
pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<BatchPredictionRequest>,
) -> Result<Json<Vec<PredictionResult>>, ApiError> {
    let engine = state.engine.as_ref().ok_or_else(|| {
        ApiError(PipelineError::Configuration(
            "no model artifact is loaded".to_string(),
        ))
    })?;

    let request_id = uuid::Uuid::new_v4();
    let start = Instant::now();

    let results = engine
        .predict(&request.customers, request.risk_threshold)
        .map_err(|err| {
            if matches!(err, PipelineError::DataValidation(_)) {
                state.metrics.record_rejected();
                warn!(request_id = %request_id, error = %err, "Prediction request rejected");
            }
            ApiError::from(err)
        })?;

    let elapsed = start.elapsed();
    let probabilities: Vec<f64> = results.iter().map(|r| r.churn_probability).collect();
    let high_risk = results.iter().filter(|r| r.is_high_risk).count() as u64;
    state
        .metrics
        .record_request(elapsed, &probabilities, high_risk);

    info!(
        request_id = %request_id,
        customers = results.len(),
        high_risk,
        processing_time_us = elapsed.as_micros(),
        "Prediction request served"
    );

    Ok(Json(results))
}

/// Liveness and readiness check
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_loaded = state.engine.is_some();
    Json(HealthResponse {
        status: if model_loaded { "healthy" } else { "degraded" },
        model_loaded,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
