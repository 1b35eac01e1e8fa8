//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::json;

use crate::ml::registry::ModelAvailability;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    models: ModelAvailability,
    timestamp: i64,
}

/// Liveness plus per-model availability. A missing artifact degrades the
/// status without failing the probe; the remaining models keep serving.
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let models = state.predictor.registry().availability();

    Json(HealthResponse {
        status: if models.all_loaded() {
            "healthy"
        } else {
            "degraded"
        },
        version: env!("CARGO_PKG_VERSION"),
        models,
        timestamp: chrono::Utc::now().timestamp(),
    })
}

/// Root endpoint with API information
pub async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Phishing Detection API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "predict_url": "/predict/url",
            "predict_text": "/predict/text",
            "predict_hybrid": "/predict/hybrid",
            "llm_predict_url": "/llm-predict/url",
            "llm_predict_text": "/llm-predict/text",
            "llm_predict_hybrid": "/llm-predict/hybrid",
            "llm_status": "/llm-predict/status",
            "analytics": "/analytics/summary",
            "history": "/analytics/history"
        }
    }))
}
