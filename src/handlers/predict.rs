//! Prediction handlers
//!
//! Validate, classify, log, respond. The log append is best-effort: a
//! storage failure is recorded operationally and never fails the request.

use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::ml::{Label, ModelKind, Prediction};
use crate::models::{NewLogEntry, PredictionLog};
use crate::{AppResult, AppState};

use super::{client_meta, require_non_blank};

#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct HybridRequest {
    pub url: String,
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub prediction: Label,
    pub confidence: f64,
    pub model_type: ModelKind,
    pub timestamp: DateTime<Utc>,
}

impl PredictionResponse {
    fn new(url: Option<String>, text: Option<String>, prediction: &Prediction) -> Self {
        Self {
            url,
            text,
            prediction: prediction.label,
            confidence: prediction.confidence,
            model_type: prediction.model_kind,
            timestamp: prediction.timestamp,
        }
    }
}

/// Predict phishing probability for a URL
pub async fn url(
    State(state): State<AppState>,
    addr: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(req): Json<UrlRequest>,
) -> AppResult<Json<PredictionResponse>> {
    require_non_blank("url", &req.url)?;

    tracing::info!("Predict URL requested: url={}", req.url);
    let prediction = state.predictor.predict_url(&req.url)?;
    tracing::info!(
        "Predict URL result: url={} result={} confidence={:.4}",
        req.url,
        prediction.label,
        prediction.confidence
    );

    log_prediction(
        &state,
        Some(req.url.clone()),
        None,
        &prediction,
        addr.as_ref(),
        &headers,
    )
    .await;

    Ok(Json(PredictionResponse::new(
        Some(req.url),
        None,
        &prediction,
    )))
}

/// Predict phishing probability for text content
pub async fn text(
    State(state): State<AppState>,
    addr: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(req): Json<TextRequest>,
) -> AppResult<Json<PredictionResponse>> {
    require_non_blank("text", &req.text)?;

    tracing::info!("Predict Text requested");
    let prediction = state.predictor.predict_text(&req.text)?;
    tracing::info!(
        "Predict Text result: result={} confidence={:.4}",
        prediction.label,
        prediction.confidence
    );

    log_prediction(
        &state,
        None,
        Some(req.text.clone()),
        &prediction,
        addr.as_ref(),
        &headers,
    )
    .await;

    Ok(Json(PredictionResponse::new(
        None,
        Some(req.text),
        &prediction,
    )))
}

/// Predict phishing probability using the hybrid model (URL + optional text)
pub async fn hybrid(
    State(state): State<AppState>,
    addr: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(req): Json<HybridRequest>,
) -> AppResult<Json<PredictionResponse>> {
    require_non_blank("url", &req.url)?;
    if let Some(text) = &req.text {
        require_non_blank("text", text)?;
    }

    tracing::info!(
        "Predict Hybrid requested: url={} text_present={}",
        req.url,
        req.text.is_some()
    );
    let prediction = state
        .predictor
        .predict_hybrid(&req.url, req.text.as_deref())
        .await?;
    tracing::info!(
        "Predict Hybrid result: url={} result={} confidence={:.4}",
        req.url,
        prediction.label,
        prediction.confidence
    );

    log_prediction(
        &state,
        Some(req.url.clone()),
        req.text.clone(),
        &prediction,
        addr.as_ref(),
        &headers,
    )
    .await;

    Ok(Json(PredictionResponse::new(
        Some(req.url),
        req.text,
        &prediction,
    )))
}

async fn log_prediction(
    state: &AppState,
    url: Option<String>,
    text: Option<String>,
    prediction: &Prediction,
    addr: Option<&ConnectInfo<SocketAddr>>,
    headers: &HeaderMap,
) {
    let (ip_address, user_agent) = client_meta(addr, headers);
    PredictionLog::record(
        &state.pool,
        NewLogEntry {
            url,
            text,
            prediction: prediction.label.as_str().to_string(),
            confidence: prediction.confidence,
            model_type: prediction.model_kind.as_str().to_string(),
            ip_address,
            user_agent,
        },
    )
    .await;
}
