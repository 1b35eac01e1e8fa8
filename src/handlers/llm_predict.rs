//! LLM prediction handlers
//!
//! Each endpoint runs the LLM bridge and, when the matching classifier is
//! loaded, blends both verdicts per the documented policy. The bridge never
//! errors for an unreachable endpoint - the heuristic fallback answers and
//! `llm_model` carries the sentinel. Only the explain endpoint surfaces
//! endpoint failure directly (503).

use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::llm::analyzer::combine;
use crate::llm::{LlmAnalysis, LlmStatus};
use crate::ml::{Label, ModelKind, PredictError, Prediction};
use crate::models::{NewLogEntry, PredictionLog};
use crate::{AppError, AppResult, AppState};

use super::{client_meta, require_non_blank};

#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

/// The LLM hybrid path needs both signals; unlike `/predict/hybrid`, text
/// is not optional here.
#[derive(Debug, Deserialize)]
pub struct HybridRequest {
    pub url: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ExplainRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub prediction: String,
}

#[derive(Debug, Serialize)]
pub struct LlmPredictionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub prediction: Label,
    pub confidence: f64,
    pub explanation: String,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub model_type: ModelKind,
    pub timestamp: DateTime<Utc>,
    pub llm_model: String,
}

#[derive(Debug, Serialize)]
pub struct ExplainResponse {
    pub explanation: String,
    pub original_prediction: String,
    pub timestamp: DateTime<Utc>,
}

/// Check LLM service status and available models. Never errors: an
/// unreachable endpoint reports `available: false`.
pub async fn status(State(state): State<AppState>) -> Json<LlmStatus> {
    Json(state.llm.status().await)
}

/// Analyze a URL with the LLM, blended with the URL classifier when loaded.
pub async fn url(
    State(state): State<AppState>,
    addr: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(req): Json<UrlRequest>,
) -> AppResult<Json<LlmPredictionResponse>> {
    require_non_blank("url", &req.url)?;
    tracing::info!("LLM URL prediction requested: url={}", req.url);

    let ml = classifier_opinion(state.predictor.predict_url(&req.url))?;
    let mut analysis = state.llm.analyze_url(&req.url).await;
    combine(ml.as_ref(), &mut analysis);

    log_llm_prediction(
        &state,
        Some(req.url.clone()),
        None,
        &analysis,
        ModelKind::Url,
        addr.as_ref(),
        &headers,
    )
    .await;

    tracing::info!(
        "LLM URL prediction result: url={} prediction={} confidence={:.4}",
        req.url,
        analysis.label,
        analysis.confidence
    );

    Ok(Json(response(
        Some(req.url),
        None,
        analysis,
        ModelKind::Url,
    )))
}

/// Analyze text content with the LLM, blended with the text classifier.
pub async fn text(
    State(state): State<AppState>,
    addr: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(req): Json<TextRequest>,
) -> AppResult<Json<LlmPredictionResponse>> {
    require_non_blank("text", &req.text)?;
    tracing::info!("LLM text prediction requested: text_length={}", req.text.len());

    let ml = classifier_opinion(state.predictor.predict_text(&req.text))?;
    let mut analysis = state.llm.analyze_text(&req.text).await;
    combine(ml.as_ref(), &mut analysis);

    log_llm_prediction(
        &state,
        None,
        Some(req.text.clone()),
        &analysis,
        ModelKind::Text,
        addr.as_ref(),
        &headers,
    )
    .await;

    tracing::info!(
        "LLM text prediction result: prediction={} confidence={:.4}",
        analysis.label,
        analysis.confidence
    );

    Ok(Json(response(
        None,
        Some(req.text),
        analysis,
        ModelKind::Text,
    )))
}

/// Analyze URL and text together, blended with the hybrid classifier.
pub async fn hybrid(
    State(state): State<AppState>,
    addr: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(req): Json<HybridRequest>,
) -> AppResult<Json<LlmPredictionResponse>> {
    require_non_blank("url", &req.url)?;
    require_non_blank("text", &req.text)?;
    tracing::info!("LLM hybrid prediction requested: url={}", req.url);

    let ml = classifier_opinion(
        state
            .predictor
            .predict_hybrid(&req.url, Some(&req.text))
            .await,
    )?;
    let mut analysis = state.llm.analyze_hybrid(&req.url, &req.text).await;
    combine(ml.as_ref(), &mut analysis);

    log_llm_prediction(
        &state,
        Some(req.url.clone()),
        Some(req.text.clone()),
        &analysis,
        ModelKind::Hybrid,
        addr.as_ref(),
        &headers,
    )
    .await;

    tracing::info!(
        "LLM hybrid prediction result: prediction={} confidence={:.4}",
        analysis.label,
        analysis.confidence
    );

    Ok(Json(response(
        Some(req.url),
        Some(req.text),
        analysis,
        ModelKind::Hybrid,
    )))
}

/// Detailed explanation for an earlier prediction. The one LLM path that
/// surfaces endpoint failure instead of falling back.
pub async fn explain(
    State(state): State<AppState>,
    Json(req): Json<ExplainRequest>,
) -> AppResult<Json<ExplainResponse>> {
    if req.url.trim().is_empty() && req.text.trim().is_empty() {
        return Err(AppError::Validation(
            "url or text must be provided".to_string(),
        ));
    }

    let explanation = state
        .llm
        .explain(&req.url, &req.text, &req.prediction)
        .await
        .map_err(|e| AppError::LlmUnavailable(e.to_string()))?;

    Ok(Json(ExplainResponse {
        explanation,
        original_prediction: req.prediction,
        timestamp: Utc::now(),
    }))
}

/// An unloaded model leaves the LLM verdict standing alone; a feature
/// mismatch is a real bug and propagates.
fn classifier_opinion(
    result: Result<Prediction, PredictError>,
) -> AppResult<Option<Prediction>> {
    match result {
        Ok(prediction) => Ok(Some(prediction)),
        Err(PredictError::ModelUnavailable(kind)) => {
            tracing::debug!("{} model unavailable, LLM verdict stands alone", kind);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn response(
    url: Option<String>,
    text: Option<String>,
    analysis: LlmAnalysis,
    model_kind: ModelKind,
) -> LlmPredictionResponse {
    LlmPredictionResponse {
        url,
        text,
        prediction: analysis.label,
        confidence: analysis.confidence,
        explanation: analysis.explanation,
        risk_factors: analysis.risk_factors,
        recommendations: analysis.recommendations,
        model_type: model_kind,
        timestamp: Utc::now(),
        llm_model: analysis.llm_model,
    }
}

async fn log_llm_prediction(
    state: &AppState,
    url: Option<String>,
    text: Option<String>,
    analysis: &LlmAnalysis,
    model_kind: ModelKind,
    addr: Option<&ConnectInfo<SocketAddr>>,
    headers: &HeaderMap,
) {
    let (ip_address, user_agent) = client_meta(addr, headers);
    PredictionLog::record(
        &state.pool,
        NewLogEntry {
            url,
            text,
            prediction: analysis.label.as_str().to_string(),
            confidence: analysis.confidence,
            model_type: format!("llm_{}", model_kind),
            ip_address,
            user_agent,
        },
    )
    .await;
}
