//! Phishing detection API
//!
//! Axum service exposing ML classifier predictions (url/text/hybrid), an
//! LLM-assisted analysis path with a deterministic heuristic fallback, and
//! analytics recomputed from the append-only prediction log.

pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod handlers;
pub mod llm;
pub mod ml;
pub mod models;

use axum::routing::{get, post};
use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::{AppError, AppResult};

use llm::LlmAnalyzer;
use ml::Predictor;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub predictor: Arc<Predictor>,
    pub llm: Arc<LlmAnalyzer>,
}

/// Build the application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::index))
        .route("/health", get(handlers::health::check))
        .route("/predict/url", post(handlers::predict::url))
        .route("/predict/text", post(handlers::predict::text))
        .route("/predict/hybrid", post(handlers::predict::hybrid))
        .route("/llm-predict/url", post(handlers::llm_predict::url))
        .route("/llm-predict/text", post(handlers::llm_predict::text))
        .route("/llm-predict/hybrid", post(handlers::llm_predict::hybrid))
        .route("/llm-predict/explain", post(handlers::llm_predict::explain))
        .route("/llm-predict/status", get(handlers::llm_predict::status))
        .route("/analytics/summary", get(handlers::analytics::summary))
        .route("/analytics/history", get(handlers::analytics::history))
        .route(
            "/analytics/daily-stats",
            get(handlers::analytics::daily_stats),
        )
        .route(
            "/analytics/model-performance",
            get(handlers::analytics::model_performance),
        )
        .route(
            "/analytics/top-phishing-urls",
            get(handlers::analytics::top_phishing_urls),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
