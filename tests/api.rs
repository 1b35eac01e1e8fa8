//! End-to-end router tests over an in-memory database and stub artifacts.
//!
//! The LLM endpoint points at an unserved local port, so every LLM path
//! exercises the heuristic fallback / classifier-only behavior.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use phishguard_api::config::Config;
use phishguard_api::db::create_test_pool;
use phishguard_api::llm::{LlmAnalyzer, OllamaClient};
use phishguard_api::ml::{ModelArtifact, ModelRegistry, Predictor, ScalerParams};
use phishguard_api::{create_router, AppState};

/// Text model scoring only the suspicious-keyword count.
fn text_artifact() -> ModelArtifact {
    ModelArtifact {
        feature_names: vec![
            "text_length".to_string(),
            "word_count".to_string(),
            "avg_word_length".to_string(),
            "stop_word_ratio".to_string(),
            "special_char_ratio".to_string(),
            "suspicious_keywords".to_string(),
        ],
        coefficients: vec![0.0, 0.0, 0.0, 0.0, 0.0, 2.0],
        intercept: -1.0,
        scaler: ScalerParams {
            mean: vec![0.0; 6],
            scale: vec![1.0; 6],
        },
        vectorizer: None,
    }
}

/// URL model scoring only the IP-literal and shortener flags.
fn url_artifact() -> ModelArtifact {
    ModelArtifact {
        feature_names: vec!["has_ip".to_string(), "is_shortened".to_string()],
        coefficients: vec![3.0, 3.0],
        intercept: -1.0,
        scaler: ScalerParams {
            mean: vec![0.0; 2],
            scale: vec![1.0; 2],
        },
        vectorizer: None,
    }
}

fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        port: 0,
        models_dir: "models".to_string(),
        ollama_base_url: "http://127.0.0.1:9".to_string(),
        ollama_model: "llama2".to_string(),
        llm_timeout_secs: 1,
        whois_enabled: false,
        whois_server: "whois.iana.org".to_string(),
        whois_timeout_secs: 1,
        environment: "test".to_string(),
    }
}

async fn app_with(registry: ModelRegistry) -> Router {
    let config = test_config();
    let pool = create_test_pool().await;
    let predictor = Arc::new(Predictor::new(Arc::new(registry), config.whois()));
    let client = OllamaClient::new(
        &config.ollama_base_url,
        &config.ollama_model,
        Duration::from_millis(300),
    );
    let llm = Arc::new(LlmAnalyzer::new(client));

    create_router(AppState {
        pool,
        config,
        predictor,
        llm,
    })
}

async fn app() -> Router {
    app_with(ModelRegistry::from_artifacts(
        Some(url_artifact()),
        Some(text_artifact()),
        None,
    ))
    .await
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    read_json(response).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read_json(response).await
}

async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn root_lists_endpoints() {
    let app = app().await;
    let (status, body) = get(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["endpoints"]["predict_url"].is_string());
}

#[tokio::test]
async fn health_reports_degraded_when_a_model_is_missing() {
    let app = app().await; // hybrid artifact absent
    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["models"]["url"], true);
    assert_eq!(body["models"]["hybrid"], false);
}

#[tokio::test]
async fn health_reports_healthy_with_all_models() {
    let app = app_with(ModelRegistry::from_artifacts(
        Some(url_artifact()),
        Some(text_artifact()),
        Some(url_artifact()),
    ))
    .await;
    let (_, body) = get(&app, "/health").await;

    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn keyword_heavy_text_is_flagged_phishing() {
    let app = app().await;
    let (status, body) = post_json(
        &app,
        "/predict/text",
        json!({"text": "URGENT: verify your account now or it will be suspended"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], "Phishing");
    assert!(body["confidence"].as_f64().unwrap() > 0.5);
    assert_eq!(body["model_type"], "text");
}

#[tokio::test]
async fn benign_text_is_legitimate() {
    let app = app().await;
    let (status, body) = post_json(
        &app,
        "/predict/text",
        json!({"text": "Thanks for dinner last night, see you soon"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], "Legitimate");
}

#[tokio::test]
async fn shortened_url_is_phishing() {
    let app = app().await;
    let (status, body) = post_json(
        &app,
        "/predict/url",
        json!({"url": "http://bit.ly/abcdef"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], "Phishing");
}

#[tokio::test]
async fn blank_input_is_rejected() {
    let app = app().await;

    let (status, body) = post_json(&app, "/predict/url", json!({"url": "   "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);

    let (status, _) = post_json(&app, "/predict/text", json!({"text": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_model_returns_service_unavailable() {
    let app = app().await; // no hybrid artifact
    let (status, body) = post_json(
        &app,
        "/predict/hybrid",
        json!({"url": "https://example.com"}),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], 503);
}

#[tokio::test]
async fn summary_counts_every_prediction() {
    let app = app().await;

    for _ in 0..3 {
        let (status, _) = post_json(
            &app,
            "/predict/text",
            json!({"text": "verify your account login now"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = get(&app, "/analytics/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_predictions"], 3);
    assert_eq!(body["model_usage"]["text"], 3);
}

#[tokio::test]
async fn history_returns_logged_predictions_newest_first() {
    let app = app().await;

    post_json(&app, "/predict/text", json!({"text": "hello there friend"})).await;
    post_json(
        &app,
        "/predict/url",
        json!({"url": "http://bit.ly/abcdef"}),
    )
    .await;

    let (status, body) = get(&app, "/analytics/history?limit=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["predictions"][0]["model_type"], "url");

    let (status, body) = get(&app, "/analytics/history?model_type=text").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn daily_stats_rejects_out_of_range_window() {
    let app = app().await;

    let (status, body) = get(&app, "/analytics/daily-stats?days=40").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);

    let (status, body) = get(&app, "/analytics/daily-stats?days=7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn model_performance_covers_every_kind() {
    let app = app().await;
    post_json(
        &app,
        "/predict/text",
        json!({"text": "verify your account login now"}),
    )
    .await;

    let (status, body) = get(&app, "/analytics/model-performance").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"]["total_predictions"], 1);
    assert_eq!(body["url"]["total_predictions"], 0);
    assert!(body["hybrid"].is_object());
}

#[tokio::test]
async fn top_phishing_urls_groups_flagged_urls() {
    let app = app().await;
    for _ in 0..2 {
        post_json(
            &app,
            "/predict/url",
            json!({"url": "http://bit.ly/abcdef"}),
        )
        .await;
    }

    let (status, body) = get(&app, "/analytics/top-phishing-urls").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["urls"][0]["url"], "http://bit.ly/abcdef");
    assert_eq!(body["urls"][0]["count"], 2);
}

#[tokio::test]
async fn llm_predict_with_classifier_reports_ml_only_when_llm_is_down() {
    let app = app().await;
    let (status, body) = post_json(
        &app,
        "/llm-predict/text",
        json!({"text": "URGENT: verify your account now or it will be suspended"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], "Phishing");
    assert_eq!(body["llm_model"], "ml-only");
    assert!(!body["explanation"].as_str().unwrap().is_empty());
    assert!(body["recommendations"].as_array().unwrap().len() > 0);
    assert_eq!(body["model_type"], "text");
}

#[tokio::test]
async fn llm_predict_without_classifier_falls_back_to_heuristics() {
    let app = app_with(ModelRegistry::from_artifacts(None, None, None)).await;
    let (status, body) = post_json(
        &app,
        "/llm-predict/url",
        json!({"url": "http://bit.ly/verify@account.tk"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["llm_model"], "fallback");
    assert_eq!(body["prediction"], "Phishing");
    assert!(!body["explanation"].as_str().unwrap().is_empty());
    assert!(body["risk_factors"].as_array().unwrap().len() > 0);
}

#[tokio::test]
async fn llm_hybrid_requires_text() {
    let app = app().await;

    let (status, body) = post_json(
        &app,
        "/llm-predict/hybrid",
        json!({"url": "https://example.com"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);

    let (status, _) = post_json(
        &app,
        "/llm-predict/hybrid",
        json!({"url": "https://example.com", "text": "   "}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn llm_status_reports_unavailable_endpoint() {
    let app = app().await;
    let (status, body) = get(&app, "/llm-predict/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
    assert_eq!(body["current_model"], "llama2");
    assert_eq!(body["available_models"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn explain_surfaces_llm_failure() {
    let app = app().await;
    let (status, body) = post_json(
        &app,
        "/llm-predict/explain",
        json!({"url": "http://example.com", "prediction": "Phishing"}),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], 503);
}

#[tokio::test]
async fn explain_requires_some_input() {
    let app = app().await;
    let (status, _) = post_json(&app, "/llm-predict/explain", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn llm_predictions_are_logged_with_llm_model_type() {
    let app = app().await;
    post_json(
        &app,
        "/llm-predict/text",
        json!({"text": "verify your account login now"}),
    )
    .await;

    let (status, body) = get(&app, "/analytics/history?model_type=llm_text").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["predictions"][0]["prediction"], "Phishing");
}
