//! Error handling
//!
//! Request-level error taxonomy. Validation problems are the caller's to fix
//! (400); a missing model artifact is an operator problem (503, the other
//! model kinds keep serving); a feature/model width mismatch is an internal
//! bug and is logged loudly rather than masked. LLM failures never appear
//! here on analysis paths - they resolve through the heuristic fallback.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::ml::PredictError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// Bad or empty input (4xx, user-correctable)
    Validation(String),

    /// Requested model artifact was not loaded (operator-fixable)
    ModelUnavailable(String),

    /// Extractor and model disagree on vector width - internal invariant bug
    FeatureMismatch(String),

    /// Completion endpoint failure surfaced directly (explain endpoint only)
    LlmUnavailable(String),

    // Database errors
    Database(String),

    // Generic errors
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::ModelUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.as_str()),
            AppError::FeatureMismatch(msg) => {
                tracing::error!("Feature/model mismatch: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal model error")
            }
            AppError::LlmUnavailable(msg) => {
                tracing::warn!("LLM unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "LLM service unavailable")
            }
            AppError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error occurred")
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::ModelUnavailable(kind) => {
                AppError::ModelUnavailable(format!("{} model is not available", kind))
            }
            PredictError::FeatureMismatch { .. } => AppError::FeatureMismatch(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::ModelKind;

    #[test]
    fn status_codes_match_taxonomy() {
        let cases = [
            (AppError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (
                AppError::ModelUnavailable("url".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::FeatureMismatch("width".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::Database("down".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn predict_errors_map_to_app_errors() {
        let err: AppError = PredictError::ModelUnavailable(ModelKind::Text).into();
        assert!(matches!(err, AppError::ModelUnavailable(_)));

        let err: AppError = PredictError::FeatureMismatch {
            expected: 24,
            actual: 20,
        }
        .into();
        assert!(matches!(err, AppError::FeatureMismatch(_)));
    }
}
