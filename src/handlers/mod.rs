//! Request handlers

pub mod analytics;
pub mod health;
pub mod llm_predict;
pub mod predict;

use axum::extract::ConnectInfo;
use axum::http::HeaderMap;
use std::net::SocketAddr;

use crate::error::{AppError, AppResult};

/// Reject empty or whitespace-only input before feature extraction.
pub(crate) fn require_non_blank(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Client metadata recorded alongside each prediction.
pub(crate) fn client_meta(
    addr: Option<&ConnectInfo<SocketAddr>>,
    headers: &HeaderMap,
) -> (Option<String>, Option<String>) {
    let ip_address = addr.map(|ConnectInfo(a)| a.ip().to_string());
    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    (ip_address, user_agent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_rejected() {
        assert!(require_non_blank("url", "").is_err());
        assert!(require_non_blank("url", "   \t").is_err());
        assert!(require_non_blank("url", "https://example.com").is_ok());
    }
}
