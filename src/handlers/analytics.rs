//! Analytics handlers
//!
//! Everything here recomputes from the prediction log on each call.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use crate::models::{
    AnalyticsSummary, DailyStats, HistoryFilter, ModelPerformance, PredictionLog, TopPhishingUrl,
};
use crate::{AppResult, AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct HistoryQuery {
    pub model_type: Option<String>,
    pub prediction: Option<String>,
    #[serde(default = "default_history_limit")]
    #[validate(range(min = 1, max = 1000))]
    pub limit: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub offset: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DailyStatsQuery {
    #[serde(default = "default_days")]
    #[validate(range(min = 1, max = 30))]
    pub days: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TopUrlsQuery {
    #[serde(default = "default_top_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: i64,
}

fn default_history_limit() -> i64 {
    100
}

fn default_days() -> i64 {
    7
}

fn default_top_limit() -> i64 {
    10
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub count: usize,
    pub predictions: Vec<PredictionLog>,
}

#[derive(Debug, Serialize)]
pub struct DailyStatsResponse {
    pub days: i64,
    pub stats: Vec<DailyStats>,
}

#[derive(Debug, Serialize)]
pub struct TopPhishingUrlsResponse {
    pub count: usize,
    pub urls: Vec<TopPhishingUrl>,
}

/// Aggregate counts and per-model usage over the whole log.
pub async fn summary(State(state): State<AppState>) -> AppResult<Json<AnalyticsSummary>> {
    let summary = PredictionLog::summary(&state.pool).await?;
    Ok(Json(summary))
}

/// Paginated prediction history, newest first, optionally filtered.
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<HistoryResponse>> {
    query.validate()?;

    let filter = HistoryFilter {
        model_type: query.model_type,
        prediction: query.prediction,
        limit: query.limit,
        offset: query.offset,
    };
    let predictions = PredictionLog::history(&state.pool, &filter).await?;

    Ok(Json(HistoryResponse {
        count: predictions.len(),
        predictions,
    }))
}

/// Per-day buckets over the trailing window. Days outside 1..=30 are a 400.
pub async fn daily_stats(
    State(state): State<AppState>,
    Query(query): Query<DailyStatsQuery>,
) -> AppResult<Json<DailyStatsResponse>> {
    query.validate()?;

    let stats = PredictionLog::daily_stats(&state.pool, query.days).await?;
    Ok(Json(DailyStatsResponse {
        days: query.days,
        stats,
    }))
}

/// Per-model breakdown; every model kind appears even with zero rows.
pub async fn model_performance(
    State(state): State<AppState>,
) -> AppResult<Json<BTreeMap<String, ModelPerformance>>> {
    let performance = PredictionLog::model_performance(&state.pool).await?;
    Ok(Json(performance))
}

/// Most frequently flagged URLs, grouped and ordered by hit count.
pub async fn top_phishing_urls(
    State(state): State<AppState>,
    Query(query): Query<TopUrlsQuery>,
) -> AppResult<Json<TopPhishingUrlsResponse>> {
    query.validate()?;

    let urls = PredictionLog::top_phishing_urls(&state.pool, query.limit).await?;
    Ok(Json(TopPhishingUrlsResponse {
        count: urls.len(),
        urls,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_stats_query_bounds() {
        let ok = DailyStatsQuery { days: 7 };
        assert!(ok.validate().is_ok());

        let too_many = DailyStatsQuery { days: 40 };
        assert!(too_many.validate().is_err());

        let zero = DailyStatsQuery { days: 0 };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn history_query_bounds() {
        let ok = HistoryQuery {
            model_type: None,
            prediction: None,
            limit: 100,
            offset: 0,
        };
        assert!(ok.validate().is_ok());

        let oversized = HistoryQuery {
            model_type: None,
            prediction: None,
            limit: 5000,
            offset: 0,
        };
        assert!(oversized.validate().is_err());
    }
}
