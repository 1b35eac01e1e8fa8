//! Prediction log model
//!
//! Append-only log of every prediction request, ML and LLM paths alike.
//! Inserts are best-effort on the request path: a failed write is recorded
//! to the operational log and swallowed, so a storage outage degrades
//! analytics but never detection. Analytics queries recompute from the log
//! on every call; nothing is cached.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Row, SqlitePool};
use std::collections::BTreeMap;

use crate::ml::ModelKind;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PredictionLog {
    pub id: i64,
    pub url: Option<String>,
    pub text: Option<String>,
    pub prediction: String,
    pub confidence: f64,
    pub model_type: String,
    pub timestamp: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Row to append; id and timestamp are assigned on insert.
#[derive(Debug, Clone)]
pub struct NewLogEntry {
    pub url: Option<String>,
    pub text: Option<String>,
    pub prediction: String,
    pub confidence: f64,
    pub model_type: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct HistoryFilter {
    pub model_type: Option<String>,
    pub prediction: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct ModelUsage {
    pub url: i64,
    pub text: i64,
    pub hybrid: i64,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub total_predictions: i64,
    pub phishing_count: i64,
    pub legitimate_count: i64,
    pub phishing_percentage: f64,
    pub avg_confidence: f64,
    pub model_usage: ModelUsage,
}

#[derive(Debug, Serialize)]
pub struct DailyStats {
    pub date: String,
    pub total_predictions: i64,
    pub phishing_count: i64,
    pub legitimate_count: i64,
    pub avg_confidence: f64,
}

#[derive(Debug, Serialize)]
pub struct ModelPerformance {
    pub total_predictions: i64,
    pub phishing_count: i64,
    pub legitimate_count: i64,
    pub phishing_percentage: f64,
    pub avg_confidence: f64,
}

#[derive(Debug, Serialize)]
pub struct TopPhishingUrl {
    pub url: String,
    pub count: i64,
    pub avg_confidence: f64,
}

impl PredictionLog {
    pub async fn insert(pool: &SqlitePool, entry: &NewLogEntry) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO prediction_logs (url, text, prediction, confidence, model_type, timestamp, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&entry.url)
        .bind(&entry.text)
        .bind(&entry.prediction)
        .bind(entry.confidence)
        .bind(&entry.model_type)
        .bind(Utc::now())
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Best-effort append: log-write errors must never fail the request.
    pub async fn record(pool: &SqlitePool, entry: NewLogEntry) {
        if let Err(e) = Self::insert(pool, &entry).await {
            tracing::error!("Failed to log prediction: {}", e);
        }
    }

    pub async fn history(
        pool: &SqlitePool,
        filter: &HistoryFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = QueryBuilder::new("SELECT * FROM prediction_logs WHERE 1=1");

        if let Some(model_type) = &filter.model_type {
            query.push(" AND model_type = ");
            query.push_bind(model_type);
        }
        if let Some(prediction) = &filter.prediction {
            query.push(" AND prediction = ");
            query.push_bind(prediction);
        }
        query.push(" ORDER BY timestamp DESC LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.offset);

        query.build_query_as::<Self>().fetch_all(pool).await
    }

    pub async fn summary(pool: &SqlitePool) -> Result<AnalyticsSummary, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) as total,
                COALESCE(SUM(CASE WHEN prediction = 'Phishing' THEN 1 ELSE 0 END), 0) as phishing,
                COALESCE(SUM(CASE WHEN prediction = 'Legitimate' THEN 1 ELSE 0 END), 0) as legitimate,
                COALESCE(AVG(confidence), 0.0) as avg_confidence
            FROM prediction_logs
            "#,
        )
        .fetch_one(pool)
        .await?;

        let total: i64 = row.get("total");
        let phishing: i64 = row.get("phishing");
        let legitimate: i64 = row.get("legitimate");
        let avg_confidence: f64 = row.get("avg_confidence");

        let phishing_percentage = if total > 0 {
            phishing as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        let mut usage = ModelUsage {
            url: 0,
            text: 0,
            hybrid: 0,
        };
        let usage_rows = sqlx::query(
            "SELECT model_type, COUNT(*) as count FROM prediction_logs GROUP BY model_type",
        )
        .fetch_all(pool)
        .await?;
        for row in usage_rows {
            let model_type: String = row.get("model_type");
            let count: i64 = row.get("count");
            match model_type.as_str() {
                "url" => usage.url = count,
                "text" => usage.text = count,
                "hybrid" => usage.hybrid = count,
                _ => {}
            }
        }

        Ok(AnalyticsSummary {
            total_predictions: total,
            phishing_count: phishing,
            legitimate_count: legitimate,
            phishing_percentage,
            avg_confidence,
            model_usage: usage,
        })
    }

    /// One bucket per calendar day over the trailing window, empty days included.
    pub async fn daily_stats(pool: &SqlitePool, days: i64) -> Result<Vec<DailyStats>, sqlx::Error> {
        let today = Utc::now().date_naive();
        let start = today - Duration::days(days - 1);

        let rows = sqlx::query(
            r#"
            SELECT
                date(timestamp) as day,
                COUNT(*) as total,
                COALESCE(SUM(CASE WHEN prediction = 'Phishing' THEN 1 ELSE 0 END), 0) as phishing,
                COALESCE(SUM(CASE WHEN prediction = 'Legitimate' THEN 1 ELSE 0 END), 0) as legitimate,
                COALESCE(AVG(confidence), 0.0) as avg_confidence
            FROM prediction_logs
            WHERE date(timestamp) >= date($1)
            GROUP BY day
            "#,
        )
        .bind(start.format("%Y-%m-%d").to_string())
        .fetch_all(pool)
        .await?;

        let mut by_day: BTreeMap<String, DailyStats> = BTreeMap::new();
        for row in rows {
            let day: String = row.get("day");
            by_day.insert(
                day.clone(),
                DailyStats {
                    date: day,
                    total_predictions: row.get("total"),
                    phishing_count: row.get("phishing"),
                    legitimate_count: row.get("legitimate"),
                    avg_confidence: row.get("avg_confidence"),
                },
            );
        }

        let mut stats = Vec::with_capacity(days as usize);
        for offset in 0..days {
            let date = (start + Duration::days(offset)).format("%Y-%m-%d").to_string();
            stats.push(by_day.remove(&date).unwrap_or(DailyStats {
                date,
                total_predictions: 0,
                phishing_count: 0,
                legitimate_count: 0,
                avg_confidence: 0.0,
            }));
        }

        Ok(stats)
    }

    pub async fn model_performance(
        pool: &SqlitePool,
    ) -> Result<BTreeMap<String, ModelPerformance>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT
                model_type,
                COUNT(*) as total,
                COALESCE(SUM(CASE WHEN prediction = 'Phishing' THEN 1 ELSE 0 END), 0) as phishing,
                COALESCE(AVG(confidence), 0.0) as avg_confidence
            FROM prediction_logs
            GROUP BY model_type
            "#,
        )
        .fetch_all(pool)
        .await?;

        let mut performance = BTreeMap::new();
        for kind in ModelKind::ALL {
            performance.insert(
                kind.as_str().to_string(),
                ModelPerformance {
                    total_predictions: 0,
                    phishing_count: 0,
                    legitimate_count: 0,
                    phishing_percentage: 0.0,
                    avg_confidence: 0.0,
                },
            );
        }

        for row in rows {
            let model_type: String = row.get("model_type");
            let Some(entry) = performance.get_mut(&model_type) else {
                continue; // llm_* rows are not part of the per-model breakdown
            };
            let total: i64 = row.get("total");
            let phishing: i64 = row.get("phishing");

            entry.total_predictions = total;
            entry.phishing_count = phishing;
            entry.legitimate_count = total - phishing;
            entry.phishing_percentage = if total > 0 {
                phishing as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            entry.avg_confidence = row.get("avg_confidence");
        }

        Ok(performance)
    }

    pub async fn top_phishing_urls(
        pool: &SqlitePool,
        limit: i64,
    ) -> Result<Vec<TopPhishingUrl>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT url, COUNT(*) as count, AVG(confidence) as avg_confidence
            FROM prediction_logs
            WHERE prediction = 'Phishing' AND url IS NOT NULL
            GROUP BY url
            ORDER BY count DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TopPhishingUrl {
                url: row.get("url"),
                count: row.get("count"),
                avg_confidence: row.get("avg_confidence"),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    fn entry(prediction: &str, model_type: &str, confidence: f64) -> NewLogEntry {
        NewLogEntry {
            url: Some("http://example.com".to_string()),
            text: None,
            prediction: prediction.to_string(),
            confidence,
            model_type: model_type.to_string(),
            ip_address: Some("127.0.0.1".to_string()),
            user_agent: None,
        }
    }

    #[tokio::test]
    async fn summary_counts_match_inserts() {
        let pool = create_test_pool().await;

        PredictionLog::insert(&pool, &entry("Phishing", "url", 0.9))
            .await
            .unwrap();
        PredictionLog::insert(&pool, &entry("Legitimate", "text", 0.7))
            .await
            .unwrap();
        PredictionLog::insert(&pool, &entry("Phishing", "url", 0.8))
            .await
            .unwrap();

        let summary = PredictionLog::summary(&pool).await.unwrap();
        assert_eq!(summary.total_predictions, 3);
        assert_eq!(summary.phishing_count, 2);
        assert_eq!(summary.legitimate_count, 1);
        assert_eq!(summary.model_usage.url, 2);
        assert_eq!(summary.model_usage.text, 1);
        assert!((summary.phishing_percentage - 66.666).abs() < 0.01);
        assert!((summary.avg_confidence - 0.8).abs() < 1e-9);
    }

    #[tokio::test]
    async fn history_filters_by_model_and_prediction() {
        let pool = create_test_pool().await;

        PredictionLog::insert(&pool, &entry("Phishing", "url", 0.9))
            .await
            .unwrap();
        PredictionLog::insert(&pool, &entry("Legitimate", "url", 0.6))
            .await
            .unwrap();
        PredictionLog::insert(&pool, &entry("Phishing", "text", 0.7))
            .await
            .unwrap();

        let filter = HistoryFilter {
            model_type: Some("url".to_string()),
            prediction: Some("Phishing".to_string()),
            limit: 100,
            offset: 0,
        };
        let rows = PredictionLog::history(&pool, &filter).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].model_type, "url");
        assert_eq!(rows[0].prediction, "Phishing");
    }

    #[tokio::test]
    async fn daily_stats_fills_empty_days() {
        let pool = create_test_pool().await;
        PredictionLog::insert(&pool, &entry("Phishing", "url", 0.9))
            .await
            .unwrap();

        let stats = PredictionLog::daily_stats(&pool, 7).await.unwrap();
        assert_eq!(stats.len(), 7);
        // today is the last bucket and holds the single row
        assert_eq!(stats[6].total_predictions, 1);
        assert_eq!(stats[6].phishing_count, 1);
        assert_eq!(stats[0].total_predictions, 0);
    }

    #[tokio::test]
    async fn model_performance_includes_all_kinds() {
        let pool = create_test_pool().await;
        PredictionLog::insert(&pool, &entry("Phishing", "url", 0.9))
            .await
            .unwrap();
        PredictionLog::insert(&pool, &entry("Phishing", "llm_url", 0.9))
            .await
            .unwrap();

        let performance = PredictionLog::model_performance(&pool).await.unwrap();
        assert_eq!(performance.len(), 3);
        assert_eq!(performance["url"].total_predictions, 1);
        assert_eq!(performance["text"].total_predictions, 0);
        assert!((performance["url"].phishing_percentage - 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn top_phishing_urls_groups_and_orders() {
        let pool = create_test_pool().await;
        for _ in 0..3 {
            PredictionLog::insert(&pool, &entry("Phishing", "url", 0.9))
                .await
                .unwrap();
        }
        let mut other = entry("Phishing", "url", 0.8);
        other.url = Some("http://other.example".to_string());
        PredictionLog::insert(&pool, &other).await.unwrap();

        let top = PredictionLog::top_phishing_urls(&pool, 10).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].url, "http://example.com");
        assert_eq!(top[0].count, 3);
    }
}
