//! Database module - SQLite connection and schema

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Create database connection pool
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
}

/// Apply the schema
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Create tables if not exist
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;

    tracing::info!("Database schema applied successfully");
    Ok(())
}

/// Database schema SQL
const SCHEMA_SQL: &str = r#"
-- Prediction log (append-only; one row per request, ML and LLM paths alike)
CREATE TABLE IF NOT EXISTS prediction_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT,
    text TEXT,
    prediction TEXT NOT NULL,
    confidence REAL NOT NULL,
    model_type TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    ip_address TEXT,
    user_agent TEXT
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_logs_timestamp ON prediction_logs(timestamp);
CREATE INDEX IF NOT EXISTS idx_logs_model_type ON prediction_logs(model_type);
CREATE INDEX IF NOT EXISTS idx_logs_prediction ON prediction_logs(prediction);
CREATE INDEX IF NOT EXISTS idx_logs_url ON prediction_logs(url);
"#;

/// In-memory pool with schema applied, for tests.
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory SQLite pool");
    run_migrations(&pool).await.expect("schema");
    pool
}
