//! Database models

pub mod prediction_log;

pub use prediction_log::{
    AnalyticsSummary, DailyStats, HistoryFilter, ModelPerformance, ModelUsage, NewLogEntry,
    PredictionLog, TopPhishingUrl,
};
