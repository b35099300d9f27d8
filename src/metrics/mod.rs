//! Metrics calculation module
//!
//! This module handles all KPI calculations:
//! - Threshold tables and per-KPI status classification
//! - Target trend percentages
//! - Overall performance scoring

pub mod score;
pub mod thresholds;

pub use score::{
    calculate_performance_score, calculate_performance_score_with, score_breakdown,
    PerformanceRating, ScoreBreakdown,
};
pub use thresholds::{
    calculate_kpi_status, calculate_trend, kpi_statuses, kpi_trends, ConfigError, KpiStatus,
    KpiStatuses, KpiThreshold, KpiTrends, Thresholds, Trend, TrendDirection,
};
