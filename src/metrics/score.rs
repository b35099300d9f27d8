//! Performance scoring
//!
//! Each KPI is scored as its percentage of target, capped at 100, and the
//! overall score is the rounded mean of the four sub-scores:
//!
//! score = round((S_sales + S_calls + S_appointments + S_conversion) / 4)
//! S_kpi = min(100, value / target * 100)

use serde::{Deserialize, Serialize};

use super::thresholds::Thresholds;
use crate::models::KpiSnapshot;

/// Performance rating based on overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceRating {
    /// >= 90
    Excellent,
    /// 75 - 89
    Good,
    /// 60 - 74
    Fair,
    /// < 60
    NeedsAttention,
}

impl PerformanceRating {
    /// Get rating from an overall score
    pub fn from_score(score: u8) -> Self {
        if score >= 90 {
            Self::Excellent
        } else if score >= 75 {
            Self::Good
        } else if score >= 60 {
            Self::Fair
        } else {
            Self::NeedsAttention
        }
    }

    /// Get display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::NeedsAttention => "Needs Attention",
        }
    }
}

/// Sub-scores for each KPI plus the overall score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub sales: f64,
    pub calls: f64,
    pub appointments: f64,
    pub conversion_rate: f64,
    pub overall: u8,
}

impl ScoreBreakdown {
    pub fn rating(&self) -> PerformanceRating {
        PerformanceRating::from_score(self.overall)
    }
}

/// Percentage of target reached, capped at 100
fn sub_score(value: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    (value / target * 100.0).min(100.0)
}

/// Score a snapshot against the given thresholds' targets
pub fn score_breakdown(snapshot: &KpiSnapshot, thresholds: &Thresholds) -> ScoreBreakdown {
    let sales = sub_score(snapshot.sales, thresholds.sales.target);
    let calls = sub_score(snapshot.calls as f64, thresholds.calls.target);
    let appointments = sub_score(snapshot.appointments as f64, thresholds.appointments.target);
    let conversion_rate = sub_score(snapshot.conversion_rate, thresholds.conversion_rate.target);

    let mean = (sales + calls + appointments + conversion_rate) / 4.0;
    // Negative sales or rates are not rejected upstream, so the mean can dip below zero
    let overall = mean.round().clamp(0.0, 100.0) as u8;

    ScoreBreakdown {
        sales,
        calls,
        appointments,
        conversion_rate,
        overall,
    }
}

/// Overall 0-100 score against the given thresholds
pub fn calculate_performance_score_with(snapshot: &KpiSnapshot, thresholds: &Thresholds) -> u8 {
    score_breakdown(snapshot, thresholds).overall
}

/// Overall 0-100 score against the default targets
/// (sales 50,000, calls 100, appointments 25, conversion 17%)
pub fn calculate_performance_score(snapshot: &KpiSnapshot) -> u8 {
    calculate_performance_score_with(snapshot, &Thresholds::default())
}
