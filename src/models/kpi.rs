//! KPI data types
//!
//! The four tracked indicators for a sales rep and their recorded history

use serde::{Deserialize, Serialize};

/// KPI values for one rep over one reporting period
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KpiSnapshot {
    /// Closed sales in dollars
    pub sales: f64,
    /// Outbound calls made
    pub calls: u32,
    /// Appointments booked
    pub appointments: u32,
    /// Fraction of prospects converted (0.0 - 1.0)
    #[serde(alias = "conversionRate")]
    pub conversion_rate: f64,
}

impl KpiSnapshot {
    pub fn new(sales: f64, calls: u32, appointments: u32, conversion_rate: f64) -> Self {
        Self {
            sales,
            calls,
            appointments,
            conversion_rate,
        }
    }
}

/// A KPI snapshot recorded against a report for a named period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiMetric {
    pub id: String,
    pub report_id: String,
    #[serde(flatten)]
    pub snapshot: KpiSnapshot,
    /// Free-form period label, e.g. "2025-01" or "Q1 2025"
    pub period: String,
    pub created_at: String,
}
