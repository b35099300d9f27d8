//! Export module for CSV and JSON export functionality
//!
//! Provides report exports with KPIs, scores and outstanding
//! recommendation counts in CSV and JSON formats.

pub mod csv_export;
pub mod json_export;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::metrics::{score_breakdown, Thresholds};
use crate::models::ReportDetail;
use crate::CommandError;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(CommandError::InvalidInput(format!(
                "Invalid export format: {}. Use 'csv' or 'json'",
                s
            ))),
        }
    }
}

impl ExportFormat {
    /// Get file extension for format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Exportable report record for CSV/JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportableReport {
    pub report_id: String,
    pub reportee_id: String,
    pub reportee_name: Option<String>,
    pub date_started: String,
    pub status: String,
    pub sales: Option<f64>,
    pub calls: Option<u32>,
    pub appointments: Option<u32>,
    pub conversion_rate: Option<f64>,
    pub performance_score: Option<u8>,
    pub rating: Option<String>,
    pub pending_recommendations: u32,
}

impl ExportableReport {
    pub fn from_detail(
        detail: &ReportDetail,
        thresholds: &Thresholds,
        pending_recommendations: u32,
    ) -> Self {
        let report = &detail.report;
        let kpi = report.kpi_data.as_ref();
        let breakdown = kpi.map(|k| score_breakdown(k, thresholds));

        Self {
            report_id: report.id.clone(),
            reportee_id: report.reportee_id.clone(),
            reportee_name: detail.reportee_name.clone(),
            date_started: report.date_started.clone(),
            status: report.status.as_str().to_string(),
            sales: kpi.map(|k| k.sales),
            calls: kpi.map(|k| k.calls),
            appointments: kpi.map(|k| k.appointments),
            conversion_rate: kpi.map(|k| k.conversion_rate),
            performance_score: breakdown.map(|b| b.overall),
            rating: breakdown.map(|b| b.rating().label().to_string()),
            pending_recommendations,
        }
    }
}

/// Get the default export directory (Downloads folder or temp dir)
pub fn get_export_directory() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::document_dir)
        .unwrap_or_else(std::env::temp_dir)
}

/// Generate a timestamped filename for exports
pub fn generate_export_filename(prefix: &str, extension: &str) -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    format!("{}_{}.{}", prefix, timestamp, extension)
}

pub use csv_export::*;
pub use json_export::*;
