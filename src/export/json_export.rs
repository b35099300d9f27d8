//! JSON export functionality
//!
//! Wraps report rows with export metadata and a team summary.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use super::ExportableReport;
use crate::CommandError;

const EXPORT_VERSION: &str = "1.0.0";

/// Complete export structure for JSON
#[derive(Debug, Clone, Serialize)]
pub struct ReportsExportJson {
    pub export_date: String,
    pub export_version: &'static str,
    pub manager_id: String,
    pub total_reports: usize,
    pub reports: Vec<ExportableReport>,
    pub summary: ExportSummary,
}

/// Summary statistics for the export
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExportSummary {
    /// Mean score over reports that have KPI data
    pub avg_performance_score: Option<f64>,
    pub total_sales: f64,
    pub total_pending_recommendations: u32,
    pub scored_reports: usize,
}

impl ExportSummary {
    pub fn from_reports(reports: &[ExportableReport]) -> Self {
        let scores: Vec<f64> = reports
            .iter()
            .filter_map(|r| r.performance_score)
            .map(f64::from)
            .collect();

        let avg_performance_score = if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        };

        Self {
            avg_performance_score,
            total_sales: reports.iter().filter_map(|r| r.sales).sum(),
            total_pending_recommendations: reports.iter().map(|r| r.pending_recommendations).sum(),
            scored_reports: scores.len(),
        }
    }
}

/// Write reports to JSON format
pub fn write_reports_json(
    reports: &[ExportableReport],
    manager_id: &str,
    path: &Path,
) -> Result<(), CommandError> {
    let export = ReportsExportJson {
        export_date: chrono::Utc::now().to_rfc3339(),
        export_version: EXPORT_VERSION,
        manager_id: manager_id.to_string(),
        total_reports: reports.len(),
        reports: reports.to_vec(),
        summary: ExportSummary::from_reports(reports),
    };

    let json = serde_json::to_string_pretty(&export)
        .map_err(|e| CommandError::Internal(format!("Failed to serialize JSON: {}", e)))?;

    let mut file = std::fs::File::create(path)
        .map_err(|e| CommandError::Internal(format!("Failed to create JSON file: {}", e)))?;

    file.write_all(json.as_bytes())
        .map_err(|e| CommandError::Internal(format!("Failed to write JSON: {}", e)))?;

    Ok(())
}
