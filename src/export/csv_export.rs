//! CSV export functionality
//!
//! One row per report.

use std::path::Path;

use csv::Writer;

use super::ExportableReport;
use crate::CommandError;

/// Write reports to CSV format
pub fn write_reports_csv(reports: &[ExportableReport], path: &Path) -> Result<(), CommandError> {
    let file = std::fs::File::create(path)
        .map_err(|e| CommandError::Internal(format!("Failed to create CSV file: {}", e)))?;

    let mut writer = Writer::from_writer(file);

    for report in reports {
        writer
            .serialize(report)
            .map_err(|e| CommandError::Internal(format!("Failed to write CSV record: {}", e)))?;
    }

    writer
        .flush()
        .map_err(|e| CommandError::Internal(format!("Failed to flush CSV: {}", e)))?;

    Ok(())
}
