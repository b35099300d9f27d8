//! Coaching report types
//!
//! A report tracks one rep's performance for a coaching cycle, owned by
//! their manager.

use serde::{Deserialize, Serialize};

use super::kpi::KpiSnapshot;

/// Lifecycle state of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Ongoing,
    Completed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
        }
    }
}

impl std::str::FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ongoing" => Ok(Self::Ongoing),
            "completed" => Ok(Self::Completed),
            other => Err(format!("Unknown report status: {}", other)),
        }
    }
}

/// Full report record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub reportee_id: String,
    pub manager_id: String,
    pub date_started: String,
    pub date_completed: Option<String>,
    pub status: ReportStatus,
    pub feedback: Option<String>,
    pub kpi_data: Option<KpiSnapshot>,
    pub created_at: String,
    pub updated_at: String,
}

impl Report {
    pub fn is_ongoing(&self) -> bool {
        self.status == ReportStatus::Ongoing
    }

    /// Apply a partial update in place, stamping `updated_at` with `now`
    ///
    /// Moving to `Completed` records `now` as the completion date; moving
    /// back to `Ongoing` clears it.
    pub fn apply_update(&mut self, update: ReportUpdate, now: &str) {
        if let Some(feedback) = update.feedback {
            self.feedback = Some(feedback);
        }
        if let Some(kpi_data) = update.kpi_data {
            self.kpi_data = Some(kpi_data);
        }
        if let Some(status) = update.status {
            if status != self.status {
                self.date_completed = match status {
                    ReportStatus::Completed => Some(now.to_string()),
                    ReportStatus::Ongoing => None,
                };
            }
            self.status = status;
        }
        self.updated_at = now.to_string();
    }
}

/// Report enriched with user names and its performance score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDetail {
    #[serde(flatten)]
    pub report: Report,
    pub reportee_name: Option<String>,
    pub manager_name: Option<String>,
    pub performance_score: Option<u8>,
}

/// Fields required to open a report
#[derive(Debug, Clone, Deserialize)]
pub struct NewReport {
    pub reportee_id: String,
    pub manager_id: String,
    /// Defaults to the creation time
    pub date_started: Option<String>,
    pub kpi_data: Option<KpiSnapshot>,
}

/// Partial update to a report; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportUpdate {
    pub feedback: Option<String>,
    pub status: Option<ReportStatus>,
    pub kpi_data: Option<KpiSnapshot>,
}
