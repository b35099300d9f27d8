//! KPI threshold table and status classification
//!
//! Each KPI has a target, a warning floor and a critical floor:
//! - Positive: value >= target
//! - Warning: warning <= value < target
//! - Negative: value < warning

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::KpiSnapshot;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read thresholds file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse thresholds file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid threshold for {kpi}: {reason}")]
    Invalid { kpi: &'static str, reason: String },
}

/// Boundaries for a single KPI
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiThreshold {
    pub target: f64,
    pub warning: f64,
    pub critical: f64,
}

impl KpiThreshold {
    pub const fn new(target: f64, warning: f64, critical: f64) -> Self {
        Self {
            target,
            warning,
            critical,
        }
    }

    fn validate(&self, kpi: &'static str) -> Result<(), ConfigError> {
        if !(self.target > 0.0) {
            return Err(ConfigError::Invalid {
                kpi,
                reason: format!("target must be positive, got {}", self.target),
            });
        }
        if self.warning > self.target || self.critical > self.warning {
            return Err(ConfigError::Invalid {
                kpi,
                reason: format!(
                    "expected target >= warning >= critical, got {} / {} / {}",
                    self.target, self.warning, self.critical
                ),
            });
        }
        Ok(())
    }
}

/// Threshold table for all four KPIs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub sales: KpiThreshold,
    pub calls: KpiThreshold,
    pub appointments: KpiThreshold,
    #[serde(alias = "conversionRate")]
    pub conversion_rate: KpiThreshold,
    /// Conversion rate below which a high call volume is treated as a
    /// call quality problem
    pub call_quality_conversion: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            sales: KpiThreshold::new(50_000.0, 45_000.0, 40_000.0),
            calls: KpiThreshold::new(100.0, 80.0, 60.0),
            appointments: KpiThreshold::new(25.0, 20.0, 15.0),
            conversion_rate: KpiThreshold::new(0.17, 0.15, 0.12),
            call_quality_conversion: 0.16,
        }
    }
}

impl Thresholds {
    /// Load thresholds from a JSON file; absent fields keep their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let thresholds: Thresholds = serde_json::from_str(&content)?;
        thresholds.validate()?;
        tracing::debug!("Loaded thresholds from {}", path.display());
        Ok(thresholds)
    }

    /// Check every KPI has a positive target and ordered floors
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sales.validate("sales")?;
        self.calls.validate("calls")?;
        self.appointments.validate("appointments")?;
        self.conversion_rate.validate("conversion_rate")?;
        if !(0.0..=1.0).contains(&self.call_quality_conversion) {
            return Err(ConfigError::Invalid {
                kpi: "call_quality_conversion",
                reason: format!("must be within 0..=1, got {}", self.call_quality_conversion),
            });
        }
        Ok(())
    }
}

/// Status of a KPI relative to its threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiStatus {
    Positive,
    Warning,
    Negative,
}

/// Classify a value against its threshold
pub fn calculate_kpi_status(value: f64, threshold: &KpiThreshold) -> KpiStatus {
    if value >= threshold.target {
        KpiStatus::Positive
    } else if value >= threshold.warning {
        KpiStatus::Warning
    } else {
        KpiStatus::Negative
    }
}

/// Status of every KPI in a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiStatuses {
    pub sales: KpiStatus,
    pub calls: KpiStatus,
    pub appointments: KpiStatus,
    pub conversion_rate: KpiStatus,
}

impl KpiStatuses {
    /// True when any KPI has fallen below its warning floor
    pub fn needs_attention(&self) -> bool {
        self.iter().any(|s| s == KpiStatus::Negative)
    }

    fn iter(&self) -> impl Iterator<Item = KpiStatus> {
        [self.sales, self.calls, self.appointments, self.conversion_rate].into_iter()
    }
}

/// Classify every KPI in a snapshot
pub fn kpi_statuses(snapshot: &KpiSnapshot, thresholds: &Thresholds) -> KpiStatuses {
    KpiStatuses {
        sales: calculate_kpi_status(snapshot.sales, &thresholds.sales),
        calls: calculate_kpi_status(snapshot.calls as f64, &thresholds.calls),
        appointments: calculate_kpi_status(snapshot.appointments as f64, &thresholds.appointments),
        conversion_rate: calculate_kpi_status(snapshot.conversion_rate, &thresholds.conversion_rate),
    }
}

/// Direction of a value relative to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
}

/// Distance of a value from its target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    /// Absolute percentage difference from target
    pub percentage: f64,
    pub direction: TrendDirection,
    pub status: KpiStatus,
}

/// Compare a value against a target
///
/// Status is only ever `Positive` (at or above target) or `Negative`.
pub fn calculate_trend(current: f64, target: f64) -> Trend {
    let percentage = if target == 0.0 {
        0.0
    } else {
        (current - target) / target * 100.0
    };

    let (direction, status) = if percentage >= 0.0 {
        (TrendDirection::Up, KpiStatus::Positive)
    } else {
        (TrendDirection::Down, KpiStatus::Negative)
    };

    Trend {
        percentage: percentage.abs(),
        direction,
        status,
    }
}

/// Trend of every KPI in a snapshot against its target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiTrends {
    pub sales: Trend,
    pub calls: Trend,
    pub appointments: Trend,
    pub conversion_rate: Trend,
}

pub fn kpi_trends(snapshot: &KpiSnapshot, thresholds: &Thresholds) -> KpiTrends {
    KpiTrends {
        sales: calculate_trend(snapshot.sales, thresholds.sales.target),
        calls: calculate_trend(snapshot.calls as f64, thresholds.calls.target),
        appointments: calculate_trend(snapshot.appointments as f64, thresholds.appointments.target),
        conversion_rate: calculate_trend(snapshot.conversion_rate, thresholds.conversion_rate.target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds_valid() {
        let thresholds = Thresholds::default();
        assert!(thresholds.validate().is_ok());
        assert_eq!(thresholds.sales.target, 50_000.0);
        assert_eq!(thresholds.conversion_rate.warning, 0.15);
    }

    #[test]
    fn test_kpi_status_boundaries() {
        let threshold = KpiThreshold::new(100.0, 80.0, 60.0);

        assert_eq!(calculate_kpi_status(100.0, &threshold), KpiStatus::Positive);
        assert_eq!(calculate_kpi_status(150.0, &threshold), KpiStatus::Positive);
        assert_eq!(calculate_kpi_status(99.0, &threshold), KpiStatus::Warning);
        assert_eq!(calculate_kpi_status(80.0, &threshold), KpiStatus::Warning);
        assert_eq!(calculate_kpi_status(79.9, &threshold), KpiStatus::Negative);
    }

    #[test]
    fn test_kpi_statuses_for_snapshot() {
        let snapshot = KpiSnapshot::new(45200.0, 127, 24, 0.12);
        let statuses = kpi_statuses(&snapshot, &Thresholds::default());

        assert_eq!(statuses.sales, KpiStatus::Warning);
        assert_eq!(statuses.calls, KpiStatus::Positive);
        assert_eq!(statuses.appointments, KpiStatus::Warning);
        assert_eq!(statuses.conversion_rate, KpiStatus::Negative);
        assert!(statuses.needs_attention());
    }

    #[test]
    fn test_strong_snapshot_needs_no_attention() {
        let snapshot = KpiSnapshot::new(68500.0, 95, 32, 0.22);
        let statuses = kpi_statuses(&snapshot, &Thresholds::default());

        assert_eq!(statuses.calls, KpiStatus::Warning);
        assert!(!statuses.needs_attention());
    }

    #[test]
    fn test_trend_above_target() {
        let trend = calculate_trend(55_000.0, 50_000.0);
        assert!((trend.percentage - 10.0).abs() < 1e-9);
        assert_eq!(trend.direction, TrendDirection::Up);
        assert_eq!(trend.status, KpiStatus::Positive);
    }

    #[test]
    fn test_trend_below_target() {
        let trend = calculate_trend(20.0, 25.0);
        assert!((trend.percentage - 20.0).abs() < 1e-9);
        assert_eq!(trend.direction, TrendDirection::Down);
        assert_eq!(trend.status, KpiStatus::Negative);
    }

    #[test]
    fn test_trend_zero_target() {
        let trend = calculate_trend(10.0, 0.0);
        assert_eq!(trend.percentage, 0.0);
        assert_eq!(trend.direction, TrendDirection::Up);
    }

    #[test]
    fn test_partial_thresholds_json_uses_defaults() {
        let json = r#"{"sales": {"target": 60000, "warning": 55000, "critical": 50000}}"#;
        let thresholds: Thresholds = serde_json::from_str(json).unwrap();

        assert_eq!(thresholds.sales.target, 60_000.0);
        assert_eq!(thresholds.calls, Thresholds::default().calls);
        assert_eq!(thresholds.call_quality_conversion, 0.16);
    }

    #[test]
    fn test_validate_rejects_zero_target() {
        let mut thresholds = Thresholds::default();
        thresholds.calls.target = 0.0;

        let err = thresholds.validate().unwrap_err();
        assert!(err.to_string().contains("calls"));
    }

    #[test]
    fn test_validate_rejects_unordered_floors() {
        let mut thresholds = Thresholds::default();
        thresholds.appointments = KpiThreshold::new(25.0, 30.0, 15.0);

        assert!(matches!(
            thresholds.validate(),
            Err(ConfigError::Invalid { kpi: "appointments", .. })
        ));
    }

    #[test]
    fn test_load_thresholds_from_file() {
        let path = std::env::temp_dir().join("repcoach_test_thresholds.json");
        std::fs::write(&path, r#"{"appointments": {"target": 30, "warning": 24, "critical": 18}}"#)
            .unwrap();

        let thresholds = Thresholds::load(&path).unwrap();
        assert_eq!(thresholds.appointments.target, 30.0);
        assert_eq!(thresholds.sales, Thresholds::default().sales);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("repcoach_no_such_thresholds.json");
        assert!(matches!(Thresholds::load(&path), Err(ConfigError::Io(_))));
    }
}
