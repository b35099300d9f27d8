//! Data models module
//!
//! Contains all data structures used throughout the application:
//! - KPI snapshots and recorded metrics
//! - Coaching reports
//! - Users (managers and reps)

pub mod kpi;
pub mod report;
pub mod user;

pub use kpi::{KpiMetric, KpiSnapshot};
pub use report::{NewReport, Report, ReportDetail, ReportStatus, ReportUpdate};
pub use user::{NewUser, User, UserProfile, UserRole};
