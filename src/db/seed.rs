//! Demo data
//!
//! One manager with three reps, each with an ongoing report. Seeding is
//! idempotent: records that already exist are skipped.

use rusqlite::Connection;

use super::queries::{insert_report, insert_user};
use super::DbError;
use crate::models::{KpiSnapshot, Report, ReportStatus, User, UserRole};

pub const DEMO_MANAGER_ID: &str = "MGR-99";
const DEMO_PASSWORD: &str = "password123";

/// Records inserted by a seeding run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub reports: usize,
}

fn demo_user(id: &str, username: &str, name: &str, role: UserRole) -> User {
    User {
        id: id.to_string(),
        username: username.to_string(),
        email: format!("{}@healthcorp.com", username),
        password: DEMO_PASSWORD.to_string(),
        name: name.to_string(),
        role,
        manager_id: match role {
            UserRole::Manager => None,
            UserRole::Rep => Some(DEMO_MANAGER_ID.to_string()),
        },
    }
}

fn demo_report(id: &str, reportee_id: &str, date: &str, kpi: KpiSnapshot) -> Report {
    let started = format!("{}T00:00:00Z", date);
    Report {
        id: id.to_string(),
        reportee_id: reportee_id.to_string(),
        manager_id: DEMO_MANAGER_ID.to_string(),
        date_started: started.clone(),
        date_completed: None,
        status: ReportStatus::Ongoing,
        feedback: None,
        kpi_data: Some(kpi),
        created_at: started.clone(),
        updated_at: started,
    }
}

pub fn demo_users() -> Vec<User> {
    vec![
        demo_user(DEMO_MANAGER_ID, "manager", "Sarah Johnson", UserRole::Manager),
        demo_user("REP-01", "mjohnson", "Michael Johnson", UserRole::Rep),
        demo_user("REP-02", "ldavis", "Lisa Davis", UserRole::Rep),
        demo_user("REP-03", "rwilson", "Robert Wilson", UserRole::Rep),
    ]
}

pub fn demo_reports() -> Vec<Report> {
    vec![
        demo_report(
            "RPT-1001",
            "REP-01",
            "2025-01-15",
            KpiSnapshot::new(45_200.0, 127, 24, 0.12),
        ),
        demo_report(
            "RPT-1002",
            "REP-02",
            "2025-01-18",
            KpiSnapshot::new(68_500.0, 95, 32, 0.22),
        ),
        demo_report(
            "RPT-1003",
            "REP-03",
            "2025-01-20",
            KpiSnapshot::new(52_100.0, 110, 28, 0.16),
        ),
    ]
}

/// Insert the demo manager, reps and reports
pub fn seed_demo_data(conn: &Connection) -> Result<SeedSummary, DbError> {
    let tx = conn.unchecked_transaction()?;
    let mut summary = SeedSummary::default();

    for user in demo_users() {
        if insert_user(&tx, &user)? {
            summary.users += 1;
        }
    }
    for report in demo_reports() {
        if insert_report(&tx, &report)? {
            summary.reports += 1;
        }
    }

    tx.commit()?;

    tracing::info!(
        "Seeded {} users and {} reports",
        summary.users,
        summary.reports
    );

    Ok(summary)
}
