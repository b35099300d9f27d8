//! Database query implementations
//!
//! Contains functions for querying users, reports, KPI history and
//! recommendations

use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::DbError;
use crate::models::{
    KpiMetric, KpiSnapshot, NewReport, NewUser, Report, ReportStatus, ReportUpdate, User,
};
use crate::recommendations::{Recommendation, RecommendationStatus};

/// Outcome of syncing freshly generated recommendations into storage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecommendationSync {
    /// Recommendations that did not exist yet
    pub inserted: usize,
    /// Pending recommendations whose text changed with the new KPIs
    pub refreshed: usize,
    /// Pending recommendations whose rule no longer fires
    pub removed: usize,
}

/// Current time as an RFC 3339 string
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Short random id with a type prefix, e.g. "RPT-3F2A91C0"
pub fn generate_id(prefix: &str) -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, uuid[..8].to_uppercase())
}

/// Parse a text column into one of the model enums
fn parse_text<T>(idx: usize, value: String) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

fn parse_kpi_json(idx: usize, value: Option<String>) -> rusqlite::Result<Option<KpiSnapshot>> {
    value
        .map(|json| {
            serde_json::from_str(&json).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
            })
        })
        .transpose()
}

// ============================================================================
// Users
// ============================================================================

const USER_COLUMNS: &str = "id, username, email, password, name, role, manager_id";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        name: row.get(4)?,
        role: parse_text(5, row.get(5)?)?,
        manager_id: row.get(6)?,
    })
}

/// Get a single user by ID
pub fn get_user(conn: &Connection, user_id: &str) -> Result<Option<User>, DbError> {
    let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
    let user = conn
        .query_row(&sql, params![user_id], user_from_row)
        .optional()?;
    Ok(user)
}

/// Get a user by email address (case-insensitive)
pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, DbError> {
    let sql = format!(
        "SELECT {} FROM users WHERE email = ?1 COLLATE NOCASE",
        USER_COLUMNS
    );
    let user = conn
        .query_row(&sql, params![email.trim()], user_from_row)
        .optional()?;
    Ok(user)
}

/// Get a user by username
pub fn get_user_by_username(conn: &Connection, username: &str) -> Result<Option<User>, DbError> {
    let sql = format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS);
    let user = conn
        .query_row(&sql, params![username.trim()], user_from_row)
        .optional()?;
    Ok(user)
}

/// Get all reps reporting to a manager
pub fn get_users_by_manager(conn: &Connection, manager_id: &str) -> Result<Vec<User>, DbError> {
    let sql = format!(
        "SELECT {} FROM users WHERE manager_id = ?1 ORDER BY name",
        USER_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let users = stmt
        .query_map(params![manager_id], user_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}

/// Insert a user record as-is; existing ids are left untouched
pub fn insert_user(conn: &Connection, user: &User) -> Result<bool, DbError> {
    let inserted = conn.execute(
        r#"
        INSERT OR IGNORE INTO users (id, username, email, password, name, role, manager_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            user.id,
            user.username,
            user.email,
            user.password,
            user.name,
            user.role.as_str(),
            user.manager_id,
        ],
    )?;
    Ok(inserted > 0)
}

/// Create a user with a generated ID
pub fn create_user(conn: &Connection, new_user: NewUser) -> Result<User, DbError> {
    let user = User {
        id: generate_id("USR"),
        username: new_user.username.trim().to_string(),
        email: new_user.email.trim().to_string(),
        password: new_user.password,
        name: new_user.name,
        role: new_user.role,
        manager_id: new_user.manager_id,
    };

    conn.execute(
        r#"
        INSERT INTO users (id, username, email, password, name, role, manager_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            user.id,
            user.username,
            user.email,
            user.password,
            user.name,
            user.role.as_str(),
            user.manager_id,
        ],
    )?;

    Ok(user)
}

// ============================================================================
// Reports
// ============================================================================

const REPORT_COLUMNS: &str = "id, reportee_id, manager_id, date_started, date_completed, \
     status, feedback, kpi_data, created_at, updated_at";

fn report_from_row(row: &Row<'_>) -> rusqlite::Result<Report> {
    Ok(Report {
        id: row.get(0)?,
        reportee_id: row.get(1)?,
        manager_id: row.get(2)?,
        date_started: row.get(3)?,
        date_completed: row.get(4)?,
        status: parse_text(5, row.get(5)?)?,
        feedback: row.get(6)?,
        kpi_data: parse_kpi_json(7, row.get(7)?)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn query_reports(
    conn: &Connection,
    filter_column: &str,
    value: &str,
) -> Result<Vec<Report>, DbError> {
    let sql = format!(
        "SELECT {} FROM reports WHERE {} = ?1 ORDER BY date_started DESC, id",
        REPORT_COLUMNS, filter_column
    );
    let mut stmt = conn.prepare(&sql)?;
    let reports = stmt
        .query_map(params![value], report_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(reports)
}

/// Get a single report by ID
pub fn get_report(conn: &Connection, report_id: &str) -> Result<Option<Report>, DbError> {
    let sql = format!("SELECT {} FROM reports WHERE id = ?1", REPORT_COLUMNS);
    let report = conn
        .query_row(&sql, params![report_id], report_from_row)
        .optional()?;
    Ok(report)
}

/// Get all reports owned by a manager, newest first
pub fn get_reports_by_manager(conn: &Connection, manager_id: &str) -> Result<Vec<Report>, DbError> {
    query_reports(conn, "manager_id", manager_id)
}

/// Get all reports about a rep, newest first
pub fn get_reports_by_reportee(
    conn: &Connection,
    reportee_id: &str,
) -> Result<Vec<Report>, DbError> {
    query_reports(conn, "reportee_id", reportee_id)
}

/// Insert a report record as-is; existing ids are left untouched
pub fn insert_report(conn: &Connection, report: &Report) -> Result<bool, DbError> {
    let kpi_json = report
        .kpi_data
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    let inserted = conn.execute(
        r#"
        INSERT OR IGNORE INTO reports (
            id, reportee_id, manager_id, date_started, date_completed,
            status, feedback, kpi_data, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
        params![
            report.id,
            report.reportee_id,
            report.manager_id,
            report.date_started,
            report.date_completed,
            report.status.as_str(),
            report.feedback,
            kpi_json,
            report.created_at,
            report.updated_at,
        ],
    )?;
    Ok(inserted > 0)
}

/// Create an ongoing report with a generated ID
pub fn create_report(conn: &Connection, new_report: NewReport) -> Result<Report, DbError> {
    let now = now_timestamp();
    let report = Report {
        id: generate_id("RPT"),
        reportee_id: new_report.reportee_id,
        manager_id: new_report.manager_id,
        date_started: new_report.date_started.unwrap_or_else(|| now.clone()),
        date_completed: None,
        status: ReportStatus::Ongoing,
        feedback: None,
        kpi_data: new_report.kpi_data,
        created_at: now.clone(),
        updated_at: now,
    };

    insert_report(conn, &report)?;
    Ok(report)
}

/// Apply a partial update to a report
///
/// Returns `None` if the report does not exist.
pub fn update_report(
    conn: &Connection,
    report_id: &str,
    update: ReportUpdate,
) -> Result<Option<Report>, DbError> {
    let Some(mut report) = get_report(conn, report_id)? else {
        return Ok(None);
    };

    report.apply_update(update, &now_timestamp());

    let kpi_json = report
        .kpi_data
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    conn.execute(
        r#"
        UPDATE reports
        SET date_completed = ?2, status = ?3, feedback = ?4, kpi_data = ?5, updated_at = ?6
        WHERE id = ?1
        "#,
        params![
            report.id,
            report.date_completed,
            report.status.as_str(),
            report.feedback,
            kpi_json,
            report.updated_at,
        ],
    )?;

    Ok(Some(report))
}

// ============================================================================
// KPI metrics
// ============================================================================

/// Get the recorded KPI history for a report, oldest first
pub fn get_kpi_metrics_by_report(
    conn: &Connection,
    report_id: &str,
) -> Result<Vec<KpiMetric>, DbError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, report_id, sales, calls, appointments, conversion_rate, period, created_at
        FROM kpi_metrics
        WHERE report_id = ?1
        ORDER BY created_at, rowid
        "#,
    )?;

    let metrics = stmt
        .query_map(params![report_id], |row| {
            Ok(KpiMetric {
                id: row.get(0)?,
                report_id: row.get(1)?,
                snapshot: KpiSnapshot {
                    sales: row.get(2)?,
                    calls: row.get(3)?,
                    appointments: row.get(4)?,
                    conversion_rate: row.get(5)?,
                },
                period: row.get(6)?,
                created_at: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(metrics)
}

/// Record a KPI snapshot for a report period
pub fn create_kpi_metric(
    conn: &Connection,
    report_id: &str,
    snapshot: KpiSnapshot,
    period: &str,
) -> Result<KpiMetric, DbError> {
    let metric = KpiMetric {
        id: generate_id("KPI"),
        report_id: report_id.to_string(),
        snapshot,
        period: period.to_string(),
        created_at: now_timestamp(),
    };

    conn.execute(
        r#"
        INSERT INTO kpi_metrics (
            id, report_id, sales, calls, appointments, conversion_rate, period, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        params![
            metric.id,
            metric.report_id,
            metric.snapshot.sales,
            metric.snapshot.calls,
            metric.snapshot.appointments,
            metric.snapshot.conversion_rate,
            metric.period,
            metric.created_at,
        ],
    )?;

    Ok(metric)
}

// ============================================================================
// Recommendations
// ============================================================================

const RECOMMENDATION_COLUMNS: &str = "id, title, description, reason, type, priority, status";

fn recommendation_from_row(row: &Row<'_>) -> rusqlite::Result<Recommendation> {
    Ok(Recommendation {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        reason: row.get(3)?,
        rec_type: parse_text(4, row.get(4)?)?,
        priority: parse_text(5, row.get(5)?)?,
        status: parse_text(6, row.get(6)?)?,
    })
}

/// Get all recommendations stored for a report, in rule order
pub fn get_recommendations_by_report(
    conn: &Connection,
    report_id: &str,
) -> Result<Vec<Recommendation>, DbError> {
    let sql = format!(
        "SELECT {} FROM training_recommendations WHERE report_id = ?1 ORDER BY id",
        RECOMMENDATION_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let recommendations = stmt
        .query_map(params![report_id], recommendation_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(recommendations)
}

/// Get a single recommendation by ID
pub fn get_recommendation(
    conn: &Connection,
    recommendation_id: &str,
) -> Result<Option<Recommendation>, DbError> {
    let sql = format!(
        "SELECT {} FROM training_recommendations WHERE id = ?1",
        RECOMMENDATION_COLUMNS
    );
    let recommendation = conn
        .query_row(&sql, params![recommendation_id], recommendation_from_row)
        .optional()?;
    Ok(recommendation)
}

/// Store a recommendation, refreshing the content of a pending one with
/// the same ID
///
/// Accepted and ignored rows are left exactly as they were decided.
pub fn upsert_recommendation(
    conn: &Connection,
    report_id: &str,
    recommendation: &Recommendation,
) -> Result<(), DbError> {
    conn.execute(
        r#"
        INSERT INTO training_recommendations (
            id, report_id, title, description, reason, type, priority, status, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            description = excluded.description,
            reason = excluded.reason,
            type = excluded.type,
            priority = excluded.priority
        WHERE training_recommendations.status = 'pending'
        "#,
        params![
            recommendation.id,
            report_id,
            recommendation.title,
            recommendation.description,
            recommendation.reason,
            recommendation.rec_type.as_str(),
            recommendation.priority.as_str(),
            recommendation.status.as_str(),
            now_timestamp(),
        ],
    )?;
    Ok(())
}

/// Reconcile stored recommendations with a fresh evaluation
///
/// Decided recommendations (accepted or ignored) are never touched. Pending
/// ones that are not in `generated` are removed, pending ones that are take
/// the freshly generated text, and generated ones that do not exist yet are
/// inserted.
pub fn sync_recommendations(
    conn: &Connection,
    report_id: &str,
    generated: &[Recommendation],
) -> Result<RecommendationSync, DbError> {
    let tx = conn.unchecked_transaction()?;

    let existing = get_recommendations_by_report(&tx, report_id)?;
    let mut removed = 0;
    for stale in existing
        .iter()
        .filter(|r| r.is_pending() && !generated.iter().any(|g| g.id == r.id))
    {
        removed += tx.execute(
            "DELETE FROM training_recommendations WHERE id = ?1",
            params![stale.id],
        )?;
    }

    let mut inserted = 0;
    let mut refreshed = 0;
    for recommendation in generated {
        match existing.iter().find(|r| r.id == recommendation.id) {
            None => inserted += 1,
            Some(stored) if stored.is_pending() && !stored.same_content(recommendation) => {
                refreshed += 1
            }
            Some(_) => {}
        }
        upsert_recommendation(&tx, report_id, recommendation)?;
    }

    tx.commit()?;

    Ok(RecommendationSync {
        inserted,
        refreshed,
        removed,
    })
}

/// Set the status of a recommendation
///
/// Returns `None` if the recommendation does not exist. Transition rules
/// are enforced by the caller.
pub fn set_recommendation_status(
    conn: &Connection,
    recommendation_id: &str,
    status: RecommendationStatus,
) -> Result<Option<Recommendation>, DbError> {
    let updated = conn.execute(
        "UPDATE training_recommendations SET status = ?2 WHERE id = ?1",
        params![recommendation_id, status.as_str()],
    )?;

    if updated == 0 {
        return Ok(None);
    }
    get_recommendation(conn, recommendation_id)
}
