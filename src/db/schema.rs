//! Database schema definitions
//!
//! Contains SQL for creating all tables and indexes

use rusqlite::Connection;

use super::DbError;

/// SQL schema for all tables
const SCHEMA: &str = r#"
-- Managers and reps
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    name TEXT NOT NULL,
    role TEXT NOT NULL,
    manager_id TEXT REFERENCES users(id)
);

CREATE INDEX IF NOT EXISTS idx_users_manager ON users(manager_id);

-- Coaching reports; kpi_data holds the current snapshot as JSON
CREATE TABLE IF NOT EXISTS reports (
    id TEXT PRIMARY KEY,
    reportee_id TEXT NOT NULL REFERENCES users(id),
    manager_id TEXT NOT NULL REFERENCES users(id),
    date_started TEXT NOT NULL,
    date_completed TEXT,
    status TEXT NOT NULL,
    feedback TEXT,
    kpi_data TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reports_manager ON reports(manager_id);
CREATE INDEX IF NOT EXISTS idx_reports_reportee ON reports(reportee_id);

-- KPI history per report and period
CREATE TABLE IF NOT EXISTS kpi_metrics (
    id TEXT PRIMARY KEY,
    report_id TEXT NOT NULL REFERENCES reports(id) ON DELETE CASCADE,
    sales REAL NOT NULL,
    calls INTEGER NOT NULL,
    appointments INTEGER NOT NULL,
    conversion_rate REAL NOT NULL,
    period TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_kpi_metrics_report ON kpi_metrics(report_id, created_at);

-- Generated coaching recommendations
CREATE TABLE IF NOT EXISTS training_recommendations (
    id TEXT PRIMARY KEY,
    report_id TEXT NOT NULL REFERENCES reports(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    reason TEXT NOT NULL,
    type TEXT NOT NULL,
    priority TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_recommendations_report ON training_recommendations(report_id);
CREATE INDEX IF NOT EXISTS idx_recommendations_status ON training_recommendations(status);
"#;

/// Create all database tables
pub fn create_tables(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
