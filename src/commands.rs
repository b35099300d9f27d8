//! Backend commands
//!
//! Each command takes the shared [`AppState`], runs against the database
//! and returns plain serializable data. These are the operations the
//! dashboard front end and the CLI are built on.

use std::path::PathBuf;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db::{queries, seed, DbError};
use crate::export::{self, ExportFormat, ExportableReport};
use crate::metrics::{
    kpi_statuses, kpi_trends, score_breakdown, KpiStatuses, KpiTrends, PerformanceRating,
    ScoreBreakdown, Thresholds,
};
use crate::models::{
    KpiMetric, KpiSnapshot, NewReport, NewUser, Report, ReportDetail, ReportUpdate, UserProfile,
    UserRole,
};
use crate::recommendations::{
    generate_recommendations_with, generate_team_recommendations, Recommendation,
    RecommendationStatus, RecommendationSummary, TeamRecommendations,
};
use crate::{AppState, CommandError};

// ============================================================================
// Response Types
// ============================================================================

/// Successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: UserProfile,
    pub token: String,
}

/// Report list filter; the manager filter wins when both are set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportQuery {
    pub manager_id: Option<String>,
    pub reportee_id: Option<String>,
}

/// Headline numbers for a manager's dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickStats {
    /// Ongoing reports
    pub active_reports: u32,
    /// Mean performance score of ongoing reports with KPI data
    pub avg_performance: u8,
    /// Pending recommendations across all reports
    pub recommendations: u32,
    /// Ongoing reports with at least one KPI below its warning floor
    pub needs_attention: u32,
}

/// Full evaluation of a single KPI snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotAnalysis {
    pub snapshot: KpiSnapshot,
    pub score: ScoreBreakdown,
    pub rating: PerformanceRating,
    pub statuses: KpiStatuses,
    pub trends: KpiTrends,
    pub recommendations: Vec<Recommendation>,
}

// ============================================================================
// Helpers
// ============================================================================

/// Run a closure against the database connection
fn with_db<F, T>(state: &AppState, f: F) -> Result<T, CommandError>
where
    F: FnOnce(&Connection) -> Result<T, CommandError>,
{
    let guard = state.db.lock().map_err(|_| DbError::LockPoisoned)?;
    let database = guard.as_ref().ok_or(CommandError::NotInitialized)?;
    database.with_connection(|conn| Ok(f(conn)))?
}

fn require_report(conn: &Connection, report_id: &str) -> Result<Report, CommandError> {
    queries::get_report(conn, report_id)?
        .ok_or_else(|| CommandError::ReportNotFound(report_id.to_string()))
}

/// Attach user names and the performance score to a report
fn enrich_report(
    conn: &Connection,
    report: Report,
    thresholds: &Thresholds,
) -> Result<ReportDetail, CommandError> {
    let reportee_name = queries::get_user(conn, &report.reportee_id)?.map(|u| u.name);
    let manager_name = queries::get_user(conn, &report.manager_id)?.map(|u| u.name);
    let performance_score = report
        .kpi_data
        .as_ref()
        .map(|kpi| score_breakdown(kpi, thresholds).overall);

    Ok(ReportDetail {
        report,
        reportee_name,
        manager_name,
        performance_score,
    })
}

fn pending_count(conn: &Connection, report_id: &str) -> Result<u32, CommandError> {
    let recommendations = queries::get_recommendations_by_report(conn, report_id)?;
    Ok(recommendations.iter().filter(|r| r.is_pending()).count() as u32)
}

// ============================================================================
// Auth and Users
// ============================================================================

/// Check credentials and issue a session token
pub fn login(state: &AppState, email: &str, password: &str) -> Result<LoginResponse, CommandError> {
    let user = with_db(state, |conn| Ok(queries::get_user_by_email(conn, email)?))?;

    let user = match user {
        Some(user) if user.password == password => user,
        _ => {
            tracing::warn!("Failed login attempt for {}", email);
            return Err(CommandError::InvalidCredentials);
        }
    };

    let token = format!(
        "mock-jwt-{}-{}",
        user.id,
        chrono::Utc::now().timestamp_millis()
    );
    tracing::info!("User {} logged in", user.id);

    Ok(LoginResponse {
        user: user.profile(),
        token,
    })
}

/// Get a user's public profile
pub fn get_user(state: &AppState, user_id: &str) -> Result<UserProfile, CommandError> {
    with_db(state, |conn| {
        queries::get_user(conn, user_id)?
            .map(|u| u.profile())
            .ok_or_else(|| CommandError::UserNotFound(user_id.to_string()))
    })
}

/// Register a new manager or rep
pub fn create_user(state: &AppState, new_user: NewUser) -> Result<UserProfile, CommandError> {
    if new_user.username.trim().is_empty()
        || new_user.email.trim().is_empty()
        || new_user.name.trim().is_empty()
    {
        return Err(CommandError::InvalidInput(
            "username, name and email are required".to_string(),
        ));
    }

    with_db(state, |conn| {
        if queries::get_user_by_email(conn, &new_user.email)?.is_some() {
            return Err(CommandError::InvalidInput(format!(
                "Email already registered: {}",
                new_user.email.trim()
            )));
        }
        if queries::get_user_by_username(conn, &new_user.username)?.is_some() {
            return Err(CommandError::InvalidInput(format!(
                "Username already taken: {}",
                new_user.username.trim()
            )));
        }
        if let Some(manager_id) = &new_user.manager_id {
            if queries::get_user(conn, manager_id)?.is_none() {
                return Err(CommandError::UserNotFound(manager_id.clone()));
            }
        }

        let user = queries::create_user(conn, new_user)?;
        tracing::info!("Created {} {}", user.role.as_str(), user.id);
        Ok(user.profile())
    })
}

/// List the reps reporting to a manager
pub fn get_team_members(state: &AppState, manager_id: &str) -> Result<Vec<UserProfile>, CommandError> {
    with_db(state, |conn| {
        Ok(queries::get_users_by_manager(conn, manager_id)?
            .iter()
            .map(|u| u.profile())
            .collect())
    })
}

// ============================================================================
// Reports
// ============================================================================

/// List reports for a manager or a rep
pub fn get_reports(state: &AppState, query: &ReportQuery) -> Result<Vec<ReportDetail>, CommandError> {
    with_db(state, |conn| {
        let reports = if let Some(manager_id) = &query.manager_id {
            queries::get_reports_by_manager(conn, manager_id)?
        } else if let Some(reportee_id) = &query.reportee_id {
            queries::get_reports_by_reportee(conn, reportee_id)?
        } else {
            return Err(CommandError::InvalidInput(
                "managerId or reporteeId required".to_string(),
            ));
        };

        reports
            .into_iter()
            .map(|report| enrich_report(conn, report, &state.thresholds))
            .collect()
    })
}

/// Get a single report with names and score
pub fn get_report(state: &AppState, report_id: &str) -> Result<ReportDetail, CommandError> {
    with_db(state, |conn| {
        let report = require_report(conn, report_id)?;
        enrich_report(conn, report, &state.thresholds)
    })
}

/// Open a new report for a rep
pub fn create_report(state: &AppState, new_report: NewReport) -> Result<ReportDetail, CommandError> {
    with_db(state, |conn| {
        let manager = queries::get_user(conn, &new_report.manager_id)?
            .ok_or_else(|| CommandError::UserNotFound(new_report.manager_id.clone()))?;
        if manager.role != UserRole::Manager {
            return Err(CommandError::InvalidInput(format!(
                "{} is not a manager",
                manager.id
            )));
        }
        if queries::get_user(conn, &new_report.reportee_id)?.is_none() {
            return Err(CommandError::UserNotFound(new_report.reportee_id.clone()));
        }

        let report = queries::create_report(conn, new_report)?;
        tracing::info!("Created report {} for {}", report.id, report.reportee_id);
        enrich_report(conn, report, &state.thresholds)
    })
}

/// Update feedback, status or KPI data on a report
pub fn update_report(
    state: &AppState,
    report_id: &str,
    update: ReportUpdate,
) -> Result<ReportDetail, CommandError> {
    with_db(state, |conn| {
        let report = queries::update_report(conn, report_id, update)?
            .ok_or_else(|| CommandError::ReportNotFound(report_id.to_string()))?;
        tracing::debug!("Updated report {} (status: {})", report.id, report.status.as_str());
        enrich_report(conn, report, &state.thresholds)
    })
}

// ============================================================================
// KPI History
// ============================================================================

/// Record a period's KPIs and make them the report's current snapshot
pub fn record_kpi_metric(
    state: &AppState,
    report_id: &str,
    snapshot: KpiSnapshot,
    period: &str,
) -> Result<KpiMetric, CommandError> {
    if period.trim().is_empty() {
        return Err(CommandError::InvalidInput("period must not be empty".to_string()));
    }

    with_db(state, |conn| {
        require_report(conn, report_id)?;
        let metric = queries::create_kpi_metric(conn, report_id, snapshot, period.trim())?;
        queries::update_report(
            conn,
            report_id,
            ReportUpdate {
                kpi_data: Some(snapshot),
                ..Default::default()
            },
        )?;
        Ok(metric)
    })
}

/// Get the recorded KPI history of a report, oldest first
pub fn get_kpi_history(state: &AppState, report_id: &str) -> Result<Vec<KpiMetric>, CommandError> {
    with_db(state, |conn| {
        require_report(conn, report_id)?;
        Ok(queries::get_kpi_metrics_by_report(conn, report_id)?)
    })
}

// ============================================================================
// Recommendations
// ============================================================================

/// Evaluate a snapshot without touching storage
pub fn analyze_snapshot(state: &AppState, snapshot: KpiSnapshot, report_id: &str) -> SnapshotAnalysis {
    let score = score_breakdown(&snapshot, &state.thresholds);

    SnapshotAnalysis {
        snapshot,
        rating: score.rating(),
        score,
        statuses: kpi_statuses(&snapshot, &state.thresholds),
        trends: kpi_trends(&snapshot, &state.thresholds),
        recommendations: generate_recommendations_with(&snapshot, report_id, &state.thresholds),
    }
}

/// Generate recommendations for a report and store them
///
/// Earlier accept/ignore decisions are kept.
pub fn analyze_report(state: &AppState, report_id: &str) -> Result<RecommendationSummary, CommandError> {
    with_db(state, |conn| {
        let report = require_report(conn, report_id)?;
        let snapshot = report.kpi_data.ok_or_else(|| {
            CommandError::InvalidInput(format!("Report {} has no KPI data", report_id))
        })?;

        let generated = generate_recommendations_with(&snapshot, report_id, &state.thresholds);
        let sync = queries::sync_recommendations(conn, report_id, &generated)?;
        tracing::info!(
            "Analyzed report {}: {} generated, {} new, {} refreshed, {} stale removed",
            report_id,
            generated.len(),
            sync.inserted,
            sync.refreshed,
            sync.removed
        );

        let stored = queries::get_recommendations_by_report(conn, report_id)?;
        Ok(RecommendationSummary::from_recommendations(
            stored,
            Some(report_id.to_string()),
        ))
    })
}

/// Get stored recommendations for a report
pub fn get_report_recommendations(
    state: &AppState,
    report_id: &str,
) -> Result<RecommendationSummary, CommandError> {
    with_db(state, |conn| {
        require_report(conn, report_id)?;
        let stored = queries::get_recommendations_by_report(conn, report_id)?;
        Ok(RecommendationSummary::from_recommendations(
            stored,
            Some(report_id.to_string()),
        ))
    })
}

/// Accept or ignore a pending recommendation
pub fn update_recommendation_status(
    state: &AppState,
    recommendation_id: &str,
    status: RecommendationStatus,
) -> Result<Recommendation, CommandError> {
    with_db(state, |conn| {
        let current = queries::get_recommendation(conn, recommendation_id)?
            .ok_or_else(|| CommandError::RecommendationNotFound(recommendation_id.to_string()))?;

        let next = current.status.transition(status)?;

        let updated = queries::set_recommendation_status(conn, recommendation_id, next)?
            .ok_or_else(|| CommandError::RecommendationNotFound(recommendation_id.to_string()))?;
        tracing::info!("Recommendation {} marked {}", recommendation_id, next.as_str());
        Ok(updated)
    })
}

/// Preview recommendations for every ongoing report of a manager
pub fn get_team_recommendations(
    state: &AppState,
    manager_id: &str,
) -> Result<TeamRecommendations, CommandError> {
    with_db(state, |conn| {
        let reports: Vec<(String, KpiSnapshot)> = queries::get_reports_by_manager(conn, manager_id)?
            .into_iter()
            .filter(|r| r.is_ongoing())
            .filter_map(|r| r.kpi_data.map(|kpi| (r.id, kpi)))
            .collect();

        Ok(generate_team_recommendations(&reports, &state.thresholds))
    })
}

// ============================================================================
// Dashboard and Export
// ============================================================================

/// Headline numbers for a manager
pub fn get_dashboard_summary(state: &AppState, manager_id: &str) -> Result<QuickStats, CommandError> {
    with_db(state, |conn| {
        let reports = queries::get_reports_by_manager(conn, manager_id)?;

        let mut active_reports = 0u32;
        let mut needs_attention = 0u32;
        let mut recommendations = 0u32;
        let mut scores = Vec::new();

        for report in &reports {
            recommendations += pending_count(conn, &report.id)?;

            if !report.is_ongoing() {
                continue;
            }
            active_reports += 1;

            if let Some(kpi) = &report.kpi_data {
                scores.push(f64::from(score_breakdown(kpi, &state.thresholds).overall));
                if kpi_statuses(kpi, &state.thresholds).needs_attention() {
                    needs_attention += 1;
                }
            }
        }

        let avg_performance = if scores.is_empty() {
            0
        } else {
            (scores.iter().sum::<f64>() / scores.len() as f64).round() as u8
        };

        Ok(QuickStats {
            active_reports,
            avg_performance,
            recommendations,
            needs_attention,
        })
    })
}

/// Export a manager's reports; returns the written file path
pub fn export_reports(
    state: &AppState,
    manager_id: &str,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> Result<PathBuf, CommandError> {
    let rows: Vec<ExportableReport> = with_db(state, |conn| {
        queries::get_reports_by_manager(conn, manager_id)?
            .into_iter()
            .map(|report| -> Result<ExportableReport, CommandError> {
                let pending = pending_count(conn, &report.id)?;
                let detail = enrich_report(conn, report, &state.thresholds)?;
                Ok(ExportableReport::from_detail(&detail, &state.thresholds, pending))
            })
            .collect()
    })?;

    let path = output.unwrap_or_else(|| {
        export::get_export_directory().join(export::generate_export_filename(
            "repcoach_reports",
            format.extension(),
        ))
    });

    match format {
        ExportFormat::Csv => export::write_reports_csv(&rows, &path)?,
        ExportFormat::Json => export::write_reports_json(&rows, manager_id, &path)?,
    }

    tracing::info!("Exported {} reports to {}", rows.len(), path.display());

    Ok(path)
}

/// Insert the demo users and reports
pub fn seed_demo_data(state: &AppState) -> Result<seed::SeedSummary, CommandError> {
    with_db(state, |conn| Ok(seed::seed_demo_data(conn)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::metrics::{KpiStatus, TrendDirection};
    use crate::models::ReportStatus;

    fn seeded_state() -> AppState {
        let database = Database::open_in_memory().unwrap();
        database.initialize().unwrap();
        let state = AppState::with_database(database, Thresholds::default());
        seed_demo_data(&state).unwrap();
        state
    }

    #[test]
    fn test_uninitialized_state() {
        let state = AppState::default();
        assert!(matches!(
            get_user(&state, "MGR-99"),
            Err(CommandError::NotInitialized)
        ));
    }

    #[test]
    fn test_login_success() {
        let state = seeded_state();
        let response = login(&state, "manager@healthcorp.com", "password123").unwrap();

        assert_eq!(response.user.id, "MGR-99");
        assert_eq!(response.user.role, UserRole::Manager);
        assert!(response.token.starts_with("mock-jwt-MGR-99-"));
    }

    #[test]
    fn test_login_failures() {
        let state = seeded_state();
        assert!(matches!(
            login(&state, "manager@healthcorp.com", "wrong"),
            Err(CommandError::InvalidCredentials)
        ));
        assert!(matches!(
            login(&state, "nobody@healthcorp.com", "password123"),
            Err(CommandError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_get_user_not_found() {
        let state = seeded_state();
        assert_eq!(get_user(&state, "REP-02").unwrap().name, "Lisa Davis");
        assert!(matches!(
            get_user(&state, "REP-99"),
            Err(CommandError::UserNotFound(_))
        ));
    }

    #[test]
    fn test_create_user_and_team() {
        let state = seeded_state();
        let profile = create_user(
            &state,
            NewUser {
                username: "jdoe".to_string(),
                email: "jdoe@healthcorp.com".to_string(),
                password: "secret".to_string(),
                name: "Jane Doe".to_string(),
                role: UserRole::Rep,
                manager_id: Some("MGR-99".to_string()),
            },
        )
        .unwrap();
        assert!(profile.id.starts_with("USR-"));

        let team = get_team_members(&state, "MGR-99").unwrap();
        assert_eq!(team.len(), 4);
        assert!(team.iter().any(|u| u.name == "Jane Doe"));

        let duplicate = create_user(
            &state,
            NewUser {
                username: "dup".to_string(),
                email: "JDOE@healthcorp.com".to_string(),
                password: "x".to_string(),
                name: "Dup".to_string(),
                role: UserRole::Rep,
                manager_id: None,
            },
        );
        assert!(matches!(duplicate, Err(CommandError::InvalidInput(_))));
    }

    #[test]
    fn test_registered_user_can_log_in_and_usernames_are_unique() {
        let state = seeded_state();
        create_user(
            &state,
            NewUser {
                username: "kchen".to_string(),
                email: " kchen@healthcorp.com".to_string(),
                password: "secret".to_string(),
                name: "Kim Chen".to_string(),
                role: UserRole::Rep,
                manager_id: Some("MGR-99".to_string()),
            },
        )
        .unwrap();

        let response = login(&state, "kchen@healthcorp.com", "secret").unwrap();
        assert_eq!(response.user.name, "Kim Chen");

        let taken = create_user(
            &state,
            NewUser {
                username: "ldavis".to_string(),
                email: "lisa.d@healthcorp.com".to_string(),
                password: "x".to_string(),
                name: "Lisa D".to_string(),
                role: UserRole::Rep,
                manager_id: None,
            },
        );
        assert!(matches!(taken, Err(CommandError::InvalidInput(msg)) if msg.contains("ldavis")));
    }

    #[test]
    fn test_get_reports_requires_filter() {
        let state = seeded_state();
        assert!(matches!(
            get_reports(&state, &ReportQuery::default()),
            Err(CommandError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_get_reports_enriched() {
        let state = seeded_state();
        let reports = get_reports(
            &state,
            &ReportQuery {
                manager_id: None,
                reportee_id: Some("REP-01".to_string()),
            },
        )
        .unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].reportee_name.as_deref(), Some("Michael Johnson"));
        assert_eq!(reports[0].manager_name.as_deref(), Some("Sarah Johnson"));
        assert_eq!(reports[0].performance_score, Some(89));
    }

    #[test]
    fn test_create_report_validates_users() {
        let state = seeded_state();

        let missing_rep = create_report(
            &state,
            NewReport {
                reportee_id: "REP-77".to_string(),
                manager_id: "MGR-99".to_string(),
                date_started: None,
                kpi_data: None,
            },
        );
        assert!(matches!(missing_rep, Err(CommandError::UserNotFound(id)) if id == "REP-77"));

        let not_manager = create_report(
            &state,
            NewReport {
                reportee_id: "REP-02".to_string(),
                manager_id: "REP-01".to_string(),
                date_started: None,
                kpi_data: None,
            },
        );
        assert!(matches!(not_manager, Err(CommandError::InvalidInput(_))));

        let created = create_report(
            &state,
            NewReport {
                reportee_id: "REP-02".to_string(),
                manager_id: "MGR-99".to_string(),
                date_started: Some("2025-02-01T00:00:00Z".to_string()),
                kpi_data: None,
            },
        )
        .unwrap();
        assert_eq!(created.reportee_name.as_deref(), Some("Lisa Davis"));
        assert!(created.performance_score.is_none());
    }

    #[test]
    fn test_update_report_feedback_and_completion() {
        let state = seeded_state();
        let detail = update_report(
            &state,
            "RPT-1002",
            ReportUpdate {
                feedback: Some("Excellent quarter".to_string()),
                status: Some(ReportStatus::Completed),
                kpi_data: None,
            },
        )
        .unwrap();

        assert_eq!(detail.report.status, ReportStatus::Completed);
        assert!(detail.report.date_completed.is_some());
        assert_eq!(detail.report.feedback.as_deref(), Some("Excellent quarter"));

        assert!(matches!(
            update_report(&state, "RPT-0", ReportUpdate::default()),
            Err(CommandError::ReportNotFound(_))
        ));
    }

    #[test]
    fn test_record_kpi_metric_updates_current_snapshot() {
        let state = seeded_state();
        let snapshot = KpiSnapshot::new(30_000.0, 80, 12, 0.1);

        record_kpi_metric(&state, "RPT-1002", snapshot, "2025-02").unwrap();

        let history = get_kpi_history(&state, "RPT-1002").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].snapshot, snapshot);
        assert_eq!(get_report(&state, "RPT-1002").unwrap().report.kpi_data, Some(snapshot));

        assert!(matches!(
            record_kpi_metric(&state, "RPT-1002", snapshot, "  "),
            Err(CommandError::InvalidInput(_))
        ));
        assert!(matches!(
            get_kpi_history(&state, "RPT-404"),
            Err(CommandError::ReportNotFound(_))
        ));
    }

    #[test]
    fn test_analyze_report_persists_recommendations() {
        let state = seeded_state();
        let summary = analyze_report(&state, "RPT-1001").unwrap();

        assert_eq!(summary.recommendations.len(), 2);
        assert_eq!(summary.pending_count, 2);
        assert_eq!(summary.recommendations[0].id, "rec-RPT-1001-1");

        let stored = get_report_recommendations(&state, "RPT-1001").unwrap();
        assert_eq!(stored.recommendations, summary.recommendations);
    }

    #[test]
    fn test_analyze_report_without_kpis() {
        let state = seeded_state();
        let created = create_report(
            &state,
            NewReport {
                reportee_id: "REP-03".to_string(),
                manager_id: "MGR-99".to_string(),
                date_started: None,
                kpi_data: None,
            },
        )
        .unwrap();

        assert!(matches!(
            analyze_report(&state, &created.report.id),
            Err(CommandError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_recommendation_decisions() {
        let state = seeded_state();
        analyze_report(&state, "RPT-1001").unwrap();

        let accepted =
            update_recommendation_status(&state, "rec-RPT-1001-1", RecommendationStatus::Accepted)
                .unwrap();
        assert_eq!(accepted.status, RecommendationStatus::Accepted);

        assert!(matches!(
            update_recommendation_status(&state, "rec-RPT-1001-1", RecommendationStatus::Ignored),
            Err(CommandError::InvalidTransition(_))
        ));
        assert!(matches!(
            update_recommendation_status(&state, "rec-missing", RecommendationStatus::Ignored),
            Err(CommandError::RecommendationNotFound(_))
        ));

        // Re-analysis keeps the decision
        let summary = analyze_report(&state, "RPT-1001").unwrap();
        assert_eq!(summary.pending_count, 1);
        let first = summary
            .recommendations
            .iter()
            .find(|r| r.id == "rec-RPT-1001-1")
            .unwrap();
        assert_eq!(first.status, RecommendationStatus::Accepted);
    }

    #[test]
    fn test_reanalysis_follows_new_kpis() {
        let state = seeded_state();
        analyze_report(&state, "RPT-1001").unwrap();

        let latest = KpiSnapshot::new(30_000.0, 127, 24, 0.05);
        record_kpi_metric(&state, "RPT-1001", latest, "2025-02").unwrap();
        let summary = analyze_report(&state, "RPT-1001").unwrap();

        let expected = generate_recommendations_with(&latest, "RPT-1001", &state.thresholds);
        assert_eq!(summary.recommendations.len(), expected.len());
        for fresh in &expected {
            let stored = summary
                .recommendations
                .iter()
                .find(|r| r.id == fresh.id)
                .unwrap();
            assert!(stored.same_content(fresh), "stale text for {}", fresh.id);
        }

        let conversion = summary
            .recommendations
            .iter()
            .find(|r| r.id == "rec-RPT-1001-1")
            .unwrap();
        assert_eq!(conversion.reason, "Conversion rate of 5.0% is below target (17%)");
    }

    #[test]
    fn test_reanalysis_keeps_decided_text() {
        let state = seeded_state();
        analyze_report(&state, "RPT-1001").unwrap();
        update_recommendation_status(&state, "rec-RPT-1001-1", RecommendationStatus::Accepted)
            .unwrap();

        record_kpi_metric(
            &state,
            "RPT-1001",
            KpiSnapshot::new(45_200.0, 127, 24, 0.05),
            "2025-02",
        )
        .unwrap();
        let summary = analyze_report(&state, "RPT-1001").unwrap();

        let conversion = summary
            .recommendations
            .iter()
            .find(|r| r.id == "rec-RPT-1001-1")
            .unwrap();
        assert_eq!(conversion.status, RecommendationStatus::Accepted);
        assert_eq!(conversion.reason, "Conversion rate of 12.0% is below target (17%)");
    }

    #[test]
    fn test_dashboard_summary() {
        let state = seeded_state();
        analyze_report(&state, "RPT-1001").unwrap();

        let stats = get_dashboard_summary(&state, "MGR-99").unwrap();
        assert_eq!(
            stats,
            QuickStats {
                active_reports: 3,
                avg_performance: 96,
                recommendations: 2,
                needs_attention: 1,
            }
        );

        let empty = get_dashboard_summary(&state, "MGR-00").unwrap();
        assert_eq!(empty.active_reports, 0);
        assert_eq!(empty.avg_performance, 0);
    }

    #[test]
    fn test_team_recommendations_preview() {
        let state = seeded_state();
        let team = get_team_recommendations(&state, "MGR-99").unwrap();

        assert_eq!(team.reports.len(), 3);
        assert_eq!(team.reports_flagged, 1);
        // Preview does not persist anything
        assert!(get_report_recommendations(&state, "RPT-1001")
            .unwrap()
            .recommendations
            .is_empty());
    }

    #[test]
    fn test_analyze_snapshot() {
        let state = AppState::default();
        let analysis = analyze_snapshot(&state, KpiSnapshot::new(40_000.0, 50, 10, 0.20), "adhoc");

        assert_eq!(analysis.recommendations.len(), 2);
        assert_eq!(analysis.score.overall, 68);
        assert_eq!(analysis.rating, PerformanceRating::Fair);
        assert!(analysis.statuses.needs_attention());
        assert_eq!(analysis.trends.sales.direction, TrendDirection::Down);
        assert!((analysis.trends.sales.percentage - 20.0).abs() < 1e-9);
        assert_eq!(analysis.trends.conversion_rate.status, KpiStatus::Positive);
    }

    #[test]
    fn test_export_reports_csv_and_json() {
        let state = seeded_state();
        analyze_report(&state, "RPT-1001").unwrap();
        let dir = std::env::temp_dir();

        let csv_path = export_reports(
            &state,
            "MGR-99",
            ExportFormat::Csv,
            Some(dir.join("repcoach_cmd_export.csv")),
        )
        .unwrap();
        let csv = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(csv.lines().count(), 4);
        assert!(csv.contains("RPT-1001"));

        let json_path = export_reports(
            &state,
            "MGR-99",
            ExportFormat::Json,
            Some(dir.join("repcoach_cmd_export.json")),
        )
        .unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json["total_reports"], 3);
        assert_eq!(json["summary"]["total_pending_recommendations"], 2);

        std::fs::remove_file(&csv_path).ok();
        std::fs::remove_file(&json_path).ok();
    }
}
