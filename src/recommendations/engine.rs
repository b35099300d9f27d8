//! Recommendation engine
//!
//! Compares a KPI snapshot against the threshold table and emits coaching
//! recommendations. Every rule is evaluated independently, so any subset
//! may fire.

use super::types::{
    Recommendation, RecommendationPriority, RecommendationSummary, RecommendationType,
    TeamRecommendations,
};
use crate::metrics::Thresholds;
use crate::models::KpiSnapshot;

/// Rule numbers, used as the id suffix so a rule's recommendation keeps the
/// same id across runs
mod rules {
    pub const CONVERSION_TRAINING: u8 = 1;
    pub const CALL_QUALITY_REVIEW: u8 = 2;
    pub const PEER_MENTORING: u8 = 3;
    pub const APPOINTMENT_WORKSHOP: u8 = 4;
}

/// Generate recommendations against the default thresholds
pub fn generate_recommendations(snapshot: &KpiSnapshot, report_id: &str) -> Vec<Recommendation> {
    generate_recommendations_with(snapshot, report_id, &Thresholds::default())
}

/// Generate recommendations in rule order
pub fn generate_recommendations_with(
    snapshot: &KpiSnapshot,
    report_id: &str,
    thresholds: &Thresholds,
) -> Vec<Recommendation> {
    let checks = [
        check_conversion_rate(snapshot, report_id, thresholds),
        check_call_quality(snapshot, report_id, thresholds),
        check_sales(snapshot, report_id, thresholds),
        check_appointments(snapshot, report_id, thresholds),
    ];

    let recommendations: Vec<Recommendation> = checks.into_iter().flatten().collect();

    tracing::debug!(
        "Generated {} recommendations for report {}",
        recommendations.len(),
        report_id
    );

    recommendations
}

/// Generate recommendations and wrap them in a summary
pub fn summarize_report(
    snapshot: &KpiSnapshot,
    report_id: &str,
    thresholds: &Thresholds,
) -> RecommendationSummary {
    RecommendationSummary::from_recommendations(
        generate_recommendations_with(snapshot, report_id, thresholds),
        Some(report_id.to_string()),
    )
}

/// Generate per-report summaries for a set of reports
pub fn generate_team_recommendations(
    reports: &[(String, KpiSnapshot)],
    thresholds: &Thresholds,
) -> TeamRecommendations {
    let summaries = reports
        .iter()
        .map(|(report_id, snapshot)| summarize_report(snapshot, report_id, thresholds))
        .collect();

    TeamRecommendations::from_summaries(summaries)
}

fn recommendation_id(report_id: &str, rule: u8) -> String {
    format!("rec-{}-{}", report_id, rule)
}

/// Low conversion rate calls for conversion training
fn check_conversion_rate(
    snapshot: &KpiSnapshot,
    report_id: &str,
    thresholds: &Thresholds,
) -> Option<Recommendation> {
    if snapshot.conversion_rate >= thresholds.conversion_rate.warning {
        return None;
    }

    Some(Recommendation::new(
        recommendation_id(report_id, rules::CONVERSION_TRAINING),
        "Conversion Skills Training",
        "Advanced training on converting prospects to sales",
        format!(
            "Conversion rate of {:.1}% is below target ({}%)",
            round_half_up(snapshot.conversion_rate * 100.0, 1),
            format_percent(thresholds.conversion_rate.target)
        ),
        RecommendationType::Training,
        RecommendationPriority::High,
    ))
}

/// Many calls that rarely convert point at call quality
fn check_call_quality(
    snapshot: &KpiSnapshot,
    report_id: &str,
    thresholds: &Thresholds,
) -> Option<Recommendation> {
    if snapshot.calls as f64 <= thresholds.calls.target
        || snapshot.conversion_rate >= thresholds.call_quality_conversion
    {
        return None;
    }

    Some(Recommendation::new(
        recommendation_id(report_id, rules::CALL_QUALITY_REVIEW),
        "Call Quality Review",
        "Review call recordings and improve communication techniques",
        "High call volume but low conversion suggests quality issues".to_string(),
        RecommendationType::Review,
        RecommendationPriority::High,
    ))
}

/// Sales below the warning floor pairs the rep with a mentor
fn check_sales(
    snapshot: &KpiSnapshot,
    report_id: &str,
    thresholds: &Thresholds,
) -> Option<Recommendation> {
    if snapshot.sales >= thresholds.sales.warning {
        return None;
    }

    Some(Recommendation::new(
        recommendation_id(report_id, rules::PEER_MENTORING),
        "Peer Mentoring Program",
        "Match with top performer for knowledge transfer",
        format!(
            "Sales performance below target (${} vs ${})",
            format_currency(snapshot.sales),
            format_currency(thresholds.sales.target)
        ),
        RecommendationType::Mentoring,
        RecommendationPriority::Medium,
    ))
}

/// Too few appointments booked
fn check_appointments(
    snapshot: &KpiSnapshot,
    report_id: &str,
    thresholds: &Thresholds,
) -> Option<Recommendation> {
    if snapshot.appointments as f64 >= thresholds.appointments.warning {
        return None;
    }

    Some(Recommendation::new(
        recommendation_id(report_id, rules::APPOINTMENT_WORKSHOP),
        "Appointment Setting Workshop",
        "Training on effective appointment scheduling techniques",
        format!(
            "Low appointment count ({} vs target {})",
            snapshot.appointments,
            format_number(thresholds.appointments.target)
        ),
        RecommendationType::Training,
        RecommendationPriority::Medium,
    ))
}

/// Round to `places` decimals with ties going up (12.25 -> 12.3)
fn round_half_up(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor + 0.5).floor() / factor
}

/// Format a dollar amount with thousands separators
///
/// Up to three fraction digits, trailing zeros dropped:
/// 45200 -> "45,200", 45200.5 -> "45,200.5", 1234.567 -> "1,234.567"
pub fn format_currency(amount: f64) -> String {
    let thousandths = (amount.abs() * 1000.0).round() as u64;
    let whole = thousandths / 1000;
    let fraction = thousandths % 1000;

    let mut grouped = String::new();
    let digits = whole.to_string();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && thousandths > 0 { "-" } else { "" };
    if fraction == 0 {
        format!("{}{}", sign, grouped)
    } else {
        let fraction = format!("{:03}", fraction);
        format!("{}{}.{}", sign, grouped, fraction.trim_end_matches('0'))
    }
}

/// Format a fraction as a whole-ish percentage: 0.17 -> "17", 0.175 -> "17.5"
fn format_percent(fraction: f64) -> String {
    format_number(fraction * 100.0)
}

/// Print integral values without a decimal point
fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}
