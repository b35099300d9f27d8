//! Recommendation types
//!
//! Data structures for coaching recommendations and their review status.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of coaching intervention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    /// Structured training course or workshop
    Training,
    /// Pairing with a top performer
    Mentoring,
    /// Manager review of recent activity
    Review,
}

impl RecommendationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Training => "training",
            Self::Mentoring => "mentoring",
            Self::Review => "review",
        }
    }
}

impl std::str::FromStr for RecommendationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "training" => Ok(Self::Training),
            "mentoring" => Ok(Self::Mentoring),
            "review" => Ok(Self::Review),
            other => Err(format!("Unknown recommendation type: {}", other)),
        }
    }
}

/// Urgency of a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationPriority {
    High,
    Medium,
    Low,
}

impl RecommendationPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Sort rank (lower = more urgent)
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

impl std::str::FromStr for RecommendationPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(format!("Unknown recommendation priority: {}", other)),
        }
    }
}

/// Manager decision on a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationStatus {
    Pending,
    Accepted,
    Ignored,
}

/// Rejected status change
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot move recommendation from {from} to {to}")]
pub struct InvalidTransition {
    pub from: &'static str,
    pub to: &'static str,
}

impl RecommendationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Ignored => "ignored",
        }
    }

    /// Validate a status change
    ///
    /// Only pending recommendations can be decided, and a decision is final.
    pub fn transition(self, to: RecommendationStatus) -> Result<RecommendationStatus, InvalidTransition> {
        match (self, to) {
            (Self::Pending, Self::Accepted) | (Self::Pending, Self::Ignored) => Ok(to),
            _ => Err(InvalidTransition {
                from: self.as_str(),
                to: to.as_str(),
            }),
        }
    }
}

impl std::str::FromStr for RecommendationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "ignored" => Ok(Self::Ignored),
            other => Err(format!("Unknown recommendation status: {}", other)),
        }
    }
}

/// A single coaching recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// `rec-<report id>-<rule number>`
    pub id: String,
    /// Short title for the recommendation
    pub title: String,
    /// What the intervention involves
    pub description: String,
    /// Which KPI evidence triggered it
    pub reason: String,
    #[serde(rename = "type")]
    pub rec_type: RecommendationType,
    pub priority: RecommendationPriority,
    pub status: RecommendationStatus,
}

impl Recommendation {
    /// Create a new pending recommendation
    pub fn new(
        id: String,
        title: &str,
        description: &str,
        reason: String,
        rec_type: RecommendationType,
        priority: RecommendationPriority,
    ) -> Self {
        Self {
            id,
            title: title.to_string(),
            description: description.to_string(),
            reason,
            rec_type,
            priority,
            status: RecommendationStatus::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RecommendationStatus::Pending
    }

    /// Content equality, ignoring id and status
    pub fn same_content(&self, other: &Recommendation) -> bool {
        self.title == other.title
            && self.description == other.description
            && self.reason == other.reason
            && self.rec_type == other.rec_type
            && self.priority == other.priority
    }
}

/// Recommendations for one report with headline counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationSummary {
    /// Recommendations sorted by priority (evaluation order within a priority)
    pub recommendations: Vec<Recommendation>,
    /// Report analyzed (None if aggregate)
    pub report_id: Option<String>,
    /// Recommendations still awaiting a decision
    pub pending_count: u32,
    /// High priority recommendations still pending
    pub high_priority_count: u32,
    /// Most urgent pending recommendation (if any)
    pub top_priority: Option<Recommendation>,
}

impl RecommendationSummary {
    /// Create a new summary from a list of recommendations
    pub fn from_recommendations(
        mut recommendations: Vec<Recommendation>,
        report_id: Option<String>,
    ) -> Self {
        // Stable sort keeps rule order within a priority
        recommendations.sort_by_key(|r| r.priority.rank());

        let pending_count = recommendations.iter().filter(|r| r.is_pending()).count() as u32;

        let high_priority_count = recommendations
            .iter()
            .filter(|r| r.is_pending() && r.priority == RecommendationPriority::High)
            .count() as u32;

        let top_priority = recommendations.iter().find(|r| r.is_pending()).cloned();

        Self {
            recommendations,
            report_id,
            pending_count,
            high_priority_count,
            top_priority,
        }
    }

    /// Keep only recommendations of the given types
    pub fn with_types(mut self, types: &[RecommendationType]) -> Self {
        self.recommendations.retain(|r| types.contains(&r.rec_type));
        Self::from_recommendations(self.recommendations, self.report_id)
    }

    /// Keep only pending recommendations
    pub fn pending_only(mut self) -> Self {
        self.recommendations.retain(|r| r.is_pending());
        Self::from_recommendations(self.recommendations, self.report_id)
    }

    /// Limit to top N recommendations
    pub fn limit(mut self, n: usize) -> Self {
        self.recommendations.truncate(n);
        Self::from_recommendations(self.recommendations, self.report_id)
    }
}

/// Per-report summaries for a team plus totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRecommendations {
    pub reports: Vec<RecommendationSummary>,
    pub total_recommendations: u32,
    pub total_high_priority: u32,
    /// Reports with at least one recommendation
    pub reports_flagged: u32,
}

impl TeamRecommendations {
    pub fn from_summaries(reports: Vec<RecommendationSummary>) -> Self {
        let total_recommendations = reports.iter().map(|s| s.recommendations.len() as u32).sum();
        let total_high_priority = reports.iter().map(|s| s.high_priority_count).sum();
        let reports_flagged = reports
            .iter()
            .filter(|s| !s.recommendations.is_empty())
            .count() as u32;

        Self {
            reports,
            total_recommendations,
            total_high_priority,
            reports_flagged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, priority: RecommendationPriority) -> Recommendation {
        Recommendation::new(
            id.to_string(),
            "Title",
            "Description",
            "Reason".to_string(),
            RecommendationType::Training,
            priority,
        )
    }

    #[test]
    fn test_recommendation_type_names() {
        assert_eq!(RecommendationType::Mentoring.as_str(), "mentoring");
        assert_eq!("REVIEW".parse::<RecommendationType>().unwrap(), RecommendationType::Review);
    }

    #[test]
    fn test_recommendation_serializes_type_field() {
        let json = serde_json::to_value(rec("rec-1-1", RecommendationPriority::High)).unwrap();

        assert_eq!(json["type"], "training");
        assert_eq!(json["priority"], "high");
        assert_eq!(json["status"], "pending");
    }

    #[test]
    fn test_pending_transitions() {
        let pending = RecommendationStatus::Pending;
        assert_eq!(
            pending.transition(RecommendationStatus::Accepted),
            Ok(RecommendationStatus::Accepted)
        );
        assert_eq!(
            pending.transition(RecommendationStatus::Ignored),
            Ok(RecommendationStatus::Ignored)
        );
    }

    #[test]
    fn test_decisions_are_final() {
        let err = RecommendationStatus::Accepted
            .transition(RecommendationStatus::Ignored)
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot move recommendation from accepted to ignored");

        assert!(RecommendationStatus::Ignored
            .transition(RecommendationStatus::Pending)
            .is_err());
        assert!(RecommendationStatus::Pending
            .transition(RecommendationStatus::Pending)
            .is_err());
    }

    #[test]
    fn test_summary_sorting_is_stable() {
        let recs = vec![
            rec("a", RecommendationPriority::Medium),
            rec("b", RecommendationPriority::High),
            rec("c", RecommendationPriority::Low),
            rec("d", RecommendationPriority::High),
        ];

        let summary = RecommendationSummary::from_recommendations(recs, None);
        let ids: Vec<&str> = summary.recommendations.iter().map(|r| r.id.as_str()).collect();

        assert_eq!(ids, vec!["b", "d", "a", "c"]);
        assert_eq!(summary.high_priority_count, 2);
        assert_eq!(summary.top_priority.as_ref().unwrap().id, "b");
    }

    #[test]
    fn test_summary_counts_only_pending() {
        let mut accepted = rec("a", RecommendationPriority::High);
        accepted.status = RecommendationStatus::Accepted;
        let recs = vec![accepted, rec("b", RecommendationPriority::Medium)];

        let summary = RecommendationSummary::from_recommendations(recs, Some("RPT-1".to_string()));

        assert_eq!(summary.pending_count, 1);
        assert_eq!(summary.high_priority_count, 0);
        assert_eq!(summary.top_priority.as_ref().unwrap().id, "b");

        let pending = summary.pending_only();
        assert_eq!(pending.recommendations.len(), 1);
    }

    #[test]
    fn test_summary_limit() {
        let recs = vec![
            rec("a", RecommendationPriority::Low),
            rec("b", RecommendationPriority::High),
        ];

        let summary = RecommendationSummary::from_recommendations(recs, None).limit(1);
        assert_eq!(summary.recommendations.len(), 1);
        assert_eq!(summary.recommendations[0].id, "b");
    }

    #[test]
    fn test_same_content_ignores_id() {
        let a = rec("rec-1-1", RecommendationPriority::High);
        let mut b = rec("rec-2-1", RecommendationPriority::High);
        assert!(a.same_content(&b));

        b.reason = "Other".to_string();
        assert!(!a.same_content(&b));
    }
}
