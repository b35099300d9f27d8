//! Recommendations module
//!
//! Provides rule-based coaching recommendations for sales reps based on
//! their KPI snapshot.

pub mod engine;
pub mod types;

// Re-export commonly used types
pub use engine::{
    generate_recommendations, generate_recommendations_with, generate_team_recommendations,
    summarize_report,
};
pub use types::{
    InvalidTransition, Recommendation, RecommendationPriority, RecommendationStatus,
    RecommendationSummary, RecommendationType, TeamRecommendations,
};
