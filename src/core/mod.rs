// Core algorithm exports
pub mod compatibility;
pub mod distance;
pub mod explain;
pub mod health;
pub mod matcher;
pub mod scoring;

pub use compatibility::{can_donate, compatible_donors};
pub use distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box, round_distance};
pub use explain::{explain_score, XaiReason};
pub use health::{classify_health_summary, HealthFlag};
pub use matcher::{MatchResult, Matcher};
pub use scoring::{calculate_eligibility_score, ScoreFeatures};
