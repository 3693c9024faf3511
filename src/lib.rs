//! HemoLink Match - donor matching and eligibility scoring service
//!
//! This library ranks blood donors for a request: blood-type compatibility,
//! great-circle distance, keyword health flags, a fixed weighted eligibility
//! score and the human-readable reasons behind it.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Matcher, MatchResult, distance::haversine_distance};
pub use error::MatchError;
pub use models::{BloodGroup, BloodRequest, Coordinate, DonorCandidate, MatchQuery, ScoredDonor};
