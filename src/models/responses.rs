use serde::{Deserialize, Serialize};
use crate::models::domain::{DonorCandidate, ScoredDonor};

/// Response for the match endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDonorsResponse {
    pub donors: Vec<ScoredDonor>,
    pub total_candidates: usize,
}

/// Response for the caller's own donor profile, `null` when none is registered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnDonorResponse {
    pub donor: Option<DonorCandidate>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>, status_code: u16) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status_code,
        }
    }
}
