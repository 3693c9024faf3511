use thiserror::Error;

/// Errors raised by the matching engine.
///
/// All of these are local and synchronous; nothing here is worth retrying.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Unknown blood group: {0:?}")]
    UnknownBloodGroup(String),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),
}

impl MatchError {
    /// Short machine-readable code used in error payloads
    pub fn code(&self) -> &'static str {
        match self {
            MatchError::InvalidQuery(_) => "invalid_query",
            MatchError::UnknownBloodGroup(_) => "unknown_blood_group",
            MatchError::InvalidCoordinate(_) => "invalid_coordinate",
        }
    }
}
