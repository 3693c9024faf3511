use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{BloodRequest, DonorCandidate, DonorFilter, DonorProfile, NewBloodRequest};

/// Errors that can occur in the storage layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// Storage collaborator that supplies donor pools and pending requests.
///
/// The matcher never calls this itself; routes fetch the data and hand the
/// matcher fully materialized values.
#[async_trait]
pub trait DonorStore: Send + Sync {
    /// Donors satisfying every predicate in `filter`
    async fn find_donors(&self, filter: &DonorFilter) -> Result<Vec<DonorCandidate>, StoreError>;

    /// A blood request by id, `None` if it does not exist
    async fn find_request(&self, id: Uuid) -> Result<Option<BloodRequest>, StoreError>;

    async fn create_request(&self, request: NewBloodRequest) -> Result<BloodRequest, StoreError>;

    /// Requests raised by `requester_id`, newest first
    async fn list_requests(&self, requester_id: &str) -> Result<Vec<BloodRequest>, StoreError>;

    /// The donor profile owned by `user_id`, if one was registered
    async fn find_donor_by_user(&self, user_id: &str) -> Result<Option<DonorCandidate>, StoreError>;

    /// Insert or update the donor profile owned by `profile.user_id`
    async fn upsert_donor(&self, profile: DonorProfile) -> Result<DonorCandidate, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
