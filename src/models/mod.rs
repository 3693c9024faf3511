// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BloodGroup, BloodRequest, BoundingBox, Coordinate, DonorCandidate, DonorFilter, DonorProfile, MatchQuery,
    NewBloodRequest, RequestStatus, ResolvedQuery, ScoredDonor, Urgency,
};
pub use requests::{
    CreateRequestBody, DonorOwnerQuery, ListDonorsQuery, ListRequestsQuery, MatchDonorsQuery, UpsertDonorBody,
};
pub use responses::{ErrorResponse, HealthResponse, MatchDonorsResponse, OwnDonorResponse};
