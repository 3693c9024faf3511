use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::MatchError;
use crate::models::domain::{BloodGroup, Coordinate, DonorProfile, MatchQuery, NewBloodRequest, Urgency};

/// Query string for listing donors with their scores
///
/// GET /api/v1/donors?bloodGroup=O%2B&city=mangalore&lat=12.9&lng=74.8&radiusKm=25&availableOnly=true
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListDonorsQuery {
    pub blood_group: Option<BloodGroup>,
    pub city: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: Option<f64>,
    pub radius_km: Option<f64>,
    #[serde(default)]
    pub available_only: bool,
}

impl ListDonorsQuery {
    pub fn origin(&self) -> Result<Option<Coordinate>, MatchError> {
        Coordinate::from_parts(self.lat, self.lng)
    }
}

/// Query string for matching donors to a need
///
/// Either `bloodGroup` or `requestId` must be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MatchDonorsQuery {
    pub request_id: Option<Uuid>,
    pub blood_group: Option<BloodGroup>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: Option<f64>,
    pub radius_km: Option<f64>,
    #[validate(range(min = 1))]
    pub limit: Option<usize>,
}

impl MatchDonorsQuery {
    pub fn to_match_query(&self) -> Result<MatchQuery, MatchError> {
        Ok(MatchQuery {
            blood_group: self.blood_group,
            request_id: self.request_id,
            origin: Coordinate::from_parts(self.lat, self.lng)?,
            radius_km: self.radius_km,
            limit: self.limit,
        })
    }
}

/// Query string naming the requester whose requests to list
///
/// GET /api/v1/requests?requesterId=user-1
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListRequestsQuery {
    #[validate(length(min = 1))]
    pub requester_id: String,
}

/// Query string naming the user whose donor profile to fetch
///
/// GET /api/v1/donors/me?userId=user-1
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DonorOwnerQuery {
    #[validate(length(min = 1))]
    pub user_id: String,
}

/// Request body to create a blood request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBody {
    #[validate(length(min = 1))]
    pub requester_id: String,
    pub blood_group: BloodGroup,
    #[serde(default = "default_units")]
    #[validate(range(min = 1))]
    pub units: u32,
    pub hospital_name: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: Option<f64>,
    pub city: Option<String>,
    #[serde(default)]
    pub urgency: Urgency,
}

fn default_units() -> u32 {
    1
}

impl CreateRequestBody {
    pub fn into_new_request(self) -> Result<NewBloodRequest, MatchError> {
        Ok(NewBloodRequest {
            hospital_location: Coordinate::from_parts(self.lat, self.lng)?,
            requester_id: self.requester_id,
            blood_group: self.blood_group,
            units: self.units,
            hospital_name: self.hospital_name,
            city: self.city,
            urgency: self.urgency,
        })
    }
}

/// Request body to register or update a donor profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertDonorBody {
    #[validate(length(min = 1))]
    pub user_id: String,
    pub name: Option<String>,
    pub blood_group: BloodGroup,
    pub city: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: Option<f64>,
    pub is_available_now: Option<bool>,
    pub last_donation_date: Option<DateTime<Utc>>,
    pub health_summary: Option<String>,
}

impl UpsertDonorBody {
    pub fn into_profile(self) -> Result<DonorProfile, MatchError> {
        Ok(DonorProfile {
            location: Coordinate::from_parts(self.lat, self.lng)?,
            user_id: self.user_id,
            name: self.name,
            blood_group: self.blood_group,
            last_donation_date: self.last_donation_date,
            city: self.city,
            is_available_now: self.is_available_now,
            health_summary: self.health_summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_query_conversion() {
        let query = MatchDonorsQuery {
            blood_group: Some(BloodGroup::OPos),
            lat: Some(12.9),
            lng: Some(74.8),
            radius_km: Some(25.0),
            ..Default::default()
        };
        assert!(query.validate().is_ok());

        let converted = query.to_match_query().unwrap();
        assert_eq!(converted.origin, Some(Coordinate::new_unchecked(12.9, 74.8)));
        assert_eq!(converted.radius_km, Some(25.0));
    }

    #[test]
    fn test_out_of_range_latitude_fails_validation() {
        let query = ListDonorsQuery {
            lat: Some(120.0),
            lng: Some(0.0),
            ..Default::default()
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_create_request_defaults() {
        let body: CreateRequestBody =
            serde_json::from_str(r#"{"requesterId":"seeker-1","bloodGroup":"A+"}"#).unwrap();
        assert_eq!(body.units, 1);
        assert_eq!(body.urgency, Urgency::Normal);

        let request = body.into_new_request().unwrap();
        assert_eq!(request.hospital_location, None);
    }

    #[test]
    fn test_unknown_blood_group_in_body_is_rejected() {
        let result = serde_json::from_str::<UpsertDonorBody>(r#"{"userId":"u","bloodGroup":"Q+"}"#);
        assert!(result.is_err());
    }
}
