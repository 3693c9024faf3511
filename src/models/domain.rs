use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::core::distance::haversine_distance;
use crate::core::health::HealthFlag;
use crate::error::MatchError;

/// ABO/Rh blood group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum BloodGroup {
    #[serde(rename = "O-")]
    ONeg,
    #[serde(rename = "O+")]
    OPos,
    #[serde(rename = "A-")]
    ANeg,
    #[serde(rename = "A+")]
    APos,
    #[serde(rename = "B-")]
    BNeg,
    #[serde(rename = "B+")]
    BPos,
    #[serde(rename = "AB-")]
    AbNeg,
    #[serde(rename = "AB+")]
    AbPos,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::ONeg,
        BloodGroup::OPos,
        BloodGroup::ANeg,
        BloodGroup::APos,
        BloodGroup::BNeg,
        BloodGroup::BPos,
        BloodGroup::AbNeg,
        BloodGroup::AbPos,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BloodGroup::ONeg => "O-",
            BloodGroup::OPos => "O+",
            BloodGroup::ANeg => "A-",
            BloodGroup::APos => "A+",
            BloodGroup::BNeg => "B-",
            BloodGroup::BPos => "B+",
            BloodGroup::AbNeg => "AB-",
            BloodGroup::AbPos => "AB+",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodGroup {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let leading_trimmed = s.trim_start();
        let trimmed = leading_trimmed.trim_end();

        // Query strings decode '+' as a space, so "O+" can arrive as "O ".
        let canonical = if trimmed.len() < leading_trimmed.len()
            && !trimmed.is_empty()
            && !trimmed.ends_with(|c| c == '+' || c == '-')
        {
            format!("{}+", trimmed)
        } else {
            trimmed.to_string()
        };

        match canonical.to_ascii_uppercase().as_str() {
            "O-" => Ok(BloodGroup::ONeg),
            "O+" => Ok(BloodGroup::OPos),
            "A-" => Ok(BloodGroup::ANeg),
            "A+" => Ok(BloodGroup::APos),
            "B-" => Ok(BloodGroup::BNeg),
            "B+" => Ok(BloodGroup::BPos),
            "AB-" => Ok(BloodGroup::AbNeg),
            "AB+" => Ok(BloodGroup::AbPos),
            _ => Err(MatchError::UnknownBloodGroup(s.to_string())),
        }
    }
}

impl TryFrom<String> for BloodGroup {
    type Error = MatchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Create a validated coordinate.
    ///
    /// Returns `Err(MatchError::InvalidCoordinate)` if either component is
    /// non-finite or out of range.
    pub fn new(lat: f64, lng: f64) -> Result<Self, MatchError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(MatchError::InvalidCoordinate(format!(
                "latitude {} out of range [-90, 90]",
                lat
            )));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(MatchError::InvalidCoordinate(format!(
                "longitude {} out of range [-180, 180]",
                lng
            )));
        }
        Ok(Self { lat, lng })
    }

    /// Create a coordinate without validation. Use with trusted inputs only.
    #[inline]
    pub const fn new_unchecked(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build a coordinate only when both halves are present
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Result<Option<Self>, MatchError> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Self::new(lat, lng).map(Some),
            _ => Ok(None),
        }
    }

    /// Great-circle distance to another coordinate in kilometers
    #[inline]
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        haversine_distance(self.lat, self.lng, other.lat, other.lng)
    }
}

/// Donor record handed to the matcher by the storage layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorCandidate {
    pub id: Uuid,
    pub user_id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub blood_group: BloodGroup,
    #[serde(default)]
    pub last_donation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<Coordinate>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub is_available_now: bool,
    #[serde(default)]
    pub health_summary: Option<String>,
}

impl DonorCandidate {
    /// Whole days elapsed since the last donation, `None` if the donor never donated.
    ///
    /// A donation date in the future counts as zero days.
    pub fn days_since_last_donation(&self, now: DateTime<Utc>) -> Option<u32> {
        self.last_donation_date.map(|last| {
            let days = (now - last).num_days().max(0);
            u32::try_from(days).unwrap_or(u32::MAX)
        })
    }
}

/// Donor registration/update payload keyed by user id
///
/// `None` for availability, last donation date or health summary keeps the
/// stored value on update.
#[derive(Debug, Clone)]
pub struct DonorProfile {
    pub user_id: String,
    pub name: Option<String>,
    pub blood_group: BloodGroup,
    pub last_donation_date: Option<DateTime<Utc>>,
    pub location: Option<Coordinate>,
    pub city: Option<String>,
    pub is_available_now: Option<bool>,
    pub health_summary: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    #[default]
    Normal,
    Urgent,
    Sos,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Normal => "normal",
            Urgency::Urgent => "urgent",
            Urgency::Sos => "sos",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "normal" => Some(Urgency::Normal),
            "urgent" => Some(Urgency::Urgent),
            "sos" => Some(Urgency::Sos),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Open,
    Matched,
    Closed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Open => "open",
            RequestStatus::Matched => "matched",
            RequestStatus::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(RequestStatus::Open),
            "matched" => Some(RequestStatus::Matched),
            "closed" => Some(RequestStatus::Closed),
            _ => None,
        }
    }
}

/// A pending blood request raised by a requester
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodRequest {
    pub id: Uuid,
    pub requester_id: String,
    pub blood_group: BloodGroup,
    pub units: u32,
    #[serde(default)]
    pub hospital_name: Option<String>,
    #[serde(default)]
    pub hospital_location: Option<Coordinate>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to create a blood request
#[derive(Debug, Clone)]
pub struct NewBloodRequest {
    pub requester_id: String,
    pub blood_group: BloodGroup,
    pub units: u32,
    pub hospital_name: Option<String>,
    pub hospital_location: Option<Coordinate>,
    pub city: Option<String>,
    pub urgency: Urgency,
}

/// Matching query as received from the caller
#[derive(Debug, Clone, Default)]
pub struct MatchQuery {
    pub blood_group: Option<BloodGroup>,
    pub request_id: Option<Uuid>,
    pub origin: Option<Coordinate>,
    pub radius_km: Option<f64>,
    pub limit: Option<usize>,
}

/// Query after the recipient blood group has been resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedQuery {
    pub blood_group: BloodGroup,
    pub origin: Option<Coordinate>,
    /// Effective radius; `<= 0` disables radius filtering
    pub radius_km: f64,
    pub limit: Option<usize>,
}

/// Donor with its eligibility score and explanation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredDonor {
    #[serde(flatten)]
    pub donor: DonorCandidate,
    pub eligibility_score: u8,
    pub xai_reasons: Vec<String>,
    pub health_flags: Vec<HealthFlag>,
    /// Rounded to one decimal, `null` when either side lacks coordinates
    pub distance_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatible_as: Option<BloodGroup>,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Storage-side donor predicates
#[derive(Debug, Clone, Default)]
pub struct DonorFilter {
    /// Empty means any group
    pub blood_groups: Vec<BloodGroup>,
    /// Case-insensitive substring match on city
    pub city_contains: Option<String>,
    pub available_only: bool,
    /// Coarse location prefilter; donors without coordinates never match
    pub within: Option<BoundingBox>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_blood_group_parse_canonical() {
        for group in BloodGroup::ALL {
            assert_eq!(group.as_str().parse::<BloodGroup>().unwrap(), group);
        }
        assert_eq!("ab+".parse::<BloodGroup>().unwrap(), BloodGroup::AbPos);
        assert_eq!("  o- ".parse::<BloodGroup>().unwrap(), BloodGroup::ONeg);
    }

    #[test]
    fn test_blood_group_parse_decoded_plus() {
        assert_eq!("O ".parse::<BloodGroup>().unwrap(), BloodGroup::OPos);
        assert_eq!("AB ".parse::<BloodGroup>().unwrap(), BloodGroup::AbPos);
    }

    #[test]
    fn test_blood_group_rejects_unknown() {
        for bad in ["", " ", "O", "C+", "A+B", "ABO"] {
            assert!(
                matches!(bad.parse::<BloodGroup>(), Err(MatchError::UnknownBloodGroup(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_blood_group_serde() {
        let json = serde_json::to_string(&BloodGroup::AbNeg).unwrap();
        assert_eq!(json, "\"AB-\"");
        let parsed: BloodGroup = serde_json::from_str("\"B+\"").unwrap();
        assert_eq!(parsed, BloodGroup::BPos);
        assert!(serde_json::from_str::<BloodGroup>("\"Z+\"").is_err());
    }

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinate::new(12.9, 74.8).is_ok());
        assert!(Coordinate::new(91.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_coordinate_from_parts() {
        assert_eq!(Coordinate::from_parts(Some(1.0), None).unwrap(), None);
        assert_eq!(
            Coordinate::from_parts(Some(1.0), Some(2.0)).unwrap(),
            Some(Coordinate::new_unchecked(1.0, 2.0))
        );
    }

    #[test]
    fn test_days_since_last_donation() {
        let now = Utc::now();
        let mut donor = DonorCandidate {
            id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            name: None,
            blood_group: BloodGroup::OPos,
            last_donation_date: None,
            location: None,
            city: None,
            is_available_now: true,
            health_summary: None,
        };
        assert_eq!(donor.days_since_last_donation(now), None);

        donor.last_donation_date = Some(now - Duration::days(120) - Duration::hours(5));
        assert_eq!(donor.days_since_last_donation(now), Some(120));

        donor.last_donation_date = Some(now + Duration::days(3));
        assert_eq!(donor.days_since_last_donation(now), Some(0));
    }
}
