use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::distance::is_within_bounding_box;
use crate::models::{BloodRequest, DonorCandidate, DonorFilter, DonorProfile, NewBloodRequest, RequestStatus};
use crate::services::store::{DonorStore, StoreError};

/// In-process store for tests and local runs without a database
#[derive(Default)]
pub struct InMemoryStore {
    donors: RwLock<Vec<DonorCandidate>>,
    requests: RwLock<HashMap<Uuid, BloodRequest>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with donors (kept in insertion order)
    pub fn with_donors(donors: Vec<DonorCandidate>) -> Self {
        Self {
            donors: RwLock::new(donors),
            requests: RwLock::new(HashMap::new()),
        }
    }

    pub async fn insert_request(&self, request: BloodRequest) {
        self.requests.write().await.insert(request.id, request);
    }
}

fn matches_filter(donor: &DonorCandidate, filter: &DonorFilter) -> bool {
    if !filter.blood_groups.is_empty() && !filter.blood_groups.contains(&donor.blood_group) {
        return false;
    }

    if let Some(needle) = &filter.city_contains {
        let needle = needle.to_lowercase();
        match &donor.city {
            Some(city) if city.to_lowercase().contains(&needle) => {}
            _ => return false,
        }
    }

    if filter.available_only && !donor.is_available_now {
        return false;
    }

    if let Some(bbox) = &filter.within {
        match donor.location {
            Some(loc) if is_within_bounding_box(loc.lat, loc.lng, bbox) => {}
            _ => return false,
        }
    }

    true
}

#[async_trait]
impl DonorStore for InMemoryStore {
    async fn find_donors(&self, filter: &DonorFilter) -> Result<Vec<DonorCandidate>, StoreError> {
        let donors = self.donors.read().await;
        Ok(donors.iter().filter(|d| matches_filter(d, filter)).cloned().collect())
    }

    async fn find_request(&self, id: Uuid) -> Result<Option<BloodRequest>, StoreError> {
        Ok(self.requests.read().await.get(&id).cloned())
    }

    async fn create_request(&self, request: NewBloodRequest) -> Result<BloodRequest, StoreError> {
        let created = BloodRequest {
            id: Uuid::new_v4(),
            requester_id: request.requester_id,
            blood_group: request.blood_group,
            units: request.units,
            hospital_name: request.hospital_name,
            hospital_location: request.hospital_location,
            city: request.city,
            urgency: request.urgency,
            status: RequestStatus::Open,
            created_at: Utc::now(),
        };
        self.insert_request(created.clone()).await;
        Ok(created)
    }

    async fn list_requests(&self, requester_id: &str) -> Result<Vec<BloodRequest>, StoreError> {
        let mut requests: Vec<BloodRequest> = self
            .requests
            .read()
            .await
            .values()
            .filter(|r| r.requester_id == requester_id)
            .cloned()
            .collect();

        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(requests)
    }

    async fn find_donor_by_user(&self, user_id: &str) -> Result<Option<DonorCandidate>, StoreError> {
        Ok(self.donors.read().await.iter().find(|d| d.user_id == user_id).cloned())
    }

    async fn upsert_donor(&self, profile: DonorProfile) -> Result<DonorCandidate, StoreError> {
        let mut donors = self.donors.write().await;

        if let Some(existing) = donors.iter_mut().find(|d| d.user_id == profile.user_id) {
            existing.blood_group = profile.blood_group;
            existing.location = profile.location;
            existing.city = profile.city;
            if profile.name.is_some() {
                existing.name = profile.name;
            }
            if let Some(available) = profile.is_available_now {
                existing.is_available_now = available;
            }
            if profile.last_donation_date.is_some() {
                existing.last_donation_date = profile.last_donation_date;
            }
            if profile.health_summary.is_some() {
                existing.health_summary = profile.health_summary;
            }
            return Ok(existing.clone());
        }

        let donor = DonorCandidate {
            id: Uuid::new_v4(),
            user_id: profile.user_id,
            name: profile.name,
            blood_group: profile.blood_group,
            last_donation_date: profile.last_donation_date,
            location: profile.location,
            city: profile.city,
            is_available_now: profile.is_available_now.unwrap_or(false),
            health_summary: profile.health_summary,
        };
        donors.push(donor.clone());
        Ok(donor)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
