use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::time::Duration;
use uuid::Uuid;

use crate::config::DatabaseSettings;
use crate::models::{
    BloodGroup, BloodRequest, Coordinate, DonorCandidate, DonorFilter, DonorProfile, NewBloodRequest,
    RequestStatus, Urgency,
};
use crate::services::store::{DonorStore, StoreError};

const DONOR_COLUMNS: &str = "id, user_id, name, blood_group, last_donation_date, latitude, longitude, \
     city, is_available_now, health_summary";

const REQUEST_COLUMNS: &str = "id, requester_id, blood_group, units, hospital_name, hospital_latitude, \
     hospital_longitude, city, urgency, status, created_at";

/// PostgreSQL-backed donor and request storage
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        tracing::info!(
            "Connecting to PostgreSQL (max: {}, min: {} connections)",
            settings.max_connections,
            settings.min_connections
        );

        Self::new(
            &settings.url,
            settings.max_connections,
            settings.min_connections,
            Duration::from_secs(settings.acquire_timeout_secs),
            Duration::from_secs(settings.idle_timeout_secs),
        )
        .await
    }
}

#[async_trait]
impl DonorStore for PostgresStore {
    async fn find_donors(&self, filter: &DonorFilter) -> Result<Vec<DonorCandidate>, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM donors WHERE TRUE", DONOR_COLUMNS));

        if !filter.blood_groups.is_empty() {
            let groups: Vec<String> = filter.blood_groups.iter().map(|g| g.as_str().to_string()).collect();
            query.push(" AND blood_group = ANY(").push_bind(groups).push(")");
        }

        if let Some(city) = &filter.city_contains {
            query
                .push(" AND city ILIKE ")
                .push_bind(format!("%{}%", escape_like(city)))
                .push(" ESCAPE '\\'");
        }

        if filter.available_only {
            query.push(" AND is_available_now");
        }

        if let Some(bbox) = &filter.within {
            query
                .push(" AND latitude BETWEEN ")
                .push_bind(bbox.min_lat)
                .push(" AND ")
                .push_bind(bbox.max_lat)
                .push(" AND longitude BETWEEN ")
                .push_bind(bbox.min_lon)
                .push(" AND ")
                .push_bind(bbox.max_lon);
        }

        query.push(" ORDER BY created_at, id");

        let rows = query.build().fetch_all(&self.pool).await?;

        // Rows with an unrecognised blood group are rejected, not defaulted
        let donors: Vec<DonorCandidate> = rows
            .iter()
            .filter_map(|row| match donor_from_row(row) {
                Ok(donor) => Some(donor),
                Err(e) => {
                    tracing::warn!("Skipping donor row: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!("Fetched {} donors ({} rows)", donors.len(), rows.len());

        Ok(donors)
    }

    async fn find_request(&self, id: Uuid) -> Result<Option<BloodRequest>, StoreError> {
        let query = format!("SELECT {} FROM blood_requests WHERE id = $1", REQUEST_COLUMNS);

        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;

        row.as_ref().map(request_from_row).transpose()
    }

    async fn create_request(&self, request: NewBloodRequest) -> Result<BloodRequest, StoreError> {
        let query = format!(
            r#"
            INSERT INTO blood_requests
                (id, requester_id, blood_group, units, hospital_name, hospital_latitude,
                 hospital_longitude, city, urgency, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        );

        let units = i32::try_from(request.units)
            .map_err(|_| StoreError::InvalidRecord(format!("units {} out of range", request.units)))?;

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(&request.requester_id)
            .bind(request.blood_group.as_str())
            .bind(units)
            .bind(&request.hospital_name)
            .bind(request.hospital_location.map(|c| c.lat))
            .bind(request.hospital_location.map(|c| c.lng))
            .bind(&request.city)
            .bind(request.urgency.as_str())
            .bind(RequestStatus::Open.as_str())
            .fetch_one(&self.pool)
            .await?;

        let created = request_from_row(&row)?;

        tracing::info!(
            "Created blood request {} for {} ({} units, {})",
            created.id,
            created.blood_group,
            created.units,
            created.urgency.as_str()
        );

        Ok(created)
    }

    async fn list_requests(&self, requester_id: &str) -> Result<Vec<BloodRequest>, StoreError> {
        let query = format!(
            "SELECT {} FROM blood_requests WHERE requester_id = $1 ORDER BY created_at DESC, id",
            REQUEST_COLUMNS
        );

        let rows = sqlx::query(&query).bind(requester_id).fetch_all(&self.pool).await?;

        let requests: Vec<BloodRequest> = rows
            .iter()
            .filter_map(|row| match request_from_row(row) {
                Ok(request) => Some(request),
                Err(e) => {
                    tracing::warn!("Skipping request row: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!("Fetched {} requests for {}", requests.len(), requester_id);

        Ok(requests)
    }

    async fn find_donor_by_user(&self, user_id: &str) -> Result<Option<DonorCandidate>, StoreError> {
        let query = format!("SELECT {} FROM donors WHERE user_id = $1", DONOR_COLUMNS);

        let row = sqlx::query(&query).bind(user_id).fetch_optional(&self.pool).await?;

        row.as_ref().map(donor_from_row).transpose()
    }

    /// Uses INSERT ... ON CONFLICT on user_id. Availability, last donation
    /// date, health summary and name keep their stored values when absent.
    async fn upsert_donor(&self, profile: DonorProfile) -> Result<DonorCandidate, StoreError> {
        let query = format!(
            r#"
            INSERT INTO donors
                (id, user_id, name, blood_group, last_donation_date, latitude, longitude,
                 city, is_available_now, health_summary)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, FALSE), $10)
            ON CONFLICT (user_id)
            DO UPDATE SET
                name = COALESCE(EXCLUDED.name, donors.name),
                blood_group = EXCLUDED.blood_group,
                last_donation_date = COALESCE(EXCLUDED.last_donation_date, donors.last_donation_date),
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                city = EXCLUDED.city,
                is_available_now = COALESCE($9, donors.is_available_now),
                health_summary = COALESCE(EXCLUDED.health_summary, donors.health_summary),
                updated_at = NOW()
            RETURNING {}
            "#,
            DONOR_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(&profile.user_id)
            .bind(&profile.name)
            .bind(profile.blood_group.as_str())
            .bind(profile.last_donation_date)
            .bind(profile.location.map(|c| c.lat))
            .bind(profile.location.map(|c| c.lng))
            .bind(&profile.city)
            .bind(profile.is_available_now)
            .bind(&profile.health_summary)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!("Upserted donor profile for user {}", profile.user_id);

        donor_from_row(&row)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn donor_from_row(row: &PgRow) -> Result<DonorCandidate, StoreError> {
    let id: Uuid = row.try_get("id")?;
    let raw_group: String = row.try_get("blood_group")?;
    let blood_group: BloodGroup = raw_group
        .parse()
        .map_err(|e| StoreError::InvalidRecord(format!("donor {}: {}", id, e)))?;

    Ok(DonorCandidate {
        id,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        blood_group,
        last_donation_date: row.try_get("last_donation_date")?,
        location: location_from(row.try_get("latitude")?, row.try_get("longitude")?),
        city: row.try_get("city")?,
        is_available_now: row.try_get("is_available_now")?,
        health_summary: row.try_get("health_summary")?,
    })
}

fn request_from_row(row: &PgRow) -> Result<BloodRequest, StoreError> {
    let id: Uuid = row.try_get("id")?;
    let raw_group: String = row.try_get("blood_group")?;
    let blood_group: BloodGroup = raw_group
        .parse()
        .map_err(|e| StoreError::InvalidRecord(format!("request {}: {}", id, e)))?;

    let raw_urgency: String = row.try_get("urgency")?;
    let urgency = Urgency::parse(&raw_urgency)
        .ok_or_else(|| StoreError::InvalidRecord(format!("request {}: urgency {:?}", id, raw_urgency)))?;

    let raw_status: String = row.try_get("status")?;
    let status = RequestStatus::parse(&raw_status)
        .ok_or_else(|| StoreError::InvalidRecord(format!("request {}: status {:?}", id, raw_status)))?;

    let units = units_from(id, row.try_get("units")?)?;

    Ok(BloodRequest {
        id,
        requester_id: row.try_get("requester_id")?,
        blood_group,
        units,
        hospital_name: row.try_get("hospital_name")?,
        hospital_location: location_from(row.try_get("hospital_latitude")?, row.try_get("hospital_longitude")?),
        city: row.try_get("city")?,
        urgency,
        status,
        created_at: row.try_get("created_at")?,
    })
}

fn units_from(id: Uuid, units: i32) -> Result<u32, StoreError> {
    u32::try_from(units)
        .ok()
        .filter(|u| *u >= 1)
        .ok_or_else(|| StoreError::InvalidRecord(format!("request {}: units {}", id, units)))
}

fn location_from(lat: Option<f64>, lng: Option<f64>) -> Option<Coordinate> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => Some(Coordinate::new_unchecked(lat, lng)),
        _ => None,
    }
}

/// Escape LIKE wildcards so the city filter is a literal substring match
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
