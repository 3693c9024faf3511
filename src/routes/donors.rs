use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use validator::Validate;

use crate::core::distance::calculate_bounding_box;
use crate::models::{DonorFilter, DonorOwnerQuery, ListDonorsQuery, OwnDonorResponse, UpsertDonorBody};
use crate::routes::{bad_request, internal_error, validation_failed, AppState};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/donors", web::get().to(list_donors))
        .route("/donors", web::post().to(upsert_donor))
        .route("/donors/me", web::get().to(own_donor));
}

/// List donors with their eligibility scores
///
/// GET /api/v1/donors?bloodGroup=O%2B&city=mangalore&lat=12.9&lng=74.8&radiusKm=25&availableOnly=true
///
/// No compatibility filtering: `bloodGroup` is an exact match.
async fn list_donors(state: web::Data<AppState>, query: web::Query<ListDonorsQuery>) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_failed(&errors);
    }

    let origin = match query.origin() {
        Ok(origin) => origin,
        Err(e) => return bad_request(&e),
    };
    let radius_km = query.radius_km.unwrap_or(state.matcher.default_radius_km());

    let filter = DonorFilter {
        blood_groups: query.blood_group.into_iter().collect(),
        city_contains: query.city.clone().filter(|c| !c.trim().is_empty()),
        available_only: query.available_only,
        within: origin
            .filter(|_| radius_km > 0.0)
            .map(|o| calculate_bounding_box(o.lat, o.lng, radius_km)),
    };

    let donors = match state.store.find_donors(&filter).await {
        Ok(donors) => donors,
        Err(e) => {
            tracing::error!("Failed to fetch donors: {}", e);
            return internal_error("Failed to fetch donors", &e);
        }
    };

    let fetched = donors.len();
    let scored = state
        .matcher
        .score_donors(origin, Some(radius_km), donors, Utc::now());

    tracing::info!("Listing {} donors (from {} fetched)", scored.len(), fetched);

    HttpResponse::Ok().json(scored)
}

/// Register or update a donor profile
///
/// POST /api/v1/donors
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "bloodGroup": "O+",
///   "city": "Mangaluru",
///   "lat": 12.9,
///   "lng": 74.8,
///   "isAvailableNow": true,
///   "lastDonationDate": "2025-01-31T00:00:00Z",
///   "healthSummary": "string"
/// }
/// ```
async fn upsert_donor(state: web::Data<AppState>, body: web::Json<UpsertDonorBody>) -> impl Responder {
    if let Err(errors) = body.validate() {
        return validation_failed(&errors);
    }

    let profile = match body.into_inner().into_profile() {
        Ok(profile) => profile,
        Err(e) => return bad_request(&e),
    };

    match state.store.upsert_donor(profile).await {
        Ok(donor) => {
            tracing::info!("Saved donor profile {} ({})", donor.id, donor.blood_group);
            HttpResponse::Ok().json(donor)
        }
        Err(e) => {
            tracing::error!("Failed to save donor profile: {}", e);
            internal_error("Failed to save donor profile", &e)
        }
    }
}

/// Fetch the caller's own donor profile
///
/// GET /api/v1/donors/me?userId={userId}
async fn own_donor(state: web::Data<AppState>, query: web::Query<DonorOwnerQuery>) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_failed(&errors);
    }

    match state.store.find_donor_by_user(&query.user_id).await {
        Ok(donor) => HttpResponse::Ok().json(OwnDonorResponse { donor }),
        Err(e) => {
            tracing::error!("Failed to fetch donor profile for {}: {}", query.user_id, e);
            internal_error("Failed to fetch donor profile", &e)
        }
    }
}
