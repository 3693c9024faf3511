use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use validator::Validate;

use crate::core::compatible_donors;
use crate::models::{
    CreateRequestBody, DonorFilter, ErrorResponse, ListRequestsQuery, MatchDonorsQuery, MatchDonorsResponse,
};
use crate::routes::{bad_request, internal_error, validation_failed, AppState};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/requests", web::post().to(create_request))
        .route("/requests", web::get().to(list_requests))
        .route("/requests/match", web::get().to(match_donors));
}

/// Create a blood request
///
/// POST /api/v1/requests
///
/// Request body:
/// ```json
/// {
///   "requesterId": "string",
///   "bloodGroup": "A+",
///   "units": 2,
///   "hospitalName": "City Hospital",
///   "lat": 12.9,
///   "lng": 74.8,
///   "city": "Mangaluru",
///   "urgency": "normal|urgent|sos"
/// }
/// ```
async fn create_request(state: web::Data<AppState>, body: web::Json<CreateRequestBody>) -> impl Responder {
    if let Err(errors) = body.validate() {
        return validation_failed(&errors);
    }

    let request = match body.into_inner().into_new_request() {
        Ok(request) => request,
        Err(e) => return bad_request(&e),
    };

    match state.store.create_request(request).await {
        Ok(created) => HttpResponse::Created().json(created),
        Err(e) => {
            tracing::error!("Failed to create blood request: {}", e);
            internal_error("Failed to create blood request", &e)
        }
    }
}

/// List a requester's blood requests, newest first
///
/// GET /api/v1/requests?requesterId={requesterId}
async fn list_requests(state: web::Data<AppState>, query: web::Query<ListRequestsQuery>) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_failed(&errors);
    }

    match state.store.list_requests(&query.requester_id).await {
        Ok(requests) => HttpResponse::Ok().json(requests),
        Err(e) => {
            tracing::error!("Failed to list blood requests for {}: {}", query.requester_id, e);
            internal_error("Failed to list blood requests", &e)
        }
    }
}

/// Rank compatible, available donors for a need
///
/// GET /api/v1/requests/match?bloodGroup=O%2B&lat=12.9&lng=74.8&radiusKm=25
/// GET /api/v1/requests/match?requestId={uuid}
///
/// A referenced request supplies the blood group and hospital location.
async fn match_donors(state: web::Data<AppState>, query: web::Query<MatchDonorsQuery>) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_failed(&errors);
    }

    let match_query = match query.to_match_query() {
        Ok(q) => q,
        Err(e) => return bad_request(&e),
    };

    let request = match match_query.request_id {
        Some(request_id) => match state.store.find_request(request_id).await {
            Ok(Some(request)) => Some(request),
            Ok(None) => {
                return HttpResponse::NotFound().json(ErrorResponse::new(
                    "Request not found",
                    format!("No blood request with id {}", request_id),
                    404,
                ));
            }
            Err(e) => {
                tracing::error!("Failed to fetch blood request {}: {}", request_id, e);
                return internal_error("Failed to fetch blood request", &e);
            }
        },
        None => None,
    };

    // Resolve before touching the donor pool
    let resolved = match state.matcher.resolve_query(&match_query, request.as_ref()) {
        Ok(resolved) => resolved,
        Err(e) => return bad_request(&e),
    };

    let filter = DonorFilter {
        blood_groups: compatible_donors(resolved.blood_group).to_vec(),
        available_only: true,
        ..Default::default()
    };

    let donors = match state.store.find_donors(&filter).await {
        Ok(donors) => donors,
        Err(e) => {
            tracing::error!("Failed to fetch donors for {}: {}", resolved.blood_group, e);
            return internal_error("Failed to fetch donors", &e);
        }
    };

    let result = state.matcher.rank_candidates(&resolved, donors, Utc::now());

    tracing::info!(
        "Returning {} donors for {} (from {} candidates)",
        result.donors.len(),
        resolved.blood_group,
        result.total_candidates
    );

    HttpResponse::Ok().json(MatchDonorsResponse {
        donors: result.donors,
        total_candidates: result.total_candidates,
    })
}
