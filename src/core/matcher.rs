use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::core::{
    compatibility::compatible_donors,
    distance::round_distance,
    explain::explain_score,
    health::classify_health_summary,
    scoring::{calculate_eligibility_score, ScoreFeatures},
};
use crate::error::MatchError;
use crate::models::{BloodRequest, Coordinate, DonorCandidate, MatchQuery, ResolvedQuery, ScoredDonor};

/// Radius applied when the caller does not supply one
pub const DEFAULT_RADIUS_KM: f64 = 50.0;
pub const DEFAULT_MAX_LIMIT: usize = 100;

/// Result of the matching process
#[derive(Debug)]
pub struct MatchResult {
    pub donors: Vec<ScoredDonor>,
    pub total_candidates: usize,
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Resolve the recipient blood group (directly or from a pending request)
/// 2. Compatibility and availability filtering
/// 3. Per-candidate distance, health flags, score and reasons
/// 4. Radius filtering
/// 5. Ranking by score
///
/// Holds no donor state between calls.
#[derive(Debug, Clone)]
pub struct Matcher {
    default_radius_km: f64,
    max_limit: usize,
}

impl Matcher {
    pub fn new(default_radius_km: f64, max_limit: usize) -> Self {
        Self {
            default_radius_km,
            max_limit,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_RADIUS_KM, DEFAULT_MAX_LIMIT)
    }

    pub fn default_radius_km(&self) -> f64 {
        self.default_radius_km
    }

    /// Work out the effective query.
    ///
    /// A pending request, when supplied, overrides the query's blood group and
    /// origin with its own group and hospital location. Fails with
    /// `InvalidQuery` when no blood group can be resolved.
    pub fn resolve_query(
        &self,
        query: &MatchQuery,
        request: Option<&BloodRequest>,
    ) -> Result<ResolvedQuery, MatchError> {
        let (blood_group, origin) = match request {
            Some(request) => (Some(request.blood_group), request.hospital_location),
            None => (query.blood_group, query.origin),
        };

        let blood_group = blood_group.ok_or_else(|| {
            MatchError::InvalidQuery("bloodGroup or requestId required".to_string())
        })?;

        Ok(ResolvedQuery {
            blood_group,
            origin,
            radius_km: query.radius_km.unwrap_or(self.default_radius_km),
            limit: query.limit.map(|limit| limit.min(self.max_limit)),
        })
    }

    /// Resolve the query and rank the donor pool against it
    pub fn find_matches(
        &self,
        query: &MatchQuery,
        request: Option<&BloodRequest>,
        donors: Vec<DonorCandidate>,
        now: DateTime<Utc>,
    ) -> Result<MatchResult, MatchError> {
        let resolved = self.resolve_query(query, request)?;
        Ok(self.rank_candidates(&resolved, donors, now))
    }

    /// Rank donors for an already-resolved query
    pub fn rank_candidates(
        &self,
        query: &ResolvedQuery,
        donors: Vec<DonorCandidate>,
        now: DateTime<Utc>,
    ) -> MatchResult {
        let total_candidates = donors.len();
        let admissible = compatible_donors(query.blood_group);
        // An active radius also drops donors whose distance is unknown,
        // including every donor when the query has no origin
        let radius = (query.radius_km > 0.0).then_some(query.radius_km);

        let mut ranked: Vec<ScoredDonor> = donors
            .into_iter()
            .filter(|donor| admissible.contains(&donor.blood_group) && donor.is_available_now)
            .map(|donor| {
                let compatible_as = donor.blood_group;
                let mut scored = self.score_donor(donor, query.origin, now);
                scored.compatible_as = Some(compatible_as);
                scored
            })
            .filter(|scored| within_radius(scored.distance_km, radius))
            .collect();

        ranked.sort_by(compare_by_score);

        if let Some(limit) = query.limit {
            ranked.truncate(limit);
        }

        tracing::debug!(
            "Ranked {} of {} candidates for recipient {}",
            ranked.len(),
            total_candidates,
            query.blood_group
        );

        MatchResult {
            donors: ranked,
            total_candidates,
        }
    }

    /// Score an arbitrary donor slice without compatibility or availability
    /// filtering.
    ///
    /// With an origin, donors outside the radius (default when `None`,
    /// disabled when `<= 0`) are dropped and the rest ordered nearest first.
    /// Without an origin the input order is kept and distances are `null`.
    pub fn score_donors(
        &self,
        origin: Option<Coordinate>,
        radius_km: Option<f64>,
        donors: Vec<DonorCandidate>,
        now: DateTime<Utc>,
    ) -> Vec<ScoredDonor> {
        let radius = radius_km.unwrap_or(self.default_radius_km);

        let mut scored: Vec<(Option<f64>, ScoredDonor)> = donors
            .into_iter()
            .map(|donor| {
                let exact = distance_between(origin, donor.location);
                (exact, self.score_donor(donor, origin, now))
            })
            .filter(|(exact, _)| origin.is_none() || radius <= 0.0 || matches!(exact, Some(d) if *d <= radius))
            .collect();

        if origin.is_some() {
            scored.sort_by(|(a, _), (b, _)| compare_distance(*a, *b));
        }

        scored.into_iter().map(|(_, donor)| donor).collect()
    }

    /// Run the per-candidate pipeline: distance, health flags, score, reasons
    pub fn score_donor(
        &self,
        donor: DonorCandidate,
        origin: Option<Coordinate>,
        now: DateTime<Utc>,
    ) -> ScoredDonor {
        let features = ScoreFeatures {
            days_since_last_donation: donor.days_since_last_donation(now),
            distance_km: distance_between(origin, donor.location),
            is_available_now: donor.is_available_now,
            health_flags: classify_health_summary(donor.health_summary.as_deref()),
        };

        let eligibility_score = calculate_eligibility_score(&features);
        let xai_reasons = explain_score(&features, eligibility_score)
            .iter()
            .map(ToString::to_string)
            .collect();

        ScoredDonor {
            donor,
            eligibility_score,
            xai_reasons,
            health_flags: features.health_flags,
            distance_km: features.distance_km.map(round_distance),
            compatible_as: None,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[inline]
fn distance_between(origin: Option<Coordinate>, location: Option<Coordinate>) -> Option<f64> {
    match (origin, location) {
        (Some(origin), Some(location)) => Some(origin.distance_km(&location)),
        _ => None,
    }
}

/// Radius check on the displayed (rounded) distance; unknown distances fail
/// an active radius.
#[inline]
fn within_radius(distance_km: Option<f64>, radius_km: Option<f64>) -> bool {
    match (radius_km, distance_km) {
        (None, _) => true,
        (Some(radius), Some(distance)) => distance <= radius,
        (Some(_), None) => false,
    }
}

/// Known distances first, nearest first
fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Score descending, then distance ascending. Callers use a stable sort so
/// full ties keep their input order.
fn compare_by_score(a: &ScoredDonor, b: &ScoredDonor) -> Ordering {
    b.eligibility_score
        .cmp(&a.eligibility_score)
        .then_with(|| compare_distance(a.distance_km, b.distance_km))
}
