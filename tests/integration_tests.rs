// Integration tests for HemoLink Match

use chrono::{DateTime, Duration, TimeZone, Utc};
use hemolink_match::core::{distance::haversine_distance, explain::XaiReason, HealthFlag, Matcher};
use hemolink_match::models::{BloodGroup, Coordinate, DonorCandidate, MatchQuery};
use hemolink_match::MatchError;
use uuid::Uuid;

const ORIGIN_LAT: f64 = 12.9;
const ORIGIN_LNG: f64 = 74.8;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

/// Donor due north of the origin at roughly `km` kilometres
fn create_donor(name: &str, group: BloodGroup, km: f64, days_since: Option<i64>) -> DonorCandidate {
    let lat = ORIGIN_LAT + km / 111.195;
    DonorCandidate {
        id: Uuid::new_v4(),
        user_id: name.to_lowercase(),
        name: Some(name.to_string()),
        blood_group: group,
        last_donation_date: days_since.map(|d| now() - Duration::days(d)),
        location: Some(Coordinate::new(lat, ORIGIN_LNG).unwrap()),
        city: Some("Mangaluru".to_string()),
        is_available_now: true,
        health_summary: None,
    }
}

fn query(group: &str, radius_km: Option<f64>) -> MatchQuery {
    MatchQuery {
        blood_group: Some(group.parse().unwrap()),
        origin: Some(Coordinate::new(ORIGIN_LAT, ORIGIN_LNG).unwrap()),
        radius_km,
        ..Default::default()
    }
}

#[test]
fn test_integration_close_healthy_donor() {
    let matcher = Matcher::with_defaults();
    let donor = create_donor("Asha", BloodGroup::OPos, 2.0, Some(120));

    let result = matcher
        .find_matches(&query("O+", Some(25.0)), None, vec![donor], now())
        .unwrap();

    assert_eq!(result.donors.len(), 1);
    let top = &result.donors[0];
    assert!(top.eligibility_score >= 90);
    assert_eq!(top.eligibility_score, 100);
    assert_eq!(top.distance_km, Some(2.0));
    assert!(top.health_flags.is_empty());

    let expected: Vec<String> = [
        XaiReason::DonationGapEligible,
        XaiReason::ProximityNear,
        XaiReason::AvailableNow,
        XaiReason::HighSuitability,
    ]
    .iter()
    .map(|r| r.to_string())
    .collect();
    assert_eq!(top.xai_reasons, expected);
}

#[test]
fn test_integration_recent_fever_at_twenty_km() {
    let matcher = Matcher::with_defaults();
    let mut donor = create_donor("Ravi", BloodGroup::OPos, 20.0, Some(120));
    donor.health_summary = Some("recent fever".to_string());

    let result = matcher
        .find_matches(&query("O+", Some(25.0)), None, vec![donor], now())
        .unwrap();

    let top = &result.donors[0];
    assert_eq!(top.health_flags, vec![HealthFlag::RecentIllness]);
    // 50 + 25 gap + 15 available - 10 illness
    assert_eq!(top.eligibility_score, 80);
    assert!(!top
        .xai_reasons
        .iter()
        .any(|r| r.contains("km")));
    assert!(top
        .xai_reasons
        .contains(&XaiReason::HighSuitability.to_string()));
}

#[test]
fn test_integration_unresolvable_query() {
    let matcher = Matcher::with_defaults();
    let donors = vec![create_donor("Asha", BloodGroup::OPos, 2.0, Some(120))];

    let err = matcher
        .find_matches(&MatchQuery::default(), None, donors, now())
        .unwrap_err();

    assert!(matches!(err, MatchError::InvalidQuery(_)));
}

#[test]
fn test_integration_zero_radius_returns_everyone() {
    let matcher = Matcher::with_defaults();
    let donors = vec![
        create_donor("Near", BloodGroup::ONeg, 1.0, Some(100)),
        create_donor("Far", BloodGroup::OPos, 400.0, Some(100)),
        create_donor("Mismatch", BloodGroup::APos, 1.0, Some(100)),
    ];

    let result = matcher
        .find_matches(&query("O+", Some(0.0)), None, donors, now())
        .unwrap();

    let names: Vec<_> = result
        .donors
        .iter()
        .filter_map(|d| d.donor.name.clone())
        .collect();
    assert_eq!(names, vec!["Near", "Far"]);
    assert_eq!(result.total_candidates, 3);
}

#[test]
fn test_integration_ranking_and_radius() {
    let matcher = Matcher::with_defaults();
    let mut recent = create_donor("Recent", BloodGroup::ONeg, 3.0, Some(10));
    recent.health_summary = Some("on medication for BP".to_string());
    let donors = vec![
        recent,
        create_donor("Local", BloodGroup::ONeg, 12.0, Some(200)),
        create_donor("Outside", BloodGroup::ONeg, 60.0, None),
        create_donor("Best", BloodGroup::ONeg, 1.5, None),
    ];

    let result = matcher
        .find_matches(&query("A-", None), None, donors, now())
        .unwrap();

    let names: Vec<_> = result
        .donors
        .iter()
        .filter_map(|d| d.donor.name.clone())
        .collect();
    // Default radius of 50 km drops "Outside"
    assert_eq!(names, vec!["Best", "Local", "Recent"]);

    for pair in result.donors.windows(2) {
        assert!(pair[0].eligibility_score >= pair[1].eligibility_score);
    }
    assert!(result.donors.iter().all(|d| d.compatible_as == Some(BloodGroup::ONeg)));
}

#[test]
fn test_distance_accuracy() {
    // Mangaluru to Bengaluru is roughly 300 km by air
    let distance = haversine_distance(12.9141, 74.8560, 12.9716, 77.5946);
    assert!((distance - 297.0).abs() < 10.0, "Expected ~297km, got {}", distance);
}

#[test]
fn test_max_limit_enforcement() {
    let matcher = Matcher::new(50.0, 5);
    let donors: Vec<_> = (0..20)
        .map(|i| create_donor(&format!("Donor {}", i), BloodGroup::OPos, i as f64, Some(100)))
        .collect();

    let mut q = query("AB+", None);
    q.limit = Some(50);
    let result = matcher.find_matches(&q, None, donors, now()).unwrap();

    assert_eq!(result.donors.len(), 5);
    assert_eq!(result.total_candidates, 20);
}
