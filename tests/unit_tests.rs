// Unit tests for HemoLink Match

use hemolink_match::core::{
    compatibility::{can_donate, compatible_donors},
    distance::haversine_distance,
    explain::{explain_score, XaiReason},
    health::{classify_health_summary, HealthFlag},
    scoring::{calculate_eligibility_score, ScoreFeatures},
};
use hemolink_match::models::BloodGroup;

fn features(days: Option<u32>, distance: Option<f64>, available: bool, flags: Vec<HealthFlag>) -> ScoreFeatures {
    ScoreFeatures {
        days_since_last_donation: days,
        distance_km: distance,
        is_available_now: available,
        health_flags: flags,
    }
}

#[test]
fn test_haversine_distance_zero() {
    assert_eq!(haversine_distance(12.9, 74.8, 12.9, 74.8), 0.0);
}

#[test]
fn test_haversine_distance_is_symmetric() {
    let there = haversine_distance(12.9, 74.8, 13.0, 74.9);
    let back = haversine_distance(13.0, 74.9, 12.9, 74.8);
    assert_eq!(there, back);
    assert!(there > 0.0 && there < 50.0);
}

#[test]
fn test_haversine_distance_known_route() {
    // Mumbai to Delhi is approximately 1150 km
    let distance = haversine_distance(19.0760, 72.8777, 28.7041, 77.1025);
    assert!((distance - 1150.0).abs() < 25.0, "Expected ~1150km, got {}", distance);
}

#[test]
fn test_compatibility_extremes() {
    assert_eq!(compatible_donors(BloodGroup::AbPos).len(), 8);
    assert_eq!(compatible_donors(BloodGroup::ONeg), &[BloodGroup::ONeg]);
    assert!(!can_donate(BloodGroup::AbPos, BloodGroup::ONeg));
}

#[test]
fn test_classify_spec_examples() {
    assert!(classify_health_summary(None).is_empty());
    assert!(classify_health_summary(Some("")).is_empty());
    assert!(classify_health_summary(Some("I was ill last week")).contains(&HealthFlag::RecentIllness));
    assert!(classify_health_summary(Some("diabetic")).contains(&HealthFlag::Diabetes));

    let both = classify_health_summary(Some("diabetes and fever"));
    assert!(both.contains(&HealthFlag::Diabetes));
    assert!(both.contains(&HealthFlag::RecentIllness));
}

#[test]
fn test_high_beats_low() {
    let high = calculate_eligibility_score(&features(Some(120), Some(2.0), true, vec![]));
    let low = calculate_eligibility_score(&features(
        Some(10),
        Some(50.0),
        false,
        vec![HealthFlag::RecentIllness],
    ));
    assert!(high > low);
    assert_eq!(low, 40);
}

#[test]
fn test_score_bounds() {
    let score = calculate_eligibility_score(&features(Some(100), Some(5.0), true, vec![]));
    assert!(score <= 100);
}

#[test]
fn test_explanation_includes_proximity_when_close() {
    let f = features(Some(90), Some(1.0), true, vec![]);
    let reasons = explain_score(&f, 90);
    assert!(reasons
        .iter()
        .any(|r| r.to_string().to_lowercase().contains("proximity")));
    assert_eq!(reasons.first(), Some(&XaiReason::DonationGapEligible));
}
