//! Human-readable reasons behind an eligibility score.
//!
//! Tiers come from [`crate::core::scoring`] so a reason can never disagree
//! with the points the scorer awarded.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::core::scoring::{DonationGapTier, ProximityTier, ScoreFeatures, HIGH_SUITABILITY_SCORE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XaiReason {
    DonationGapEligible,
    DonationGapModerate,
    RecentlyDonated,
    ProximityNear,
    ProximityLocal,
    AvailableNow,
    HighSuitability,
}

impl XaiReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            XaiReason::DonationGapEligible => "Eligible by donation gap (90+ days)",
            XaiReason::DonationGapModerate => "Donation gap moderate (60–90 days)",
            XaiReason::RecentlyDonated => "Recently donated – check eligibility",
            XaiReason::ProximityNear => "Proximity match – within 5 km",
            XaiReason::ProximityLocal => "Within 15 km",
            XaiReason::AvailableNow => "Marked available now",
            XaiReason::HighSuitability => "High suitability score",
        }
    }
}

impl fmt::Display for XaiReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for XaiReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Explain a score in a fixed order: donation gap, proximity (only within
/// 15 km), availability, high suitability (only at 80+).
pub fn explain_score(features: &ScoreFeatures, eligibility_score: u8) -> Vec<XaiReason> {
    let mut reasons = Vec::with_capacity(4);

    reasons.push(match DonationGapTier::from_days(features.days_since_last_donation) {
        DonationGapTier::Full => XaiReason::DonationGapEligible,
        DonationGapTier::Moderate => XaiReason::DonationGapModerate,
        DonationGapTier::Recent => XaiReason::RecentlyDonated,
    });

    match ProximityTier::from_distance(features.distance_km) {
        ProximityTier::Near => reasons.push(XaiReason::ProximityNear),
        ProximityTier::Local => reasons.push(XaiReason::ProximityLocal),
        ProximityTier::Distant => {}
    }

    if features.is_available_now {
        reasons.push(XaiReason::AvailableNow);
    }

    if eligibility_score >= HIGH_SUITABILITY_SCORE {
        reasons.push(XaiReason::HighSuitability);
    }

    reasons
}
