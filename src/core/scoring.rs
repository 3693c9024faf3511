use crate::core::health::HealthFlag;

/// Score every candidate starts from
pub const BASE_SCORE: i32 = 50;

/// Minimum safe gap between whole-blood donations
pub const MIN_DONATION_GAP_DAYS: u32 = 90;
pub const MODERATE_DONATION_GAP_DAYS: u32 = 60;

pub const NEAR_DISTANCE_KM: f64 = 5.0;
pub const LOCAL_DISTANCE_KM: f64 = 15.0;

/// Scores at or above this earn the high-suitability reason
pub const HIGH_SUITABILITY_SCORE: u8 = 80;

pub const FULL_GAP_BONUS: i32 = 25;
pub const MODERATE_GAP_BONUS: i32 = 10;
pub const AVAILABLE_BONUS: i32 = 15;
pub const NEAR_BONUS: i32 = 10;
pub const LOCAL_BONUS: i32 = 5;
pub const CLEAN_HEALTH_BONUS: i32 = 5;
pub const HEALTH_FLAG_PENALTY: i32 = 10;

/// Inputs to the eligibility score and its explanation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreFeatures {
    /// `None` when the donor has never donated
    pub days_since_last_donation: Option<u32>,
    /// `None` when either side lacks coordinates
    pub distance_km: Option<f64>,
    pub is_available_now: bool,
    pub health_flags: Vec<HealthFlag>,
}

/// Donation-gap tier shared by the scorer and the explanation generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonationGapTier {
    /// 90+ days, or never donated
    Full,
    /// 60 to 89 days
    Moderate,
    Recent,
}

impl DonationGapTier {
    pub fn from_days(days: Option<u32>) -> Self {
        match days {
            None => DonationGapTier::Full,
            Some(d) if d >= MIN_DONATION_GAP_DAYS => DonationGapTier::Full,
            Some(d) if d >= MODERATE_DONATION_GAP_DAYS => DonationGapTier::Moderate,
            Some(_) => DonationGapTier::Recent,
        }
    }

    pub fn bonus(&self) -> i32 {
        match self {
            DonationGapTier::Full => FULL_GAP_BONUS,
            DonationGapTier::Moderate => MODERATE_GAP_BONUS,
            DonationGapTier::Recent => 0,
        }
    }
}

/// Proximity tier shared by the scorer and the explanation generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProximityTier {
    /// Within 5 km
    Near,
    /// Within 15 km
    Local,
    /// Further away, or distance unknown
    Distant,
}

impl ProximityTier {
    pub fn from_distance(distance_km: Option<f64>) -> Self {
        match distance_km {
            Some(d) if d <= NEAR_DISTANCE_KM => ProximityTier::Near,
            Some(d) if d <= LOCAL_DISTANCE_KM => ProximityTier::Local,
            _ => ProximityTier::Distant,
        }
    }

    pub fn bonus(&self) -> i32 {
        match self {
            ProximityTier::Near => NEAR_BONUS,
            ProximityTier::Local => LOCAL_BONUS,
            ProximityTier::Distant => 0,
        }
    }
}

/// Calculate an eligibility score (0-100) from the donor's features
///
/// Scoring rules, applied to a base of 50:
/// - donation gap: +25 at 90+ days (or never donated), +10 at 60+ days
/// - availability: +15 when available now
/// - proximity: +10 within 5 km, +5 within 15 km
/// - health: +5 with no flags, otherwise -10 per flag
///
/// The result is clamped to `0..=100`.
pub fn calculate_eligibility_score(features: &ScoreFeatures) -> u8 {
    let mut score = BASE_SCORE;

    score += DonationGapTier::from_days(features.days_since_last_donation).bonus();

    if features.is_available_now {
        score += AVAILABLE_BONUS;
    }

    score += ProximityTier::from_distance(features.distance_km).bonus();

    if features.health_flags.is_empty() {
        score += CLEAN_HEALTH_BONUS;
    } else {
        let flags = i32::try_from(features.health_flags.len()).unwrap_or(i32::MAX);
        score = score.saturating_sub(HEALTH_FLAG_PENALTY.saturating_mul(flags));
    }

    score.clamp(0, 100) as u8
}
