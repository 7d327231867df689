use serde::{Deserialize, Serialize};

/// Maximum award for a demand elasticity guess.
pub const DEMAND_MAX_POINTS: u32 = 2_000;
/// Maximum award for a supply elasticity guess.
pub const SUPPLY_MAX_POINTS: u32 = 2_000;
/// Maximum award for the derived tax incidence guess.
pub const INCIDENCE_MAX_POINTS: u32 = 1_000;
/// Highest total a single combined question can award.
pub const MAX_QUESTION_POINTS: u32 = DEMAND_MAX_POINTS + SUPPLY_MAX_POINTS + INCIDENCE_MAX_POINTS;

/// Decay rate applied to elasticity differences, which live roughly in [0, 5].
pub const ELASTICITY_SCALE_FACTOR: f64 = 2.0;
/// Steeper decay for incidence differences, which live in [0, 1].
pub const INCIDENCE_SCALE_FACTOR: f64 = 10.0;

/// A guess within this distance of the actual value counts as correct in
/// streak scoring.
pub const CORRECT_TOLERANCE: f64 = 0.1;

/// Which scoring philosophy a session runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Right/wrong at the tolerance threshold; score counts correct answers
    /// and feeds the streak counters.
    Binary,
    /// Exponential-decay point awards summed into a running total.
    Continuous,
}

impl ScoringMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Continuous => "continuous",
        }
    }
}

/// Qualitative feedback tier derived from the absolute guess error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyTier {
    Excellent,
    VeryClose,
    GoodTry,
    KeepPracticing,
}

impl AccuracyTier {
    /// Tier for an absolute difference between guess and actual.
    pub fn from_difference(difference: f64) -> Self {
        if difference <= 0.1 {
            Self::Excellent
        } else if difference <= 0.3 {
            Self::VeryClose
        } else if difference <= 0.5 {
            Self::GoodTry
        } else {
            Self::KeepPracticing
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::VeryClose => "Very close",
            Self::GoodTry => "Good try",
            Self::KeepPracticing => "Keep practicing",
        }
    }
}

/// Exponential-decay point award: `round(max_points * e^(-difference * scale))`.
///
/// The award equals `max_points` at a difference of zero and decays
/// monotonically from there; far-off guesses round down to nothing.
pub fn calculate_points(difference: f64, max_points: u32, scale_factor: f64) -> u32 {
    (f64::from(max_points) * (-difference * scale_factor).exp()).round() as u32
}

/// Streak-mode correctness: within [`CORRECT_TOLERANCE`] of the actual value.
pub fn is_correct(guess: f64, actual: f64) -> bool {
    (guess - actual).abs() <= CORRECT_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_points_at_zero_difference() {
        assert_eq!(calculate_points(0.0, 2_000, ELASTICITY_SCALE_FACTOR), 2_000);
        assert_eq!(
            calculate_points(0.0, 1_000, INCIDENCE_SCALE_FACTOR),
            1_000
        );
    }

    #[test]
    fn half_unit_difference_matches_decay_curve() {
        // 2000 * e^-1 = 735.76, rounded.
        assert_eq!(calculate_points(0.5, 2_000, ELASTICITY_SCALE_FACTOR), 736);
    }

    #[test]
    fn points_never_increase_with_difference() {
        let mut previous = calculate_points(0.0, 2_000, ELASTICITY_SCALE_FACTOR);
        for step in 1..=100 {
            let difference = f64::from(step) * 0.05;
            let points = calculate_points(difference, 2_000, ELASTICITY_SCALE_FACTOR);
            assert!(
                points <= previous,
                "points rose from {previous} to {points} at difference {difference}"
            );
            previous = points;
        }
    }

    #[test]
    fn far_off_guesses_round_to_zero() {
        assert_eq!(calculate_points(10.0, 2_000, ELASTICITY_SCALE_FACTOR), 0);
    }

    #[test]
    fn correctness_boundary_sits_at_the_tolerance() {
        assert!(is_correct(-0.5, -0.4));
        assert!(!is_correct(-0.50001, -0.4));
        assert!(is_correct(1.0, 1.0));
    }

    #[test]
    fn tiers_cover_the_difference_bands() {
        assert_eq!(AccuracyTier::from_difference(0.0), AccuracyTier::Excellent);
        assert_eq!(AccuracyTier::from_difference(0.1), AccuracyTier::Excellent);
        assert_eq!(AccuracyTier::from_difference(0.2), AccuracyTier::VeryClose);
        assert_eq!(AccuracyTier::from_difference(0.3), AccuracyTier::VeryClose);
        assert_eq!(AccuracyTier::from_difference(0.4), AccuracyTier::GoodTry);
        assert_eq!(
            AccuracyTier::from_difference(0.51),
            AccuracyTier::KeepPracticing
        );
    }
}
