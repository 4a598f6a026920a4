// SPDX-License-Identifier: MIT

//! Medal evaluation.
//!
//! Pure threshold mapping from a walk metric to a tier. A value exactly at a
//! threshold earns the higher tier.

use crate::models::walk::MedalTier;

/// Duration thresholds in seconds.
pub const BRONZE_DURATION_SECS: i64 = 15;
pub const SILVER_DURATION_SECS: i64 = 30;
pub const GOLD_DURATION_SECS: i64 = 45;

/// Distance thresholds in meters (same three-tier shape, alternative metric).
pub const BRONZE_DISTANCE_METERS: f64 = 500.0;
pub const SILVER_DISTANCE_METERS: f64 = 1000.0;
pub const GOLD_DISTANCE_METERS: f64 = 2000.0;

/// Map an elapsed walk duration to a medal tier.
pub fn medal_for_duration(duration_seconds: i64) -> MedalTier {
    if duration_seconds >= GOLD_DURATION_SECS {
        MedalTier::Gold
    } else if duration_seconds >= SILVER_DURATION_SECS {
        MedalTier::Silver
    } else if duration_seconds >= BRONZE_DURATION_SECS {
        MedalTier::Bronze
    } else {
        MedalTier::None
    }
}

/// Map an accumulated walk distance to a medal tier.
pub fn medal_for_distance(distance_meters: f64) -> MedalTier {
    if distance_meters >= GOLD_DISTANCE_METERS {
        MedalTier::Gold
    } else if distance_meters >= SILVER_DISTANCE_METERS {
        MedalTier::Silver
    } else if distance_meters >= BRONZE_DISTANCE_METERS {
        MedalTier::Bronze
    } else {
        MedalTier::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_duration_no_medal() {
        assert_eq!(medal_for_duration(0), MedalTier::None);
    }

    #[test]
    fn test_below_bronze() {
        assert_eq!(medal_for_duration(BRONZE_DURATION_SECS - 1), MedalTier::None);
    }

    #[test]
    fn test_boundary_takes_higher_tier() {
        assert_eq!(medal_for_duration(BRONZE_DURATION_SECS), MedalTier::Bronze);
        assert_eq!(medal_for_duration(SILVER_DURATION_SECS), MedalTier::Silver);
        assert_eq!(medal_for_duration(GOLD_DURATION_SECS), MedalTier::Gold);
    }

    #[test]
    fn test_between_thresholds() {
        assert_eq!(medal_for_duration(SILVER_DURATION_SECS - 1), MedalTier::Bronze);
        assert_eq!(medal_for_duration(GOLD_DURATION_SECS - 1), MedalTier::Silver);
        assert_eq!(medal_for_duration(GOLD_DURATION_SECS * 100), MedalTier::Gold);
    }

    #[test]
    fn test_distance_variant_same_shape() {
        assert_eq!(medal_for_distance(0.0), MedalTier::None);
        assert_eq!(medal_for_distance(BRONZE_DISTANCE_METERS), MedalTier::Bronze);
        assert_eq!(medal_for_distance(SILVER_DISTANCE_METERS), MedalTier::Silver);
        assert_eq!(medal_for_distance(GOLD_DISTANCE_METERS), MedalTier::Gold);
        assert_eq!(
            medal_for_distance(GOLD_DISTANCE_METERS - 0.1),
            MedalTier::Silver
        );
    }
}
