// SPDX-License-Identifier: MIT

//! User statistics aggregates for efficient profile and feed queries.
//!
//! These aggregates are pre-computed when walks are recorded, reducing
//! profile Firestore reads from O(walks) to O(1).

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::models::walk::{MedalTier, Walk};

/// Pre-computed walk statistics for a user.
///
/// Stored in the `user_stats` collection, keyed by user_id.
/// Updated atomically with walk writes via Firestore transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    /// Total walks recorded
    #[serde(default)]
    pub total_walks: u32,
    /// Total distance across all walks (meters)
    #[serde(default)]
    pub total_distance_meters: f64,
    /// Total time on walks (seconds)
    #[serde(default)]
    pub total_duration_seconds: i64,

    /// Medal count per tier ("bronze" / "silver" / "gold")
    #[serde(default)]
    pub medals: HashMap<String, u32>,

    /// Walk count per month ("YYYY-MM" format)
    #[serde(default)]
    pub walks_by_month: HashMap<String, u32>,

    /// Set of recorded walk IDs (for duplicate detection)
    #[serde(default)]
    pub recorded_walk_ids: HashSet<String>,

    /// Last update timestamp (RFC3339)
    #[serde(default)]
    pub updated_at: String,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            total_walks: 0,
            total_distance_meters: 0.0,
            total_duration_seconds: 0,
            medals: HashMap::new(),
            walks_by_month: HashMap::new(),
            recorded_walk_ids: HashSet::new(),
            updated_at: String::new(),
        }
    }
}

impl UserStats {
    /// Update stats with a newly recorded walk.
    ///
    /// Returns `true` if the walk was counted (new).
    /// Returns `false` if the walk was already recorded (duplicate).
    pub fn update_from_walk(&mut self, walk: &Walk, now: &str) -> bool {
        // Idempotency check: skip if already recorded
        if self.recorded_walk_ids.contains(&walk.walk_id) {
            return false;
        }

        self.recorded_walk_ids.insert(walk.walk_id.clone());
        self.updated_at = now.to_string();

        self.total_walks += 1;
        self.total_distance_meters += walk.distance_meters;
        self.total_duration_seconds += walk.duration_seconds;

        if walk.medal_tier != MedalTier::None {
            *self
                .medals
                .entry(walk.medal_tier.as_str().to_string())
                .or_insert(0) += 1;
        }

        if let Some(month_key) = extract_month_key(&walk.date) {
            *self.walks_by_month.entry(month_key).or_insert(0) += 1;
        }

        true
    }
}

/// Extract "YYYY-MM" from a walk-record date string ("dd/MM/yyyy").
fn extract_month_key(date: &str) -> Option<String> {
    let mut parts = date.splitn(3, '/');
    let _day = parts.next()?;
    let month = parts.next()?;
    let year = parts.next()?;
    if month.len() != 2 || year.len() != 4 {
        return None;
    }
    Some(format!("{}-{}", year, month))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_walk(id: &str, date: &str, distance: f64, duration: i64, medal: MedalTier) -> Walk {
        Walk {
            walk_id: id.to_string(),
            animal_id: "animal-1".to_string(),
            animal_name: "Rex".to_string(),
            user_id: "user-1".to_string(),
            date: date.to_string(),
            start_time: "10:00:00".to_string(),
            end_time: "10:30:00".to_string(),
            duration_seconds: duration,
            distance_meters: distance,
            route_polyline: String::new(),
            medal_tier: medal,
            is_public: true,
            recorded_at: "2024-01-15T12:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_update_from_walk_basic() {
        let mut stats = UserStats::default();
        let walk = make_walk("w1", "15/01/2024", 1200.0, 1800, MedalTier::Gold);

        let counted = stats.update_from_walk(&walk, "2024-01-15T12:00:00Z");

        assert!(counted);
        assert_eq!(stats.total_walks, 1);
        assert_eq!(stats.total_distance_meters, 1200.0);
        assert_eq!(stats.total_duration_seconds, 1800);
        assert_eq!(stats.medals.get("gold"), Some(&1));
        assert_eq!(stats.walks_by_month.get("2024-01"), Some(&1));
    }

    #[test]
    fn test_idempotency_skips_duplicate() {
        let mut stats = UserStats::default();
        let walk = make_walk("w1", "15/01/2024", 1200.0, 1800, MedalTier::Bronze);

        stats.update_from_walk(&walk, "2024-01-15T12:00:00Z");
        let counted_again = stats.update_from_walk(&walk, "2024-01-15T13:00:00Z");

        assert!(!counted_again);
        assert_eq!(stats.total_walks, 1); // Not incremented twice
        assert_eq!(stats.medals.get("bronze"), Some(&1));
    }

    #[test]
    fn test_no_medal_not_counted() {
        let mut stats = UserStats::default();
        let walk = make_walk("w1", "15/01/2024", 5.0, 10, MedalTier::None);

        stats.update_from_walk(&walk, "now");

        assert!(stats.medals.is_empty());
        assert_eq!(stats.total_walks, 1);
    }

    #[test]
    fn test_month_key_extraction() {
        assert_eq!(extract_month_key("07/03/2024"), Some("2024-03".to_string()));
        assert_eq!(extract_month_key("2024-03-07"), None);
        assert_eq!(extract_month_key("bogus"), None);
    }
}
