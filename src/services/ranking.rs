// SPDX-License-Identifier: MIT

//! Community feed rankings.

use crate::models::walk::Walk;
use serde::Serialize;
use std::collections::HashMap;

/// One leaderboard row.
#[derive(Debug, Clone, Serialize)]
pub struct RankEntry {
    /// 1-based dense rank; equal distances share a rank
    pub rank: u32,
    pub user_id: String,
    pub walk_count: u32,
    pub total_distance_meters: f64,
    pub total_duration_seconds: i64,
}

/// Aggregate public walks into a distance leaderboard.
///
/// Sorted by total distance descending; ties share a rank and are ordered by
/// user ID for a stable listing.
pub fn build_rankings(walks: &[Walk]) -> Vec<RankEntry> {
    let mut by_user: HashMap<&str, RankEntry> = HashMap::new();

    for walk in walks {
        let entry = by_user
            .entry(walk.user_id.as_str())
            .or_insert_with(|| RankEntry {
                rank: 0,
                user_id: walk.user_id.clone(),
                walk_count: 0,
                total_distance_meters: 0.0,
                total_duration_seconds: 0,
            });
        entry.walk_count += 1;
        entry.total_distance_meters += walk.distance_meters;
        entry.total_duration_seconds += walk.duration_seconds;
    }

    let mut entries: Vec<RankEntry> = by_user.into_values().collect();
    entries.sort_by(|a, b| {
        b.total_distance_meters
            .partial_cmp(&a.total_distance_meters)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    let mut rank = 0;
    let mut last_distance = f64::INFINITY;
    for entry in entries.iter_mut() {
        if entry.total_distance_meters < last_distance {
            rank += 1;
            last_distance = entry.total_distance_meters;
        }
        entry.rank = rank;
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::walk::MedalTier;

    fn walk(user: &str, distance: f64) -> Walk {
        Walk {
            walk_id: uuid::Uuid::new_v4().to_string(),
            animal_id: "animal-1".to_string(),
            animal_name: "Rex".to_string(),
            user_id: user.to_string(),
            date: "15/01/2024".to_string(),
            start_time: "10:00:00".to_string(),
            end_time: "10:30:00".to_string(),
            duration_seconds: 1800,
            distance_meters: distance,
            route_polyline: String::new(),
            medal_tier: MedalTier::None,
            is_public: true,
            recorded_at: "2024-01-15T12:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_rankings_order_and_aggregation() {
        let walks = vec![
            walk("alice", 1000.0),
            walk("bob", 3000.0),
            walk("alice", 1500.0),
        ];
        let rankings = build_rankings(&walks);

        assert_eq!(rankings.len(), 2);
        assert_eq!(rankings[0].user_id, "bob");
        assert_eq!(rankings[0].rank, 1);
        assert_eq!(rankings[1].user_id, "alice");
        assert_eq!(rankings[1].rank, 2);
        assert_eq!(rankings[1].walk_count, 2);
        assert_eq!(rankings[1].total_distance_meters, 2500.0);
    }

    #[test]
    fn test_ties_share_rank() {
        let walks = vec![
            walk("carol", 2000.0),
            walk("alice", 2000.0),
            walk("bob", 500.0),
        ];
        let rankings = build_rankings(&walks);

        assert_eq!(rankings[0].rank, 1);
        assert_eq!(rankings[1].rank, 1);
        // Tied users ordered by ID
        assert_eq!(rankings[0].user_id, "alice");
        assert_eq!(rankings[1].user_id, "carol");
        // Dense ranking: the next distinct distance takes the next rank,
        // no gap after the tie
        assert_eq!(rankings[2].rank, 2);
    }

    #[test]
    fn test_dense_ranks_have_no_gaps() {
        let walks = vec![
            walk("alice", 2000.0),
            walk("bob", 2000.0),
            walk("carol", 500.0),
            walk("dave", 100.0),
        ];
        let rankings = build_rankings(&walks);

        let ranks: Vec<u32> = rankings.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 1, 2, 3]);
    }

    #[test]
    fn test_empty_input() {
        assert!(build_rankings(&[]).is_empty());
    }
}
