// SPDX-License-Identifier: MIT

//! Persisted walk record and its building blocks.

use serde::{Deserialize, Serialize};

/// A single route point. Fix timestamps are not persisted; the route is an
/// ordered shape, not a time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Tiered walk achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MedalTier {
    None,
    Bronze,
    Silver,
    Gold,
}

impl MedalTier {
    /// Stable name used as a stats-aggregate key.
    pub fn as_str(&self) -> &'static str {
        match self {
            MedalTier::None => "none",
            MedalTier::Bronze => "bronze",
            MedalTier::Silver => "silver",
            MedalTier::Gold => "gold",
        }
    }
}

/// Finished walk stored in Firestore.
///
/// The route is an encoded polyline (precision 5); date and times use the
/// client display formats (`dd/MM/yyyy`, `HH:mm:ss`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Walk {
    /// Document ID (server-generated UUID)
    pub walk_id: String,
    /// Walked animal
    pub animal_id: String,
    /// Animal display name, denormalized for the feed
    pub animal_name: String,
    /// Walking user
    pub user_id: String,
    /// Walk date, `dd/MM/yyyy`
    pub date: String,
    /// Start of the session, `HH:mm:ss`
    pub start_time: String,
    /// End of the session, `HH:mm:ss`
    pub end_time: String,
    /// Elapsed session time in seconds
    pub duration_seconds: i64,
    /// Accumulated haversine path length in meters
    pub distance_meters: f64,
    /// Route encoded as a polyline, precision 5
    pub route_polyline: String,
    /// Achievement earned for this walk
    pub medal_tier: MedalTier,
    /// Whether the walk appears in the community feed
    pub is_public: bool,
    /// When the record was written (RFC3339, used for feed ordering)
    pub recorded_at: String,
}
