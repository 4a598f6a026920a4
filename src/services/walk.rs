// SPDX-License-Identifier: MIT

//! Live walk tracking.
//!
//! Each walk session is owned by one spawned task (the tracker actor): fixes
//! arrive over an mpsc channel, the actor accumulates distance and appends to
//! the route, and readers observe immutable snapshots through a watch channel.
//! No session state is ever shared mutably outside the actor.

use crate::models::walk::GeoPoint;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use geo::{Distance, HaversineMeasure, Point};
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use tokio::sync::{mpsc, oneshot, watch};

/// Mean Earth radius for the spherical-earth approximation.
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Buffered fixes tolerated before a slow actor applies backpressure to the
/// intake handler.
const FIX_CHANNEL_CAPACITY: usize = 64;

/// A single GPS fix. Ephemeral; fixes are folded into the session and never
/// persisted individually.
#[derive(Debug, Clone, Copy)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

/// Great-circle distance between two fixes in meters.
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let measure = HaversineMeasure::new(EARTH_RADIUS_METERS);
    measure.distance(
        Point::new(a.longitude, a.latitude),
        Point::new(b.longitude, b.latitude),
    )
}

/// Running path-length accumulator.
///
/// The first fix contributes zero; each later fix adds the haversine distance
/// from the previous one. Consecutive noisy fixes are summed as-is: there is
/// no smoothing or outlier rejection, so GPS jitter over-counts.
#[derive(Debug, Default)]
pub struct DistanceAccumulator {
    last: Option<GeoPoint>,
    total_meters: f64,
}

impl DistanceAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in a fix and return the updated total.
    pub fn add_fix(&mut self, fix: &LocationFix) -> f64 {
        let point = GeoPoint {
            latitude: fix.latitude,
            longitude: fix.longitude,
        };
        if let Some(prev) = self.last {
            self.total_meters += haversine_distance(prev, point);
        }
        self.last = Some(point);
        self.total_meters
    }

    pub fn total_meters(&self) -> f64 {
        self.total_meters
    }
}

/// Immutable view of a running session, published after every fix.
#[derive(Debug, Clone, Serialize)]
pub struct WalkSnapshot {
    pub distance_meters: f64,
    pub duration_seconds: i64,
    pub fix_count: usize,
}

/// Final result of a stopped session, handed to the persistence step.
#[derive(Debug, Clone)]
pub struct WalkSummary {
    pub animal_id: String,
    pub animal_name: String,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_seconds: i64,
    pub distance_meters: f64,
    pub route_points: Vec<GeoPoint>,
}

/// Mutable session aggregate. Owned exclusively by the tracker actor.
struct WalkSession {
    animal_id: String,
    animal_name: String,
    user_id: String,
    started_at: DateTime<Utc>,
    route: Vec<GeoPoint>,
    accumulator: DistanceAccumulator,
}

impl WalkSession {
    fn new(
        animal_id: String,
        animal_name: String,
        user_id: String,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            animal_id,
            animal_name,
            user_id,
            started_at,
            route: Vec::new(),
            accumulator: DistanceAccumulator::new(),
        }
    }

    fn record_fix(&mut self, fix: &LocationFix) {
        self.accumulator.add_fix(fix);
        self.route.push(GeoPoint {
            latitude: fix.latitude,
            longitude: fix.longitude,
        });
    }

    fn snapshot(&self, now: DateTime<Utc>) -> WalkSnapshot {
        WalkSnapshot {
            distance_meters: self.accumulator.total_meters(),
            duration_seconds: (now - self.started_at).num_seconds(),
            fix_count: self.route.len(),
        }
    }

    fn finish(self, ended_at: DateTime<Utc>) -> WalkSummary {
        WalkSummary {
            animal_id: self.animal_id,
            animal_name: self.animal_name,
            user_id: self.user_id,
            started_at: self.started_at,
            ended_at,
            duration_seconds: (ended_at - self.started_at).num_seconds(),
            distance_meters: self.accumulator.total_meters(),
            route_points: self.route,
        }
    }
}

enum TrackerCommand {
    Fix(LocationFix),
    Stop(oneshot::Sender<WalkSummary>),
}

/// Handle to a running tracker actor. Cheap to clone; all mutation happens
/// inside the actor task.
#[derive(Clone)]
pub struct WalkHandle {
    pub walk_id: String,
    pub animal_id: String,
    pub animal_name: String,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    cmd_tx: mpsc::Sender<TrackerCommand>,
    snapshot_rx: watch::Receiver<WalkSnapshot>,
    final_summary: Arc<OnceLock<WalkSummary>>,
}

impl WalkHandle {
    /// Forward a fix into the session. Fails only once the session has
    /// stopped.
    pub async fn record_fix(&self, fix: LocationFix) -> Result<(), WalkStopped> {
        self.cmd_tx
            .send(TrackerCommand::Fix(fix))
            .await
            .map_err(|_| WalkStopped)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> WalkSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Stop tracking and collect the final summary.
    ///
    /// The summary is cached on first success, so calling again after the
    /// actor has exited returns the same summary. This keeps a stop whose
    /// persistence step failed retryable.
    pub async fn stop(&self) -> Result<WalkSummary, WalkStopped> {
        if let Some(summary) = self.final_summary.get() {
            return Ok(summary.clone());
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        if self
            .cmd_tx
            .send(TrackerCommand::Stop(reply_tx))
            .await
            .is_err()
        {
            // Actor already gone; another caller may have stopped it
            return self.final_summary.get().cloned().ok_or(WalkStopped);
        }

        match reply_rx.await {
            Ok(summary) => {
                let _ = self.final_summary.set(summary.clone());
                Ok(summary)
            }
            Err(_) => self.final_summary.get().cloned().ok_or(WalkStopped),
        }
    }
}

/// The session's actor task has already exited.
#[derive(Debug, thiserror::Error)]
#[error("walk session already stopped")]
pub struct WalkStopped;

/// Registry of in-flight walk sessions, keyed by walk ID.
#[derive(Clone, Default)]
pub struct WalkRegistry {
    sessions: Arc<DashMap<String, WalkHandle>>,
}

impl WalkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new session: spawn its tracker actor and register the handle.
    pub fn begin(&self, animal_id: String, animal_name: String, user_id: String) -> WalkHandle {
        let walk_id = uuid::Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let session = WalkSession::new(
            animal_id.clone(),
            animal_name.clone(),
            user_id.clone(),
            started_at,
        );

        let (cmd_tx, mut cmd_rx) = mpsc::channel(FIX_CHANNEL_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot(started_at));

        tracing::info!(walk_id = %walk_id, animal_id = %animal_id, "Walk session started");

        tokio::spawn(async move {
            let mut session = session;
            while let Some(cmd) = cmd_rx.recv().await {
                match cmd {
                    TrackerCommand::Fix(fix) => {
                        session.record_fix(&fix);
                        // Receivers may be gone; tracking continues regardless
                        let _ = snapshot_tx.send(session.snapshot(Utc::now()));
                    }
                    TrackerCommand::Stop(reply) => {
                        // Close intake before replying so a caller that has
                        // observed the stop can never enqueue another fix.
                        cmd_rx.close();
                        let summary = session.finish(Utc::now());
                        tracing::info!(
                            distance_meters = summary.distance_meters,
                            duration_seconds = summary.duration_seconds,
                            fixes = summary.route_points.len(),
                            "Walk session stopped"
                        );
                        let _ = reply.send(summary);
                        return;
                    }
                }
            }
        });

        let handle = WalkHandle {
            walk_id: walk_id.clone(),
            animal_id,
            animal_name,
            user_id,
            started_at,
            cmd_tx,
            snapshot_rx,
            final_summary: Arc::new(OnceLock::new()),
        };
        self.sessions.insert(walk_id, handle.clone());
        handle
    }

    /// Look up a running session.
    pub fn get(&self, walk_id: &str) -> Option<WalkHandle> {
        self.sessions.get(walk_id).map(|entry| entry.value().clone())
    }

    /// Remove a session from the registry (on stop or abandonment).
    pub fn remove(&self, walk_id: &str) -> Option<WalkHandle> {
        self.sessions.remove(walk_id).map(|(_, handle)| handle)
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ~10 m of latitude at R = 6,371,000 m
    const LAT_STEP_10M: f64 = 10.0 / 111_194.93;

    fn fix(latitude: f64, longitude: f64) -> LocationFix {
        LocationFix {
            latitude,
            longitude,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let a = GeoPoint {
            latitude: 37.42,
            longitude: -122.08,
        };
        assert_eq!(haversine_distance(a, a), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = GeoPoint {
            latitude: 37.42,
            longitude: -122.08,
        };
        let b = GeoPoint {
            latitude: 37.43,
            longitude: -122.07,
        };
        let d_ab = haversine_distance(a, b);
        let d_ba = haversine_distance(b, a);
        assert!((d_ab - d_ba).abs() < 1e-9);
        assert!(d_ab > 0.0);
    }

    #[test]
    fn test_first_fix_contributes_zero() {
        let mut acc = DistanceAccumulator::new();
        let total = acc.add_fix(&fix(37.42, -122.08));
        assert_eq!(total, 0.0);
    }

    #[test]
    fn test_accumulator_is_monotonic() {
        let mut acc = DistanceAccumulator::new();
        let mut previous = 0.0;
        // Includes repeated and backtracking fixes; total must never decrease
        let fixes = [
            fix(37.42, -122.08),
            fix(37.4201, -122.08),
            fix(37.4201, -122.08),
            fix(37.42, -122.08),
            fix(37.4203, -122.0801),
        ];
        for f in &fixes {
            let total = acc.add_fix(f);
            assert!(total >= previous, "total decreased: {} < {}", total, previous);
            assert!(total >= 0.0);
            previous = total;
        }
    }

    #[test]
    fn test_three_fixes_ten_meters_apart() {
        let mut acc = DistanceAccumulator::new();
        acc.add_fix(&fix(37.42, -122.08));
        acc.add_fix(&fix(37.42 + LAT_STEP_10M, -122.08));
        let total = acc.add_fix(&fix(37.42 + 2.0 * LAT_STEP_10M, -122.08));
        assert!(
            (total - 20.0).abs() < 0.1,
            "expected ~20m, got {}",
            total
        );
    }

    #[tokio::test]
    async fn test_tracker_actor_round_trip() {
        let registry = WalkRegistry::new();
        let handle = registry.begin(
            "animal-1".to_string(),
            "Rex".to_string(),
            "user-1".to_string(),
        );
        assert_eq!(registry.active_count(), 1);

        handle.record_fix(fix(37.42, -122.08)).await.unwrap();
        handle
            .record_fix(fix(37.42 + LAT_STEP_10M, -122.08))
            .await
            .unwrap();
        handle
            .record_fix(fix(37.42 + 2.0 * LAT_STEP_10M, -122.08))
            .await
            .unwrap();

        let summary = handle.stop().await.unwrap();
        assert_eq!(summary.route_points.len(), 3);
        assert!((summary.distance_meters - 20.0).abs() < 0.1);
        assert_eq!(summary.animal_name, "Rex");
        assert!(summary.duration_seconds >= 0);

        // A stopped session rejects further fixes
        let err = handle.record_fix(fix(37.42, -122.08)).await;
        assert!(err.is_err());

        registry.remove(&handle.walk_id);
        assert_eq!(registry.active_count(), 0);
    }

    #[tokio::test]
    async fn test_repeated_stop_returns_same_summary() {
        let registry = WalkRegistry::new();
        let handle = registry.begin(
            "animal-1".to_string(),
            "Rex".to_string(),
            "user-1".to_string(),
        );

        handle.record_fix(fix(37.42, -122.08)).await.unwrap();
        handle
            .record_fix(fix(37.42 + LAT_STEP_10M, -122.08))
            .await
            .unwrap();

        let first = handle.stop().await.unwrap();
        // A caller whose persistence step failed can ask again
        let second = handle.stop().await.unwrap();

        assert_eq!(second.route_points.len(), first.route_points.len());
        assert_eq!(second.distance_meters, first.distance_meters);
        assert_eq!(second.ended_at, first.ended_at);

        // The same holds through a cloned handle, as stored in the registry
        let third = registry.get(&handle.walk_id).unwrap().stop().await.unwrap();
        assert_eq!(third.ended_at, first.ended_at);
    }
}
