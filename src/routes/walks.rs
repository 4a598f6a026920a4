// SPDX-License-Identifier: MIT

//! Walk tracking routes: live session control and walk history.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{MedalTier, Walk};
use crate::services::medal::medal_for_duration;
use crate::services::walk::{LocationFix, WalkHandle, WalkSnapshot};
use crate::time_utils::{format_utc_rfc3339, format_walk_date, format_walk_time};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 50;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/walks", get(list_my_walks))
        .route("/api/walks/start", post(start_walk))
        .route("/api/walks/{walk_id}", get(get_walk))
        .route("/api/walks/{walk_id}/fixes", post(record_fix))
        .route("/api/walks/{walk_id}/live", get(get_live_snapshot))
        .route("/api/walks/{walk_id}/stop", post(stop_walk))
}

// ─── Cursor pagination ───────────────────────────────────────────

/// Encode a `recorded_at` timestamp as an opaque page cursor.
pub(crate) fn encode_cursor(recorded_at: &str) -> String {
    URL_SAFE_NO_PAD.encode(recorded_at.as_bytes())
}

/// Decode and sanity-check a page cursor back into a `recorded_at` bound.
pub(crate) fn parse_cursor(raw: Option<&str>) -> Result<Option<String>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let bytes = URL_SAFE_NO_PAD
        .decode(raw)
        .map_err(|_| AppError::BadRequest("Invalid cursor".to_string()))?;
    let decoded = String::from_utf8(bytes)
        .map_err(|_| AppError::BadRequest("Invalid cursor".to_string()))?;
    DateTime::parse_from_rfc3339(&decoded)
        .map_err(|_| AppError::BadRequest("Invalid cursor".to_string()))?;
    Ok(Some(decoded))
}

#[derive(Debug, Deserialize)]
pub struct WalkListQuery {
    pub cursor: Option<String>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct WalkPage {
    pub walks: Vec<Walk>,
    /// Cursor for the next page; absent on the last page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

pub(crate) fn paginate(mut walks: Vec<Walk>, per_page: usize) -> WalkPage {
    let next_cursor = if walks.len() > per_page {
        walks.truncate(per_page);
        walks.last().map(|w| encode_cursor(&w.recorded_at))
    } else {
        None
    };
    WalkPage { walks, next_cursor }
}

/// The caller's finished walks, newest first.
async fn list_my_walks(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<WalkListQuery>,
) -> Result<Json<WalkPage>> {
    let before = parse_cursor(query.cursor.as_deref())?;
    let per_page = query.per_page.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);

    // Fetch one extra row to learn whether another page exists
    let walks = state
        .db
        .get_walks_for_user(&auth.user_id, before, per_page + 1)
        .await?;

    Ok(Json(paginate(walks, per_page as usize)))
}

// ─── Live session control ────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct StartWalkRequest {
    #[validate(length(min = 1))]
    pub animal_id: String,
}

#[derive(Debug, Serialize)]
pub struct StartWalkResponse {
    pub walk_id: String,
    pub animal_id: String,
    pub animal_name: String,
    /// RFC3339
    pub started_at: String,
}

/// Start a live walk session for an animal the caller keeps.
async fn start_walk(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<StartWalkRequest>,
) -> Result<(StatusCode, Json<StartWalkResponse>)> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let animal = state
        .db
        .get_animal(&payload.animal_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("animal {}", payload.animal_id)))?;

    if !animal.is_kept_by(&auth.user_id) {
        return Err(AppError::Forbidden);
    }

    let handle = state
        .walks
        .begin(animal.animal_id, animal.name, auth.user_id);

    Ok((
        StatusCode::CREATED,
        Json(StartWalkResponse {
            walk_id: handle.walk_id.clone(),
            animal_id: handle.animal_id.clone(),
            animal_name: handle.animal_name.clone(),
            started_at: format_utc_rfc3339(handle.started_at),
        }),
    ))
}

/// Look up a session and enforce that the caller owns it. Sessions are
/// single-writer; nobody else may feed or stop them.
fn owned_session(state: &AppState, walk_id: &str, auth: &AuthUser) -> Result<WalkHandle> {
    let handle = state
        .walks
        .get(walk_id)
        .ok_or_else(|| AppError::NotFound(format!("walk session {}", walk_id)))?;
    if handle.user_id != auth.user_id {
        return Err(AppError::Forbidden);
    }
    Ok(handle)
}

#[derive(Debug, Deserialize, Validate)]
pub struct FixRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    /// RFC3339; defaults to server receive time
    pub timestamp: Option<String>,
}

/// Feed a GPS fix into a running session.
async fn record_fix(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(walk_id): Path<String>,
    Json(payload): Json<FixRequest>,
) -> Result<StatusCode> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let timestamp = match &payload.timestamp {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map_err(|_| AppError::BadRequest(format!("Invalid timestamp: {}", raw)))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let handle = owned_session(&state, &walk_id, &auth)?;
    handle
        .record_fix(LocationFix {
            latitude: payload.latitude,
            longitude: payload.longitude,
            timestamp,
        })
        .await
        .map_err(|_| AppError::BadRequest("Walk session already stopped".to_string()))?;

    Ok(StatusCode::ACCEPTED)
}

/// Latest live snapshot of a running session.
async fn get_live_snapshot(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(walk_id): Path<String>,
) -> Result<Json<WalkSnapshot>> {
    let handle = owned_session(&state, &walk_id, &auth)?;
    Ok(Json(handle.snapshot()))
}

#[derive(Debug, Deserialize, Default)]
pub struct StopWalkRequest {
    /// Whether the finished walk appears in the community feed
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Serialize)]
pub struct StopWalkResponse {
    pub walk: Walk,
    pub medal_tier: MedalTier,
}

/// Stop a session, evaluate the medal, and persist the walk record together
/// with the caller's stats.
///
/// The session stays registered until the write succeeds; a stop whose
/// persistence step failed can be retried and gets the same final summary.
async fn stop_walk(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(walk_id): Path<String>,
    Json(payload): Json<StopWalkRequest>,
) -> Result<Json<StopWalkResponse>> {
    let handle = owned_session(&state, &walk_id, &auth)?;

    let summary = handle
        .stop()
        .await
        .map_err(|_| AppError::BadRequest("Walk session already stopped".to_string()))?;

    let route_polyline = polyline::encode_coordinates(
        summary
            .route_points
            .iter()
            .map(|p| geo::coord! { x: p.longitude, y: p.latitude }),
        5,
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Polyline encoding failed: {}", e)))?;

    let medal_tier = medal_for_duration(summary.duration_seconds);

    let walk = Walk {
        walk_id,
        animal_id: summary.animal_id,
        animal_name: summary.animal_name,
        user_id: summary.user_id,
        date: format_walk_date(summary.started_at.date_naive()),
        start_time: format_walk_time(summary.started_at),
        end_time: format_walk_time(summary.ended_at),
        duration_seconds: summary.duration_seconds,
        distance_meters: summary.distance_meters,
        route_polyline,
        medal_tier,
        is_public: payload.is_public,
        recorded_at: format_utc_rfc3339(Utc::now()),
    };

    state.db.record_walk_atomic(&walk).await?;
    state.walks.remove(&walk.walk_id);

    Ok(Json(StopWalkResponse { walk, medal_tier }))
}

/// Fetch a finished walk record. Private walks are visible to their walker
/// only.
async fn get_walk(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(walk_id): Path<String>,
) -> Result<Json<Walk>> {
    let walk = state
        .db
        .get_walk(&walk_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("walk {}", walk_id)))?;

    if !walk.is_public && walk.user_id != auth.user_id {
        return Err(AppError::NotFound(format!("walk {}", walk_id)));
    }

    Ok(Json(walk))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_round_trip() {
        let recorded_at = "2024-06-10T12:34:56+00:00";
        let cursor = encode_cursor(recorded_at);
        assert!(!cursor.contains('='));
        let parsed = parse_cursor(Some(&cursor)).unwrap();
        assert_eq!(parsed.as_deref(), Some(recorded_at));
    }

    #[test]
    fn test_cursor_rejects_garbage() {
        assert!(parse_cursor(Some("!!not-base64!!")).is_err());
        // Valid base64, but not a timestamp
        let cursor = URL_SAFE_NO_PAD.encode(b"hello");
        assert!(parse_cursor(Some(&cursor)).is_err());
    }

    #[test]
    fn test_missing_cursor_is_first_page() {
        assert_eq!(parse_cursor(None).unwrap(), None);
    }
}
