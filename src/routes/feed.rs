// SPDX-License-Identifier: MIT

//! Community feed routes: public walks and the distance leaderboard.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::routes::walks::{paginate, parse_cursor, WalkListQuery, WalkPage};
use crate::services::ranking::{build_rankings, RankEntry};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 50;

/// Default and maximum leaderboard window in days.
const DEFAULT_RANKING_DAYS: i64 = 7;
const MAX_RANKING_DAYS: i64 = 90;

/// Upper bound on walks scanned per leaderboard request.
const RANKING_SCAN_LIMIT: u32 = 1000;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/feed", get(get_feed))
        .route("/api/feed/rankings", get(get_rankings))
}

/// Public walks, newest first, with the same cursor scheme as walk history.
async fn get_feed(
    State(state): State<Arc<AppState>>,
    Extension(_auth): Extension<AuthUser>,
    Query(query): Query<WalkListQuery>,
) -> Result<Json<WalkPage>> {
    let before = parse_cursor(query.cursor.as_deref())?;
    let per_page = query.per_page.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);

    let walks = state.db.get_public_walks(before, per_page + 1).await?;

    Ok(Json(paginate(walks, per_page as usize)))
}

#[derive(Debug, Deserialize)]
pub struct RankingsQuery {
    /// Window length in days; defaults to one week
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RankingsResponse {
    pub period_days: i64,
    pub entries: Vec<RankEntry>,
}

/// Distance leaderboard over recent public walks.
async fn get_rankings(
    State(state): State<Arc<AppState>>,
    Extension(_auth): Extension<AuthUser>,
    Query(query): Query<RankingsQuery>,
) -> Result<Json<RankingsResponse>> {
    let period_days = query
        .days
        .unwrap_or(DEFAULT_RANKING_DAYS)
        .clamp(1, MAX_RANKING_DAYS);

    let since = format_utc_rfc3339(Utc::now() - Duration::days(period_days));
    let walks = state
        .db
        .get_public_walks_since(since, RANKING_SCAN_LIMIT)
        .await?;

    Ok(Json(RankingsResponse {
        period_days,
        entries: build_rankings(&walks),
    }))
}
