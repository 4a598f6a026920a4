// SPDX-License-Identifier: MIT

//! User profile routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::{AuthUser, Role};
use crate::models::User;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/me", put(upsert_me))
}

/// Get the caller's profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<User>> {
    let user = state
        .db
        .get_user(&auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user profile".to_string()))?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpsertProfileRequest {
    #[validate(length(min = 1, max = 80))]
    pub display_name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(url)]
    pub profile_picture: Option<String>,
}

/// Create or update the caller's profile. Called by the client after sign-in,
/// so this also provisions first-time users.
async fn upsert_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UpsertProfileRequest>,
) -> Result<Json<User>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let now = format_utc_rfc3339(chrono::Utc::now());
    let existing = state.db.get_user(&auth.user_id).await?;
    let created_at = existing.map(|u| u.created_at).unwrap_or_else(|| now.clone());

    let user = User {
        user_id: auth.user_id.clone(),
        email: payload.email,
        display_name: payload.display_name,
        profile_picture: payload.profile_picture,
        role: match auth.role {
            Role::User => "user".to_string(),
            Role::Shelter => "shelter".to_string(),
        },
        created_at,
        last_active: now,
    };

    state.db.upsert_user(&user).await?;
    Ok(Json(user))
}
