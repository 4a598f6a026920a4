// SPDX-License-Identifier: MIT

//! Adoption request routes: filing requests plus shelter decisions.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{AdoptionRequest, AnimalStatus, RequestKind, RequestStatus};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/adoption-requests", get(list_my_requests))
        .route(
            "/api/animals/{animal_id}/adoption-requests",
            post(create_request),
        )
}

pub fn shelter_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/shelter/adoption-requests", get(list_pending_requests))
        .route(
            "/api/shelter/adoption-requests/{request_id}/approve",
            post(approve_request),
        )
        .route(
            "/api/shelter/adoption-requests/{request_id}/reject",
            post(reject_request),
        )
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRequestPayload {
    pub kind: RequestKind,
    #[validate(length(max = 1000))]
    pub message: Option<String>,
}

/// File an adoption or special-ownership request for an animal.
async fn create_request(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(animal_id): Path<String>,
    Json(payload): Json<CreateRequestPayload>,
) -> Result<(StatusCode, Json<AdoptionRequest>)> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let animal = state
        .db
        .get_animal(&animal_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("animal {}", animal_id)))?;

    if animal.status != AnimalStatus::Adoptable {
        return Err(AppError::BadRequest(
            "Animal is not open for requests".to_string(),
        ));
    }

    let request = AdoptionRequest {
        request_id: uuid::Uuid::new_v4().to_string(),
        animal_id: animal.animal_id,
        user_id: auth.user_id,
        kind: payload.kind,
        message: payload.message,
        status: RequestStatus::Pending,
        decided_by: None,
        decided_at: None,
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    };

    state.db.upsert_adoption_request(&request).await?;
    tracing::info!(
        request_id = %request.request_id,
        animal_id = %request.animal_id,
        kind = ?request.kind,
        "Adoption request filed"
    );

    Ok((StatusCode::CREATED, Json(request)))
}

/// The caller's own requests, newest first.
async fn list_my_requests(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<AdoptionRequest>>> {
    let requests = state
        .db
        .get_adoption_requests_for_user(&auth.user_id)
        .await?;
    Ok(Json(requests))
}

/// Pending requests across all of the calling shelter's animals.
async fn list_pending_requests(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<AdoptionRequest>>> {
    let animals = state.db.get_animals_for_shelter(&auth.user_id).await?;
    let animal_ids: Vec<String> = animals.into_iter().map(|a| a.animal_id).collect();
    let requests = state.db.get_pending_adoption_requests(&animal_ids).await?;
    Ok(Json(requests))
}

/// Approve a pending request.
///
/// The requester becomes the animal's keeper. A full adoption also moves the
/// listing to `adopted`; special ownership leaves the listing status alone
/// since the animal stays at the shelter.
async fn approve_request(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(request_id): Path<String>,
) -> Result<Json<AdoptionRequest>> {
    let mut request = state
        .db
        .get_adoption_request(&request_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("request {}", request_id)))?;

    if request.status != RequestStatus::Pending {
        return Err(AppError::BadRequest("Request already decided".to_string()));
    }

    let mut animal = state
        .db
        .get_animal(&request.animal_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("animal {}", request.animal_id)))?;

    if animal.shelter_id != auth.user_id {
        return Err(AppError::Forbidden);
    }
    if animal.keeper_id.is_some() {
        return Err(AppError::BadRequest(
            "Animal already has a keeper".to_string(),
        ));
    }

    let now = format_utc_rfc3339(chrono::Utc::now());
    request.status = RequestStatus::Approved;
    request.decided_by = Some(auth.user_id.clone());
    request.decided_at = Some(now.clone());

    animal.keeper_id = Some(request.user_id.clone());
    if request.kind == RequestKind::Adoption {
        animal.status = AnimalStatus::Adopted;
    }
    animal.updated_at = now;

    state
        .db
        .apply_adoption_decision_atomic(&request, &animal)
        .await?;

    Ok(Json(request))
}

/// Reject a pending request. The animal is untouched.
async fn reject_request(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(request_id): Path<String>,
) -> Result<Json<AdoptionRequest>> {
    let mut request = state
        .db
        .get_adoption_request(&request_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("request {}", request_id)))?;

    if request.status != RequestStatus::Pending {
        return Err(AppError::BadRequest("Request already decided".to_string()));
    }

    let animal = state
        .db
        .get_animal(&request.animal_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("animal {}", request.animal_id)))?;

    if animal.shelter_id != auth.user_id {
        return Err(AppError::Forbidden);
    }

    request.status = RequestStatus::Rejected;
    request.decided_by = Some(auth.user_id);
    request.decided_at = Some(format_utc_rfc3339(chrono::Utc::now()));

    state.db.upsert_adoption_request(&request).await?;

    Ok(Json(request))
}
