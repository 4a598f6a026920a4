// SPDX-License-Identifier: MIT

//! Animal listing routes: public browsing plus shelter management.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Animal, AnimalStatus};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

const DEFAULT_PAGE_SIZE: u32 = 50;
const MAX_PAGE_SIZE: u32 = 100;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/animals", get(list_animals))
        .route("/api/animals/{animal_id}", get(get_animal))
}

pub fn shelter_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/shelter/animals", get(list_shelter_animals))
        .route("/api/shelter/animals", post(create_animal))
        .route("/api/shelter/animals/{animal_id}", put(update_animal))
        .route("/api/shelter/animals/{animal_id}", delete(archive_animal))
}

#[derive(Debug, Deserialize)]
pub struct ListAnimalsQuery {
    pub status: Option<String>,
    pub limit: Option<u32>,
}

fn parse_status(raw: &str) -> Result<AnimalStatus> {
    match raw {
        "adoptable" => Ok(AnimalStatus::Adoptable),
        "reserved" => Ok(AnimalStatus::Reserved),
        "adopted" => Ok(AnimalStatus::Adopted),
        "archived" => Ok(AnimalStatus::Archived),
        other => Err(AppError::BadRequest(format!(
            "Unknown animal status: {}",
            other
        ))),
    }
}

/// Browse listings, newest first. Defaults to adoptable animals.
async fn list_animals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListAnimalsQuery>,
) -> Result<Json<Vec<Animal>>> {
    let status = match query.status.as_deref() {
        Some(raw) => parse_status(raw)?,
        None => AnimalStatus::Adoptable,
    };
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);

    let animals = state.db.list_animals(status, limit).await?;
    Ok(Json(animals))
}

/// Fetch one listing.
async fn get_animal(
    State(state): State<Arc<AppState>>,
    Path(animal_id): Path<String>,
) -> Result<Json<Animal>> {
    let animal = state
        .db
        .get_animal(&animal_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("animal {}", animal_id)))?;
    Ok(Json(animal))
}

/// All of the calling shelter's listings, archived included.
async fn list_shelter_animals(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Animal>>> {
    let animals = state.db.get_animals_for_shelter(&auth.user_id).await?;
    Ok(Json(animals))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAnimalRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub species: String,
    #[validate(length(max = 50))]
    pub breed: Option<String>,
    #[validate(range(max = 600))]
    pub age_months: Option<u32>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// Create a new listing owned by the calling shelter.
async fn create_animal(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateAnimalRequest>,
) -> Result<(StatusCode, Json<Animal>)> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let now = format_utc_rfc3339(chrono::Utc::now());
    let animal = Animal {
        animal_id: uuid::Uuid::new_v4().to_string(),
        name: payload.name,
        species: payload.species,
        breed: payload.breed,
        age_months: payload.age_months,
        description: payload.description,
        shelter_id: auth.user_id.clone(),
        status: AnimalStatus::Adoptable,
        keeper_id: None,
        created_at: now.clone(),
        updated_at: now,
    };

    state.db.upsert_animal(&animal).await?;
    tracing::info!(animal_id = %animal.animal_id, shelter_id = %auth.user_id, "Animal listed");

    Ok((StatusCode::CREATED, Json(animal)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAnimalRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 50))]
    pub breed: Option<String>,
    #[validate(range(max = 600))]
    pub age_months: Option<u32>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// Update fields on an existing listing.
async fn update_animal(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(animal_id): Path<String>,
    Json(payload): Json<UpdateAnimalRequest>,
) -> Result<Json<Animal>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut animal = state
        .db
        .get_animal(&animal_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("animal {}", animal_id)))?;

    if animal.shelter_id != auth.user_id {
        return Err(AppError::Forbidden);
    }

    if let Some(name) = payload.name {
        animal.name = name;
    }
    if payload.breed.is_some() {
        animal.breed = payload.breed;
    }
    if payload.age_months.is_some() {
        animal.age_months = payload.age_months;
    }
    if payload.description.is_some() {
        animal.description = payload.description;
    }
    animal.updated_at = format_utc_rfc3339(chrono::Utc::now());

    state.db.upsert_animal(&animal).await?;
    Ok(Json(animal))
}

/// Archive a listing. Records are kept (walks and activities reference them)
/// but the animal disappears from browse results.
async fn archive_animal(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(animal_id): Path<String>,
) -> Result<StatusCode> {
    let mut animal = state
        .db
        .get_animal(&animal_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("animal {}", animal_id)))?;

    if animal.shelter_id != auth.user_id {
        return Err(AppError::Forbidden);
    }

    animal.status = AnimalStatus::Archived;
    animal.updated_at = format_utc_rfc3339(chrono::Utc::now());
    state.db.upsert_animal(&animal).await?;

    tracing::info!(animal_id = %animal_id, "Animal archived");
    Ok(StatusCode::NO_CONTENT)
}
