// SPDX-License-Identifier: MIT

//! Activity scheduling routes: booked-date calendars and booking commits.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::ScheduledActivity;
use crate::services::schedule::{is_active_on, validate_booking, BookedDates, ProposedBooking, ShelterHours};
use crate::time_utils::{format_iso_date, format_utc_rfc3339, parse_iso_date};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activities", get(list_my_activities))
        .route(
            "/api/animals/{animal_id}/booked-dates",
            get(get_booked_dates),
        )
        .route(
            "/api/animals/{animal_id}/activities",
            post(create_activity),
        )
}

#[derive(Debug, Serialize)]
pub struct BookedDatesResponse {
    /// Reserved days in ascending order, `YYYY-MM-DD`
    pub booked_dates: Vec<String>,
}

/// Days already reserved for an animal, for the client's calendar.
async fn get_booked_dates(
    State(state): State<Arc<AppState>>,
    Path(animal_id): Path<String>,
) -> Result<Json<BookedDatesResponse>> {
    state
        .db
        .get_animal(&animal_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("animal {}", animal_id)))?;

    let activities = state.db.get_activities_for_animal(&animal_id).await?;
    let booked = BookedDates::from_activities(&activities);

    Ok(Json(BookedDatesResponse {
        booked_dates: booked.dates().map(format_iso_date).collect(),
    }))
}

/// The caller's committed bookings, earliest first.
async fn list_my_activities(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<ScheduledActivity>>> {
    let activities = state.db.get_activities_for_user(&auth.user_id).await?;
    Ok(Json(activities))
}

#[derive(Debug, Deserialize)]
pub struct CreateActivityRequest {
    /// First reserved day (inclusive), `YYYY-MM-DD`
    pub start_date: String,
    /// Last reserved day (inclusive), `YYYY-MM-DD`
    pub end_date: String,
    /// Pickup time on the start day, `HH:mm` or `HH:mm:ss`
    pub pickup_time: String,
    /// Delivery time on the end day, `HH:mm` or `HH:mm:ss`
    pub delivery_time: String,
}

fn parse_wire_time(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| AppError::BadRequest(format!("Invalid time: {}", raw)))
}

/// Commit a pickup/delivery booking after running all scheduling gates.
async fn create_activity(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(animal_id): Path<String>,
    Json(payload): Json<CreateActivityRequest>,
) -> Result<(StatusCode, Json<ScheduledActivity>)> {
    let start_date = parse_iso_date(&payload.start_date)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid date: {}", payload.start_date)))?;
    let end_date = parse_iso_date(&payload.end_date)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid date: {}", payload.end_date)))?;
    let pickup_time = parse_wire_time(&payload.pickup_time)?;
    let delivery_time = parse_wire_time(&payload.delivery_time)?;

    let animal = state
        .db
        .get_animal(&animal_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("animal {}", animal_id)))?;

    if !animal.is_kept_by(&auth.user_id) {
        return Err(AppError::Forbidden);
    }

    let now = Utc::now();
    let existing = state.db.get_activities_for_animal(&animal_id).await?;
    let booked = BookedDates::from_activities(&existing);
    let has_active = existing
        .iter()
        .any(|a| is_active_on(a, now.date_naive()));

    let booking = ProposedBooking {
        start_date,
        end_date,
        pickup_time,
        delivery_time,
    };
    let hours = ShelterHours {
        opens_at: state.config.shelter_opens_at,
        closes_at: state.config.shelter_closes_at,
    };
    validate_booking(&booking, &booked, &hours, has_active, now)?;

    let activity = ScheduledActivity {
        activity_id: uuid::Uuid::new_v4().to_string(),
        animal_id: animal.animal_id,
        user_id: auth.user_id,
        start_date: format_iso_date(start_date),
        end_date: format_iso_date(end_date),
        pickup_time: pickup_time.format("%H:%M:%S").to_string(),
        delivery_time: delivery_time.format("%H:%M:%S").to_string(),
        created_at: format_utc_rfc3339(now),
    };

    state.db.commit_activity_atomic(&activity).await?;

    Ok((StatusCode::CREATED, Json(activity)))
}
