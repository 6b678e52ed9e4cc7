//! services/api/src/web/availability.rs
//!
//! CRUD over a doctor's weekly recurring time slots.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use clinic_core::domain::{Availability, Doctor, NewAvailability, Role};

use crate::auth::Claims;
use crate::web::error::AppError;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct AvailabilityCreateRequest {
    pub day_of_week: String,
    #[schema(value_type = String, example = "09:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "17:00:00")]
    pub end_time: NaiveTime,
}

#[derive(Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub id: i64,
    pub doctor_id: Uuid,
    pub day_of_week: String,
    #[schema(value_type = String)]
    pub start_time: NaiveTime,
    #[schema(value_type = String)]
    pub end_time: NaiveTime,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Availability> for AvailabilityResponse {
    fn from(slot: Availability) -> Self {
        Self {
            id: slot.id,
            doctor_id: slot.doctor_id,
            day_of_week: slot.day_of_week,
            start_time: slot.start_time,
            end_time: slot.end_time,
            is_available: slot.is_available,
            created_at: slot.created_at,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /availability/my - The caller's availability slots
///
/// Slots are ordered by day_of_week lexically, not in calendar order.
#[utoipa::path(
    get,
    path = "/availability/my",
    responses(
        (status = 200, description = "Availability slots", body = [AvailabilityResponse]),
        (status = 403, description = "Caller is not a doctor"),
        (status = 404, description = "No doctor profile"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_availability_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let doctor = current_doctor(&state, &claims).await?;
    let slots = state.repo.availability_for_doctor(doctor.id).await?;
    let body: Vec<AvailabilityResponse> =
        slots.into_iter().map(AvailabilityResponse::from).collect();
    Ok(Json(body))
}

/// POST /availability - Add a weekly slot
#[utoipa::path(
    post,
    path = "/availability",
    request_body = AvailabilityCreateRequest,
    responses(
        (status = 201, description = "Slot created", body = AvailabilityResponse),
        (status = 400, description = "Start time does not precede end time"),
        (status = 403, description = "Caller is not a doctor"),
        (status = 404, description = "No doctor profile"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_availability_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AvailabilityCreateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let doctor = current_doctor(&state, &claims).await?;

    if req.start_time >= req.end_time {
        return Err(AppError::Validation(
            "Start time must be before end time".to_string(),
        ));
    }

    let slot = state
        .repo
        .create_availability(NewAvailability {
            doctor_id: doctor.id,
            day_of_week: req.day_of_week.to_lowercase(),
            start_time: req.start_time,
            end_time: req.end_time,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AvailabilityResponse::from(slot))))
}

/// DELETE /availability/{id} - Remove a slot owned by the caller
///
/// A slot that exists but belongs to another doctor reports the same 404
/// as a slot that does not exist.
#[utoipa::path(
    delete,
    path = "/availability/{id}",
    params(("id" = i64, Path, description = "Availability slot id")),
    responses(
        (status = 204, description = "Slot deleted"),
        (status = 403, description = "Caller is not a doctor"),
        (status = 404, description = "Slot not found or not owned"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_availability_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(availability_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let doctor = current_doctor(&state, &claims).await?;

    let deleted = state
        .repo
        .delete_availability(availability_id, doctor.id)
        .await?;
    if !deleted {
        return Err(AppError::NotFound(
            "Availability slot not found".to_string(),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Resolves the caller's doctor profile: wrong role is 403, a missing
/// profile row for a doctor token is 404.
async fn current_doctor(state: &AppState, claims: &Claims) -> Result<Doctor, AppError> {
    if claims.role != Role::Doctor {
        return Err(AppError::Forbidden(
            "Only doctors can manage availability".to_string(),
        ));
    }
    state
        .repo
        .doctor_by_user_id(claims.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Doctor profile not found".to_string()))
}
