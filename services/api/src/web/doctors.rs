//! services/api/src/web/doctors.rs
//!
//! Public, read-only doctor directory: search and lookup by id.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use clinic_core::domain::DoctorSummary;

use crate::web::error::AppError;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, IntoParams)]
pub struct DoctorSearchParams {
    /// Case-insensitive substring matched against first OR last name.
    pub name: Option<String>,
    /// Case-insensitive substring matched against the specialization name.
    pub specialization: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct DoctorResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub specialization: Option<String>,
    pub license_number: String,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub consultation_fee: Option<f64>,
    pub years_of_experience: Option<i32>,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<DoctorSummary> for DoctorResponse {
    fn from(summary: DoctorSummary) -> Self {
        Self {
            id: summary.id,
            user_id: summary.user_id,
            specialization: summary.specialization,
            license_number: summary.license_number,
            bio: summary.bio,
            phone: summary.phone,
            consultation_fee: summary.consultation_fee,
            years_of_experience: summary.years_of_experience,
            first_name: summary.first_name,
            last_name: summary.last_name,
            created_at: summary.created_at,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /doctors/search - Filter doctors by name and/or specialization
///
/// Unauthenticated. Filters combine with AND; no pagination, the full
/// result set is returned.
#[utoipa::path(
    get,
    path = "/doctors/search",
    params(DoctorSearchParams),
    responses(
        (status = 200, description = "Matching doctors", body = [DoctorResponse]),
    )
)]
pub async fn search_doctors_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DoctorSearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let doctors = state
        .repo
        .search_doctors(params.name.as_deref(), params.specialization.as_deref())
        .await?;
    let body: Vec<DoctorResponse> = doctors.into_iter().map(DoctorResponse::from).collect();
    Ok(Json(body))
}

/// GET /doctors/{id} - A single doctor summary
#[utoipa::path(
    get,
    path = "/doctors/{id}",
    params(("id" = Uuid, Path, description = "Doctor id")),
    responses(
        (status = 200, description = "Doctor summary", body = DoctorResponse),
        (status = 404, description = "Doctor not found"),
    )
)]
pub async fn get_doctor_handler(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let doctor = state
        .repo
        .doctor_summary_by_id(doctor_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Doctor not found".to_string()))?;
    Ok(Json(DoctorResponse::from(doctor)))
}
