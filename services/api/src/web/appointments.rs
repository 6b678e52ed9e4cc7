//! services/api/src/web/appointments.rs
//!
//! The appointment lifecycle: booking, role-filtered listing, and status
//! updates by either owner.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use clinic_core::domain::{
    AppointmentDetail, AppointmentPatch, AppointmentStatus, NewAppointment, Role,
};

use crate::auth::Claims;
use crate::web::error::AppError;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    #[schema(value_type = String, example = "09:00:00")]
    pub time: NaiveTime,
    pub reason: String,
}

/// Partial status update. An omitted field is left unchanged; a supplied
/// value is applied even when it is an empty string.
#[derive(Deserialize, ToSchema)]
pub struct AppointmentUpdateRequest {
    /// One of `pending`, `confirmed`, `cancelled`, `completed` (any case).
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AppointmentResponse {
    pub id: i64,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    #[schema(value_type = String)]
    pub time: NaiveTime,
    #[schema(value_type = String)]
    pub status: AppointmentStatus,
    pub reason: String,
    pub notes: Option<String>,
    pub patient_name: String,
    pub doctor_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<AppointmentDetail> for AppointmentResponse {
    fn from(detail: AppointmentDetail) -> Self {
        Self {
            id: detail.id,
            patient_id: detail.patient_id,
            doctor_id: detail.doctor_id,
            date: detail.date,
            time: detail.time,
            status: detail.status,
            reason: detail.reason,
            notes: detail.notes,
            patient_name: detail.patient_name,
            doctor_name: detail.doctor_name,
            created_at: detail.created_at,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /appointments - Book an appointment with a doctor
///
/// There is no overlap check against availability or existing
/// appointments; double-booking the same slot is accepted.
#[utoipa::path(
    post,
    path = "/appointments",
    request_body = BookAppointmentRequest,
    responses(
        (status = 201, description = "Appointment created in pending status", body = AppointmentResponse),
        (status = 403, description = "Caller is not a patient"),
        (status = 404, description = "Patient profile or doctor missing"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn book_appointment_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<BookAppointmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if claims.role != Role::Patient {
        return Err(AppError::Forbidden(
            "Only patients can book appointments".to_string(),
        ));
    }

    let patient = state
        .repo
        .patient_by_user_id(claims.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Patient profile not found".to_string()))?;

    let doctor = state
        .repo
        .doctor_summary_by_id(req.doctor_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Doctor not found".to_string()))?;

    let detail = state
        .repo
        .create_appointment(NewAppointment {
            patient_id: patient.id,
            doctor_id: doctor.id,
            date: req.date,
            time: req.time,
            reason: req.reason,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AppointmentResponse::from(detail)),
    ))
}

/// GET /appointments/my - Appointments owned by the caller
///
/// Patients see their own bookings; doctors see their schedule. A caller
/// without a role profile gets an empty list, never an error.
#[utoipa::path(
    get,
    path = "/appointments/my",
    responses(
        (status = 200, description = "Appointments ordered by date then time, most recent first", body = [AppointmentResponse]),
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_appointments_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let appointments = match claims.role {
        Role::Patient => match state.repo.patient_by_user_id(claims.user_id).await? {
            Some(patient) => state.repo.appointments_for_patient(patient.id).await?,
            None => Vec::new(),
        },
        Role::Doctor => match state.repo.doctor_by_user_id(claims.user_id).await? {
            Some(doctor) => state.repo.appointments_for_doctor(doctor.id).await?,
            None => Vec::new(),
        },
    };

    let body: Vec<AppointmentResponse> = appointments
        .into_iter()
        .map(AppointmentResponse::from)
        .collect();
    Ok(Json(body))
}

/// PATCH /appointments/{id}/status - Update status and/or notes
#[utoipa::path(
    patch,
    path = "/appointments/{id}/status",
    request_body = AppointmentUpdateRequest,
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Updated appointment", body = AppointmentResponse),
        (status = 400, description = "Unknown status value"),
        (status = 403, description = "Caller owns neither side of the appointment"),
        (status = 404, description = "Appointment not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_appointment_status_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(appointment_id): Path<i64>,
    Json(req): Json<AppointmentUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = state
        .repo
        .appointment_by_id(appointment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;

    // Ownership: the caller's role profile must match the appointment's
    // corresponding foreign key.
    let is_owner = match claims.role {
        Role::Patient => state
            .repo
            .patient_by_user_id(claims.user_id)
            .await?
            .is_some_and(|p| p.id == appointment.patient_id),
        Role::Doctor => state
            .repo
            .doctor_by_user_id(claims.user_id)
            .await?
            .is_some_and(|d| d.id == appointment.doctor_id),
    };
    if !is_owner {
        return Err(AppError::Forbidden(
            "Not authorized to update this appointment".to_string(),
        ));
    }

    let status = req
        .status
        .map(|s| {
            s.parse::<AppointmentStatus>()
                .map_err(AppError::Validation)
        })
        .transpose()?;

    let detail = state
        .repo
        .update_appointment(
            appointment_id,
            AppointmentPatch {
                status,
                notes: req.notes,
            },
        )
        .await?;

    Ok(Json(AppointmentResponse::from(detail)))
}
