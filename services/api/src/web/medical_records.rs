//! services/api/src/web/medical_records.rs
//!
//! Read-only, role-gated retrieval of a patient's medical records.

use axum::{
    extract::{Extension, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use clinic_core::domain::{MedicalRecordEntry, Role};

use crate::auth::Claims;
use crate::web::error::AppError;
use crate::web::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct MedicalRecordResponse {
    pub id: i64,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub title: String,
    pub diagnosis: String,
    pub treatment: String,
    pub prescription: Option<String>,
    pub notes: Option<String>,
    pub date: NaiveDate,
    pub doctor_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<MedicalRecordEntry> for MedicalRecordResponse {
    fn from(record: MedicalRecordEntry) -> Self {
        Self {
            id: record.id,
            patient_id: record.patient_id,
            doctor_id: record.doctor_id,
            title: record.title,
            diagnosis: record.diagnosis,
            treatment: record.treatment,
            prescription: record.prescription,
            notes: record.notes,
            date: record.date,
            doctor_name: record.doctor_name,
            created_at: record.created_at,
        }
    }
}

/// GET /medical-records/my - The caller's medical records
///
/// Patients only; a patient token without a profile row gets an empty
/// list. Ordered by record date, most recent first.
#[utoipa::path(
    get,
    path = "/medical-records/my",
    responses(
        (status = 200, description = "Medical records, date descending", body = [MedicalRecordResponse]),
        (status = 403, description = "Caller is not a patient"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_medical_records_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    if claims.role != Role::Patient {
        return Err(AppError::Forbidden(
            "Only patients can access medical records".to_string(),
        ));
    }

    let records = match state.repo.patient_by_user_id(claims.user_id).await? {
        Some(patient) => state.repo.medical_records_for_patient(patient.id).await?,
        None => Vec::new(),
    };

    let body: Vec<MedicalRecordResponse> = records
        .into_iter()
        .map(MedicalRecordResponse::from)
        .collect();
    Ok(Json(body))
}
