//! services/api/src/web/doc.rs
//!
//! Master definition for the OpenAPI specification.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::web::{appointments, auth, availability, doctors, medical_records};

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_handler,
        auth::login_handler,
        auth::me_handler,
        auth::get_profile_handler,
        auth::update_profile_handler,
        auth::change_password_handler,
        appointments::book_appointment_handler,
        appointments::my_appointments_handler,
        appointments::update_appointment_status_handler,
        availability::my_availability_handler,
        availability::add_availability_handler,
        availability::delete_availability_handler,
        doctors::search_doctors_handler,
        doctors::get_doctor_handler,
        medical_records::my_medical_records_handler,
    ),
    components(
        schemas(
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::UserResponse,
            auth::TokenResponse,
            auth::ProfileResponse,
            auth::ProfileUpdateRequest,
            auth::ChangePasswordRequest,
            appointments::BookAppointmentRequest,
            appointments::AppointmentUpdateRequest,
            appointments::AppointmentResponse,
            availability::AvailabilityCreateRequest,
            availability::AvailabilityResponse,
            doctors::DoctorResponse,
            medical_records::MedicalRecordResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "HealthCare API", description = "Appointment management endpoints for patients and doctors.")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
