pub mod appointments;
pub mod auth;
pub mod availability;
pub mod doc;
pub mod doctors;
pub mod error;
pub mod medical_records;
pub mod middleware;
pub mod state;

use axum::{
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use state::AppState;

/// GET / - Welcome banner
async fn root_handler() -> impl IntoResponse {
    Json(json!({ "message": "Welcome to HealthCare API" }))
}

/// GET /health - Liveness probe
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

/// Builds the full application router: public routes, and protected
/// routes behind the bearer-token middleware. CORS and Swagger UI are
/// layered on by the binary.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/doctors/search", get(doctors::search_doctors_handler))
        .route("/doctors/{id}", get(doctors::get_doctor_handler));

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route(
            "/auth/profile",
            get(auth::get_profile_handler).put(auth::update_profile_handler),
        )
        .route("/auth/change-password", post(auth::change_password_handler))
        .route(
            "/appointments",
            post(appointments::book_appointment_handler),
        )
        .route(
            "/appointments/my",
            get(appointments::my_appointments_handler),
        )
        .route(
            "/appointments/{id}/status",
            patch(appointments::update_appointment_status_handler),
        )
        .route(
            "/availability/my",
            get(availability::my_availability_handler),
        )
        .route("/availability", post(availability::add_availability_handler))
        .route(
            "/availability/{id}",
            delete(availability::delete_availability_handler),
        )
        .route(
            "/medical-records/my",
            get(medical_records::my_medical_records_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}
