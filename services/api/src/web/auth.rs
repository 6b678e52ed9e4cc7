//! services/api/src/web/auth.rs
//!
//! Authentication and account endpoints: registration, login, current-user
//! lookup, profile read/update, and password change.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
    Form, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use clinic_core::domain::{NewUser, ProfileUpdate, Role, User};

use crate::auth::{hash_password, issue_token, verify_password, Claims};
use crate::web::error::AppError;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[schema(value_type = String)]
    pub role: Role,
    /// Doctor registrations only.
    pub specialization: Option<String>,
    /// Doctor registrations only; required and globally unique.
    pub license_number: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    /// The account email address.
    pub username: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[schema(value_type = String)]
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user_id: Uuid,
    pub email: String,
    #[schema(value_type = String)]
    pub role: Role,
    pub name: String,
    pub profile_picture: Option<String>,
}

/// The merged user + role-profile view returned by GET /auth/profile.
#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[schema(value_type = String)]
    pub role: Role,
    pub profile_picture: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub blood_type: Option<String>,
    pub allergies: Option<String>,
    pub emergency_contact: Option<String>,
    pub bio: Option<String>,
    pub license_number: Option<String>,
    pub specialization: Option<String>,
    pub consultation_fee: Option<f64>,
    pub years_of_experience: Option<i32>,
}

#[derive(Deserialize, ToSchema)]
pub struct ProfileUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_picture: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub blood_type: Option<String>,
    pub allergies: Option<String>,
    pub emergency_contact: Option<String>,
    pub bio: Option<String>,
    pub consultation_fee: Option<f64>,
    pub years_of_experience: Option<i32>,
}

#[derive(Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/register - Create a new user account with its role profile
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created successfully", body = UserResponse),
        (status = 400, description = "Duplicate email, duplicate license, or missing license for a doctor"),
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.role == Role::Doctor {
        match req.license_number.as_deref() {
            Some(license) if !license.trim().is_empty() => {}
            _ => {
                return Err(AppError::Validation(
                    "License number is required for doctors".to_string(),
                ))
            }
        }
    }

    let hashed_password = hash_password(&req.password)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))?;

    let user = state
        .repo
        .create_user(NewUser {
            email: req.email,
            hashed_password,
            role: req.role,
            first_name: req.first_name,
            last_name: req.last_name,
            license_number: req.license_number,
            specialization: req.specialization,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from_user(&user))))
}

/// POST /auth/login - Exchange credentials for an access token
#[utoipa::path(
    post,
    path = "/auth/login",
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Inactive account"),
        (status = 401, description = "Invalid credentials"),
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Form(req): Form<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.repo.user_by_email(&req.username).await?;

    // A missing account and a wrong password produce the same message.
    let user = match user {
        Some(u) if verify_password(&req.password, &u.hashed_password) => u,
        _ => {
            return Err(AppError::Authentication(
                "Incorrect email or password".to_string(),
            ))
        }
    };

    if !user.is_active {
        return Err(AppError::Validation("Inactive user".to_string()));
    }

    let access_token = issue_token(
        &user.email,
        user.id,
        user.role,
        &state.config.secret_key,
        state.config.token_ttl_minutes,
    )
    .map_err(|_| AppError::Internal("Failed to issue token".to_string()))?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        user_id: user.id,
        email: user.email.clone(),
        role: user.role,
        name: user.full_name(),
        profile_picture: user.profile_picture,
    }))
}

/// GET /auth/me - Summary of the authenticated user
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Invalid or expired token"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&state, &claims).await?;
    Ok(Json(UserResponse::from_user(&user)))
}

/// GET /auth/profile - Merged user and role-profile fields
#[utoipa::path(
    get,
    path = "/auth/profile",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Invalid or expired token"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&state, &claims).await?;

    let mut profile = ProfileResponse {
        id: user.id,
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        role: user.role,
        profile_picture: user.profile_picture.clone(),
        phone: None,
        address: None,
        date_of_birth: None,
        blood_type: None,
        allergies: None,
        emergency_contact: None,
        bio: None,
        license_number: None,
        specialization: None,
        consultation_fee: None,
        years_of_experience: None,
    };

    match user.role {
        Role::Patient => {
            if let Some(patient) = state.repo.patient_by_user_id(user.id).await? {
                profile.phone = patient.phone;
                profile.address = patient.address;
                profile.date_of_birth = patient.date_of_birth;
                profile.blood_type = patient.blood_type;
                profile.allergies = patient.allergies;
                profile.emergency_contact = patient.emergency_contact;
            }
        }
        Role::Doctor => {
            if let Some(doctor) = state.repo.doctor_by_user_id(user.id).await? {
                profile.phone = doctor.phone;
                profile.bio = doctor.bio;
                profile.license_number = Some(doctor.license_number);
                profile.consultation_fee = doctor.consultation_fee;
                profile.years_of_experience = doctor.years_of_experience;
                if let Some(spec_id) = doctor.specialization_id {
                    profile.specialization = state
                        .repo
                        .specialization_by_id(spec_id)
                        .await?
                        .map(|s| s.name);
                }
            }
        }
    }

    Ok(Json(profile))
}

/// PUT /auth/profile - Partial update of user and role-profile fields
#[utoipa::path(
    put,
    path = "/auth/profile",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated"),
        (status = 401, description = "Invalid or expired token"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&state, &claims).await?;

    state
        .repo
        .update_profile(
            user.id,
            user.role,
            ProfileUpdate {
                first_name: req.first_name,
                last_name: req.last_name,
                profile_picture: req.profile_picture,
                phone: req.phone,
                address: req.address,
                date_of_birth: req.date_of_birth,
                blood_type: req.blood_type,
                allergies: req.allergies,
                emergency_contact: req.emergency_contact,
                bio: req.bio,
                consultation_fee: req.consultation_fee,
                years_of_experience: req.years_of_experience,
            },
        )
        .await?;

    Ok(Json(json!({ "message": "Profile updated successfully" })))
}

/// POST /auth/change-password - Rotate the account password
#[utoipa::path(
    post,
    path = "/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Wrong current password or new password too short"),
        (status = 401, description = "Invalid or expired token"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_password_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&state, &claims).await?;

    if !verify_password(&req.current_password, &user.hashed_password) {
        return Err(AppError::Validation(
            "Current password is incorrect".to_string(),
        ));
    }
    if req.new_password.len() < 6 {
        return Err(AppError::Validation(
            "New password must be at least 6 characters".to_string(),
        ));
    }

    let hashed = hash_password(&req.new_password)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))?;
    state.repo.update_user_password(user.id, &hashed).await?;

    Ok(Json(json!({ "message": "Password changed successfully" })))
}

/// Resolves the token's user against the store. A valid token whose user
/// row has disappeared is treated as an authentication failure.
async fn current_user(state: &AppState, claims: &Claims) -> Result<User, AppError> {
    state
        .repo
        .user_by_id(claims.user_id)
        .await?
        .ok_or_else(|| AppError::Authentication("User not found".to_string()))
}
