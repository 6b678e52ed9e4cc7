//! services/api/src/web/error.rs
//!
//! The request-level error type. Every handler failure maps onto one of
//! four client-visible categories plus an internal catch-all, rendered as
//! a JSON body of the shape `{"detail": "..."}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use clinic_core::ports::PortError;
use serde_json::json;
use tracing::error;

use crate::auth::AuthError;

/// Errors a request can surface to the client.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed or missing input (400).
    #[error("{0}")]
    Validation(String),

    /// Bad credentials or an invalid/expired token (401).
    #[error("{0}")]
    Authentication(String),

    /// Valid identity, but wrong role or not the resource owner (403).
    #[error("{0}")]
    Forbidden(String),

    /// Resource absent (404).
    #[error("{0}")]
    NotFound(String),

    /// Anything the caller cannot act on (500).
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(ref detail) = self {
            error!("Internal error while handling request: {}", detail);
        }
        let body = json!({ "detail": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

impl From<PortError> for AppError {
    fn from(e: PortError) -> Self {
        match e {
            PortError::NotFound(msg) => AppError::NotFound(msg),
            PortError::Conflict(msg) => AppError::Validation(msg),
            PortError::Unexpected(msg) => AppError::Internal(msg),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Authentication(e.to_string())
    }
}
