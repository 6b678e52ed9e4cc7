//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::verify_token;
use crate::web::error::AppError;
use crate::web::state::AppState;

/// Middleware that validates the bearer token and extracts its claims.
///
/// If valid, inserts the `Claims` into request extensions for handlers to
/// use. If missing, malformed, or expired, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 1. Extract the Authorization header
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Authentication("Not authenticated".to_string()))?;

    // 2. Strip the bearer scheme
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Authentication("Not authenticated".to_string()))?;

    // 3. Verify the signature and expiry
    let claims = verify_token(token, &state.config.secret_key)?;

    // 4. Insert the claims into request extensions
    req.extensions_mut().insert(claims);

    // 5. Continue to the handler
    Ok(next.run(req).await)
}
