//! Admin Guard
//!
//! Validates the admin bearer token: the plaintext admin password, re-hashed
//! and matched against an admin row on every call. No session state is kept
//! server-side.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::domain::User;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Authenticated admin extension inserted by [`admin_guard`].
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub user_id: i64,
    pub username: String,
}

/// Resolve the admin behind a request's bearer token.
pub async fn require_admin(
    state: &AppState,
    headers: &axum::http::HeaderMap,
) -> Result<User, AppError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

    state
        .auth
        .verify_admin(token)
        .await?
        .ok_or_else(|| AppError::Forbidden("Admin access required".into()))
}

/// Middleware form of the guard for admin-only route trees.
pub async fn admin_guard(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let admin = require_admin(&state, request.headers()).await?;
    request.extensions_mut().insert(AdminUser {
        user_id: admin.id,
        username: admin.username,
    });
    Ok(next.run(request).await)
}
