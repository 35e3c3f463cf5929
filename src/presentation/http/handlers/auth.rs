//! Authentication Handlers

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::application::dto::request::{LoginRequest, RegisterRequest};
use crate::application::dto::response::{LoginResponse, UserResponse};
use crate::application::services::{Claim, Verdict};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Login with username and password. The issued token is the plaintext
/// password, re-hashed server-side on every admin call.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let claim = Claim::Username(body.name.clone());
    match state.auth.verify(claim, &body.password).await? {
        Verdict::Authenticated(user) => Ok(Json(LoginResponse {
            success: true,
            token: body.password,
            role: user.role.as_str().to_string(),
            anonymous_id: user.handle,
            user_id: user.id,
        })),
        Verdict::InvalidCredentials => Err(AppError::Unauthorized("Invalid credentials".into())),
        Verdict::Banned => Err(AppError::Forbidden(
            "Your account has been suspended".into(),
        )),
    }
}

/// Public self-registration.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = state.users.register(&body.username, &body.password).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}
