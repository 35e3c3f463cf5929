//! Admin User Handlers
//!
//! Account management behind the admin guard middleware.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::CreateUserRequest;
use crate::application::dto::response::UserResponse;
use crate::domain::Role;
use crate::shared::error::AppError;
use crate::startup::AppState;

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = state.users.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let role = body.role.as_deref().map(Role::from_str).unwrap_or_default();

    let user = state
        .users
        .create_user(&body.username, &body.password, role)
        .await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.users.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
