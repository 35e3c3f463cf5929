//! Announcement Handlers

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::application::dto::request::CreateAnnouncementRequest;
use crate::application::dto::response::AnnouncementResponse;
use crate::presentation::middleware::require_admin;
use crate::presentation::websocket::ServerEvent;
use crate::shared::error::AppError;
use crate::startup::AppState;

pub async fn list_announcements(
    State(state): State<AppState>,
) -> Result<Json<Vec<AnnouncementResponse>>, AppError> {
    let announcements = state.announcements.list().await?;
    Ok(Json(
        announcements
            .into_iter()
            .map(AnnouncementResponse::from)
            .collect(),
    ))
}

pub async fn create_announcement(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    Json(body): Json<CreateAnnouncementRequest>,
) -> Result<(StatusCode, Json<AnnouncementResponse>), AppError> {
    let admin = require_admin(&state, &headers).await?;
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let announcement = state.announcements.create(&body.content, admin.id).await?;
    let response = AnnouncementResponse::from(announcement);
    state
        .gateway
        .broadcast_all(ServerEvent::NewAnnouncement(response.clone()));
    Ok((StatusCode::CREATED, Json(response)))
}
