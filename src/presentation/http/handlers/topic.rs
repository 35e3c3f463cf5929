//! Topic Handlers
//!
//! Public listing plus admin-gated mutations. Every successful mutation is
//! pushed to all connected clients through the gateway.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::{CreateTopicRequest, UpdateTopicRequest};
use crate::application::dto::response::TopicResponse;
use crate::application::services::TopicFields;
use crate::presentation::middleware::require_admin;
use crate::presentation::websocket::ServerEvent;
use crate::shared::error::AppError;
use crate::startup::AppState;

pub async fn list_topics(
    State(state): State<AppState>,
) -> Result<Json<Vec<TopicResponse>>, AppError> {
    let topics = state.topics.list().await?;
    Ok(Json(topics.into_iter().map(TopicResponse::from).collect()))
}

pub async fn create_topic(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    Json(body): Json<CreateTopicRequest>,
) -> Result<(StatusCode, Json<TopicResponse>), AppError> {
    let admin = require_admin(&state, &headers).await?;
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let topic = state
        .topics
        .create(
            &body.name,
            TopicFields {
                description: body.description,
                background_color: body.background_color,
                text_color: body.text_color,
                accent_color: body.accent_color,
                username_color: body.username_color,
                animation: body.animation,
            },
            admin.id,
        )
        .await?;

    let response = TopicResponse::from(topic);
    state
        .gateway
        .broadcast_all(ServerEvent::NewTopic(response.clone()));
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn update_topic(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTopicRequest>,
) -> Result<Json<TopicResponse>, AppError> {
    require_admin(&state, &headers).await?;
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let topic = state
        .topics
        .update(
            id,
            body.name,
            TopicFields {
                description: body.description,
                background_color: body.background_color,
                text_color: body.text_color,
                accent_color: body.accent_color,
                username_color: body.username_color,
                animation: body.animation,
            },
        )
        .await?;

    let response = TopicResponse::from(topic);
    state
        .gateway
        .broadcast_all(ServerEvent::TopicUpdated(response.clone()));
    Ok(Json(response))
}

pub async fn delete_topic(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    require_admin(&state, &headers).await?;

    let topic = state.topics.delete(id).await?;
    state
        .gateway
        .broadcast_all(ServerEvent::TopicDeleted { topic_id: topic.id });
    Ok(StatusCode::NO_CONTENT)
}
