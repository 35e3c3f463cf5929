//! HTTP Request DTOs

use serde::Deserialize;
use validator::Validate;

/// Login request body. `name` matches the historical client field name.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username and password required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Username and password required"))]
    pub password: String,
}

/// Public registration request body.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 32, message = "Username must be 3-32 characters"))]
    pub username: String,

    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Admin user-creation request body.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 32, message = "Username must be 3-32 characters"))]
    pub username: String,

    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters"))]
    pub password: String,

    /// Defaults to `user`.
    pub role: Option<String>,
}

/// Admin topic-creation request body.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTopicRequest {
    #[validate(length(min = 1, max = 64, message = "Topic name must be 1-64 characters"))]
    pub name: String,

    pub description: Option<String>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub accent_color: Option<String>,
    pub username_color: Option<String>,
    pub animation: Option<String>,
}

/// Admin topic-update request body. All fields optional (partial update).
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTopicRequest {
    #[validate(length(min = 1, max = 64, message = "Topic name must be 1-64 characters"))]
    pub name: Option<String>,

    pub description: Option<String>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub accent_color: Option<String>,
    pub username_color: Option<String>,
    pub animation: Option<String>,
}

/// Admin announcement request body.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAnnouncementRequest {
    #[validate(length(min = 1, max = 2000, message = "Content must be 1-2000 characters"))]
    pub content: String,
}
