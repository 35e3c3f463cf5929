//! HTTP Response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Announcement, Topic, User};

/// Successful login response. The token is the plaintext password reused as
/// a bearer credential, re-hashed server-side on every admin call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub role: String,
    pub anonymous_id: i64,
    pub user_id: i64,
}

/// Public view of a user account. Never exposes the password digest.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub anonymous_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role.as_str().to_string(),
            anonymous_id: user.handle,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub accent_color: Option<String>,
    pub username_color: Option<String>,
    pub animation: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Topic> for TopicResponse {
    fn from(topic: Topic) -> Self {
        Self {
            id: topic.id,
            name: topic.name,
            slug: topic.slug,
            description: topic.description,
            background_color: topic.background_color,
            text_color: topic.text_color,
            accent_color: topic.accent_color,
            username_color: topic.username_color,
            animation: topic.animation,
            created_at: topic.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementResponse {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Announcement> for AnnouncementResponse {
    fn from(a: Announcement) -> Self {
        Self {
            id: a.id,
            content: a.content,
            created_at: a.created_at,
        }
    }
}
