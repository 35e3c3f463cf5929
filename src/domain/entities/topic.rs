//! Topic entity and repository trait.
//!
//! A topic is a named, independently-themed chat room: the unit of message
//! partitioning and room membership. Maps to the `topics` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Slug of the default topic. Seeded at startup and never deletable.
pub const GLOBAL_SLUG: &str = "global";

/// Represents a chat topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    /// Topic id (primary key)
    pub id: i64,

    /// Unique display name
    pub name: String,

    /// Unique URL-safe slug derived from the name
    pub slug: String,

    /// Optional description shown in the topic list
    pub description: Option<String>,

    /// Visual theming attributes
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub accent_color: Option<String>,
    pub username_color: Option<String>,
    pub animation: Option<String>,

    /// Internal id of the creating admin, if known
    pub creator_id: Option<i64>,

    pub created_at: DateTime<Utc>,
}

impl Topic {
    /// The global topic can never be deleted.
    pub fn is_global(&self) -> bool {
        self.slug == GLOBAL_SLUG
    }
}

/// Fields required to create a topic row.
#[derive(Debug, Clone)]
pub struct NewTopic {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub accent_color: Option<String>,
    pub username_color: Option<String>,
    pub animation: Option<String>,
    pub creator_id: Option<i64>,
}

/// Partial update for a topic. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TopicPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub accent_color: Option<String>,
    pub username_color: Option<String>,
    pub animation: Option<String>,
}

/// Repository trait for Topic data access operations.
#[async_trait]
pub trait TopicRepository: Send + Sync {
    /// Find a topic by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Topic>, AppError>;

    /// Find a topic by slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Topic>, AppError>;

    /// List all topics, oldest first.
    async fn list(&self) -> Result<Vec<Topic>, AppError>;

    /// Create a new topic, returning the stored row.
    async fn create(&self, topic: &NewTopic) -> Result<Topic, AppError>;

    /// Apply a partial update; returns the updated row, or None if the topic
    /// does not exist.
    async fn update(&self, id: i64, patch: &TopicPatch) -> Result<Option<Topic>, AppError>;

    /// Delete a topic and all of its messages. Returns the number of topic
    /// rows removed (0 or 1). Callers must refuse the global topic first.
    async fn delete(&self, id: i64) -> Result<u64, AppError>;

    /// Check if a slug is already in use.
    async fn slug_exists(&self, slug: &str) -> Result<bool, AppError>;
}
