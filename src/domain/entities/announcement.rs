//! Announcement entity and repository trait.
//!
//! Append-only broadcast log; rows are never mutated or deleted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: i64,
    pub content: String,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    /// Append an announcement, returning the stored row.
    async fn create(&self, content: &str, author_id: i64) -> Result<Announcement, AppError>;

    /// List announcements, newest first.
    async fn list(&self) -> Result<Vec<Announcement>, AppError>;
}
