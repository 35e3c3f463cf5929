//! Message entity and repository trait.
//!
//! Maps to the `messages` table. Every message belongs to exactly one topic.
//! The sender's pseudonymous handle is denormalized for display; handles are
//! immutable, so the copy never drifts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Represents a persisted chat message (the canonical record, as opposed to
/// a client's pre-persistence optimistic draft).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Server-assigned id (primary key)
    pub id: i64,

    /// Text content, or a URL/path denoting media
    pub content: String,

    /// Sender's internal account id
    pub sender_id: i64,

    /// Sender's pseudonymous handle at send time
    pub sender_handle: i64,

    /// Owning topic
    pub topic_id: i64,

    pub created_at: DateTime<Utc>,
}

/// Fields required to persist a message.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub content: String,
    pub sender_id: i64,
    pub sender_handle: i64,
    pub topic_id: i64,
}

/// Repository trait for Message data access operations.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find a message by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Message>, AppError>;

    /// The most recent `limit` messages for a topic, oldest first.
    async fn recent(&self, topic_id: i64, limit: i64) -> Result<Vec<Message>, AppError>;

    /// Persist a message, returning the stored row with its server-assigned
    /// id and timestamp.
    async fn create(&self, message: &NewMessage) -> Result<Message, AppError>;

    /// Delete a single message. Returns the number of rows removed.
    async fn delete(&self, id: i64) -> Result<u64, AppError>;

    /// Delete every message in a topic. Returns the number of rows removed.
    async fn delete_by_topic(&self, topic_id: i64) -> Result<u64, AppError>;
}
