//! Moderation Service
//!
//! The persistence half of the moderation controller: idempotent ban
//! records and topic history clearing. Fan-out and forced disconnection
//! live in the websocket gateway.

use std::sync::Arc;

use crate::domain::{BanRepository, MessageRepository, TopicRepository, User, UserRepository};
use crate::shared::error::AppError;

const DEFAULT_BAN_REASON: &str = "Banned by admin";

#[derive(Clone)]
pub struct ModerationService {
    users: Arc<dyn UserRepository>,
    bans: Arc<dyn BanRepository>,
    messages: Arc<dyn MessageRepository>,
    topics: Arc<dyn TopicRepository>,
}

impl ModerationService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        bans: Arc<dyn BanRepository>,
        messages: Arc<dyn MessageRepository>,
        topics: Arc<dyn TopicRepository>,
    ) -> Self {
        Self { users, bans, messages, topics }
    }

    /// Record a ban for the user behind a pseudonymous handle. A repeat ban
    /// is a no-op. Returns the target user, or None for an unknown handle.
    pub async fn ban_by_handle(
        &self,
        handle: i64,
        reason: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        let Some(target) = self.users.find_by_handle(handle).await? else {
            return Ok(None);
        };

        let newly = self
            .bans
            .insert_ignore(target.id, reason.unwrap_or(DEFAULT_BAN_REASON))
            .await?;

        if newly {
            tracing::info!(user_id = target.id, handle = handle, "User banned");
        } else {
            tracing::debug!(user_id = target.id, handle = handle, "Repeat ban ignored");
        }

        Ok(Some(target))
    }

    /// Delete every message in a topic. Returns the number of rows removed.
    /// The topic must exist; the scope of the mutation always matches the
    /// scope of the notification the caller sends.
    pub async fn clear_topic(&self, topic_id: i64) -> Result<u64, AppError> {
        if self.topics.find_by_id(topic_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Topic {} not found", topic_id)));
        }

        let removed = self.messages.delete_by_topic(topic_id).await?;
        tracing::info!(topic_id = topic_id, removed = removed, "Topic history cleared");
        Ok(removed)
    }
}
