//! Message Service
//!
//! The persistence half of the message pipeline: resolve the target topic,
//! persist the canonical record, read history, and delete with the
//! sender-or-admin rule. Fan-out lives in the websocket gateway.

use std::sync::Arc;

use crate::domain::{
    Message, MessageRepository, NewMessage, Topic, TopicRepository, GLOBAL_SLUG,
};
use crate::shared::error::AppError;

/// Maximum accepted message length, in bytes.
pub const MAX_CONTENT_LEN: usize = 2000;

#[derive(Clone)]
pub struct MessageService {
    messages: Arc<dyn MessageRepository>,
    topics: Arc<dyn TopicRepository>,
}

impl MessageService {
    pub fn new(messages: Arc<dyn MessageRepository>, topics: Arc<dyn TopicRepository>) -> Self {
        Self { messages, topics }
    }

    /// Resolve the topic a send targets: an explicit id, or `global`.
    pub async fn resolve_topic(&self, topic_id: Option<i64>) -> Result<Topic, AppError> {
        let topic = match topic_id {
            Some(id) => self.topics.find_by_id(id).await?,
            None => self.topics.find_by_slug(GLOBAL_SLUG).await?,
        };
        topic.ok_or_else(|| AppError::NotFound("Topic not found".into()))
    }

    /// Persist a message, returning the canonical record with its
    /// server-assigned id and timestamp.
    pub async fn persist(
        &self,
        content: &str,
        sender_id: i64,
        sender_handle: i64,
        topic_id: i64,
    ) -> Result<Message, AppError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("Message content required".into()));
        }
        if content.len() > MAX_CONTENT_LEN {
            return Err(AppError::Validation("Message too long".into()));
        }

        self.messages
            .create(&NewMessage {
                content: content.to_string(),
                sender_id,
                sender_handle,
                topic_id,
            })
            .await
    }

    /// The most recent messages for a topic, oldest first.
    pub async fn history(&self, topic_id: i64, limit: i64) -> Result<Vec<Message>, AppError> {
        self.messages.recent(topic_id, limit).await
    }

    /// Delete a message. Permitted only to its original sender or an admin;
    /// the provided topic id must match the row. Returns the deleted record
    /// for broadcast scoping.
    pub async fn delete(
        &self,
        message_id: i64,
        topic_id: i64,
        requester_id: i64,
        requester_is_admin: bool,
    ) -> Result<Message, AppError> {
        let message = self
            .messages
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Message {} not found", message_id)))?;

        if message.topic_id != topic_id {
            return Err(AppError::NotFound(format!("Message {} not found", message_id)));
        }

        if message.sender_id != requester_id && !requester_is_admin {
            return Err(AppError::Forbidden("Not the message sender".into()));
        }

        self.messages.delete(message_id).await?;
        Ok(message)
    }
}
