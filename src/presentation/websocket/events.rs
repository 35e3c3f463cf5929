//! WebSocket Wire Events
//!
//! Every frame is a JSON text message of the form
//! `{"event": <name>, "data": <payload>}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::dto::response::{AnnouncementResponse, TopicResponse};
use crate::domain::Message;

/// The canonical, server-assigned form of a message as sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub id: i64,
    pub content: String,
    /// The sender's pseudonymous handle: the only identity peers ever see.
    pub sender_handle: i64,
    pub topic_id: i64,
    pub timestamp: DateTime<Utc>,
}

impl From<Message> for MessageRecord {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            content: message.content,
            sender_handle: message.sender_handle,
            topic_id: message.topic_id,
            timestamp: message.created_at,
        }
    }
}

/// Client-to-server events.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Completes authentication for this connection.
    #[serde(rename = "join", rename_all = "camelCase")]
    Join { user_id: i64, password: String },

    /// Switch this connection to another topic room.
    #[serde(rename = "joinTopic", rename_all = "camelCase")]
    JoinTopic { topic_id: i64 },

    /// Send a message. `temp_id` is a pure correlation token echoed back in
    /// the acknowledgment so the client can reconcile its optimistic echo;
    /// it is never an identity field.
    #[serde(rename = "sendMessage", rename_all = "camelCase")]
    SendMessage {
        content: String,
        // Older clients send the correlation token as `senderId`.
        #[serde(alias = "senderId")]
        temp_id: serde_json::Value,
        #[serde(default)]
        topic_id: Option<i64>,
    },

    #[serde(rename = "typing", rename_all = "camelCase")]
    Typing {
        #[serde(default)]
        topic_id: Option<i64>,
    },

    #[serde(rename = "stopTyping", rename_all = "camelCase")]
    StopTyping {
        #[serde(default)]
        topic_id: Option<i64>,
    },

    /// Delete a single message (sender-or-admin gated).
    #[serde(rename = "deleteMessage", rename_all = "camelCase")]
    DeleteMessage { message_id: i64, topic_id: i64 },

    /// Ban the user behind a pseudonymous handle (admin gated).
    #[serde(rename = "admin:banUser", rename_all = "camelCase")]
    BanUser {
        target_id: i64,
        #[serde(default)]
        reason: Option<String>,
    },

    /// Clear a topic's history (admin gated).
    #[serde(rename = "admin:clearChat", rename_all = "camelCase")]
    ClearChat { topic_id: i64 },
}

/// Server-to-client events.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Terminal for the connection in most cases.
    #[serde(rename = "error")]
    Error(String),

    /// Sent on join and on topic switch; also the empty-history signal
    /// after a moderation clear.
    #[serde(rename = "messageHistory")]
    MessageHistory(Vec<MessageRecord>),

    /// Unicast to the sender only, carrying its correlation token.
    #[serde(rename = "messageAck", rename_all = "camelCase")]
    MessageAck {
        temp_id: serde_json::Value,
        message: MessageRecord,
    },

    /// Broadcast to the topic group excluding the sender.
    #[serde(rename = "receiveMessage")]
    ReceiveMessage(MessageRecord),

    #[serde(rename = "messageDeleted", rename_all = "camelCase")]
    MessageDeleted { message_id: i64 },

    /// Boolean-like typing pulse; carries only the originating connection
    /// marker, never a user identity.
    #[serde(rename = "userTyping", rename_all = "camelCase")]
    UserTyping { connection_id: String },

    #[serde(rename = "userStopTyping", rename_all = "camelCase")]
    UserStopTyping { connection_id: String },

    /// Global online count, on every connect/disconnect.
    #[serde(rename = "userCount")]
    UserCount(usize),

    #[serde(rename = "system_message")]
    SystemMessage { content: String },

    #[serde(rename = "newTopic")]
    NewTopic(TopicResponse),

    #[serde(rename = "topicUpdated")]
    TopicUpdated(TopicResponse),

    #[serde(rename = "topicDeleted", rename_all = "camelCase")]
    TopicDeleted { topic_id: i64 },

    #[serde(rename = "newAnnouncement")]
    NewAnnouncement(AnnouncementResponse),
}
