//! Chat Gateway
//!
//! Orchestrates the real-time operations: the join handshake, topic
//! switching, the persist-then-fan-out message pipeline, typing pulses,
//! and the moderation fan-out including forced disconnection. The gateway
//! owns the connection registry and room router; transport concerns stay
//! in the handler.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{mpsc, Notify};

use super::events::{MessageRecord, ServerEvent};
use super::registry::{ConnectionRegistry, Identity};
use super::rooms::RoomRouter;
use crate::application::services::{AuthService, Claim, MessageService, ModerationService, Verdict};
use crate::domain::{TopicRepository, UserRepository, GLOBAL_SLUG};
use crate::infrastructure::Store;
use crate::shared::error::AppError;

const SUSPENDED_NOTICE: &str = "Your account has been suspended";
const BANNED_NOTICE: &str = "You have been banned.";
const CLEARED_NOTICE: &str = "Chat cleared by admin.";

pub struct ChatGateway {
    registry: ConnectionRegistry,
    rooms: RoomRouter,
    auth: AuthService,
    messages: MessageService,
    moderation: ModerationService,
    users: Arc<dyn UserRepository>,
    topics: Arc<dyn TopicRepository>,
    history_limit: i64,
}

impl ChatGateway {
    pub fn new(store: &Store, history_limit: i64) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            rooms: RoomRouter::new(),
            auth: AuthService::new(store.users.clone(), store.bans.clone()),
            messages: MessageService::new(store.messages.clone(), store.topics.clone()),
            moderation: ModerationService::new(
                store.users.clone(),
                store.bans.clone(),
                store.messages.clone(),
                store.topics.clone(),
            ),
            users: store.users.clone(),
            topics: store.topics.clone(),
            history_limit,
        }
    }

    pub fn online_count(&self) -> usize {
        self.registry.count()
    }

    /// Push an event to every live connection. Used by the HTTP surface
    /// for topic and announcement change notifications.
    pub fn broadcast_all(&self, event: ServerEvent) {
        self.registry.broadcast_all(event);
    }

    pub fn is_connected(&self, conn_id: &str) -> bool {
        self.registry.lookup(conn_id).is_some()
    }

    pub fn room_of(&self, conn_id: &str) -> Option<i64> {
        self.registry.current_topic(conn_id)
    }

    /// The join handshake. Verifies credentials and ban status, registers
    /// the connection, enters the global topic, replays its history and
    /// re-broadcasts the online count. Returns false when the connection
    /// must be closed.
    pub async fn join(
        &self,
        conn_id: &str,
        user_id: i64,
        password: &str,
        sender: mpsc::UnboundedSender<ServerEvent>,
        kick: Arc<Notify>,
    ) -> bool {
        let user = match self.auth.verify(Claim::Id(user_id), password).await {
            Ok(Verdict::Authenticated(user)) => user,
            Ok(Verdict::InvalidCredentials) => {
                let _ = sender.send(ServerEvent::Error("Invalid credentials".into()));
                return false;
            }
            Ok(Verdict::Banned) => {
                let _ = sender.send(ServerEvent::Error(SUSPENDED_NOTICE.into()));
                return false;
            }
            Err(error) => {
                tracing::error!(%error, user_id = user_id, "Join verification failed");
                let _ = sender.send(ServerEvent::Error("Internal server error".into()));
                return false;
            }
        };

        let identity = Identity {
            user_id: user.id,
            username: user.username.clone(),
            handle: user.handle,
            role: user.role,
        };
        self.registry.register(conn_id, identity, sender, kick);

        // A ban issued between verification and registration either lands in
        // this re-check or in the ban's own registry sweep.
        match self.auth.verify(Claim::Id(user_id), password).await {
            Ok(Verdict::Authenticated(_)) => {}
            Ok(_) => {
                self.registry
                    .send_to(conn_id, ServerEvent::Error(SUSPENDED_NOTICE.into()));
                self.registry.unregister(conn_id);
                return false;
            }
            Err(error) => {
                tracing::error!(%error, user_id = user_id, "Join re-verification failed");
                self.registry.unregister(conn_id);
                return false;
            }
        }

        if let Err(error) = self.users.record_session(conn_id, user.id).await {
            tracing::warn!(%error, user_id = user.id, "Failed to record session");
        }

        let global = match self.topics.find_by_slug(GLOBAL_SLUG).await {
            Ok(Some(topic)) => topic,
            Ok(None) | Err(_) => {
                tracing::error!("Global topic missing during join");
                self.registry
                    .send_to(conn_id, ServerEvent::Error("Internal server error".into()));
                self.registry.unregister(conn_id);
                return false;
            }
        };

        self.rooms.switch(conn_id, global.id);
        self.registry.set_current_topic(conn_id, global.id);

        self.replay_history(conn_id, global.id).await;
        self.registry
            .broadcast_all(ServerEvent::UserCount(self.registry.count()));

        tracing::info!(
            conn_id = conn_id,
            user_id = user.id,
            handle = user.handle,
            "Client joined"
        );
        true
    }

    /// Move a connection to another topic and replay that topic's recent
    /// history. Unknown topics are ignored.
    pub async fn switch_topic(&self, conn_id: &str, topic_id: i64) {
        if self.registry.lookup(conn_id).is_none() {
            return;
        }

        let topic = match self.topics.find_by_id(topic_id).await {
            Ok(Some(topic)) => topic,
            Ok(None) => {
                tracing::debug!(conn_id = conn_id, topic_id = topic_id, "Switch to unknown topic");
                return;
            }
            Err(error) => {
                tracing::error!(%error, topic_id = topic_id, "Topic lookup failed");
                return;
            }
        };

        self.rooms.switch(conn_id, topic.id);
        self.registry.set_current_topic(conn_id, topic.id);
        self.replay_history(conn_id, topic.id).await;
    }

    /// The message pipeline: persist first, then ack the sender with its
    /// correlation token, then broadcast to the rest of the topic group.
    /// Nothing is fanned out when persistence fails.
    pub async fn send_message(
        &self,
        conn_id: &str,
        content: &str,
        temp_id: serde_json::Value,
        topic_id: Option<i64>,
    ) {
        let Some(identity) = self.registry.lookup(conn_id) else {
            return;
        };

        let topic = match self.messages.resolve_topic(topic_id).await {
            Ok(topic) => topic,
            Err(error) => {
                tracing::debug!(%error, conn_id = conn_id, "Send to unresolvable topic");
                return;
            }
        };

        let message = match self
            .messages
            .persist(content, identity.user_id, identity.handle, topic.id)
            .await
        {
            Ok(message) => message,
            Err(AppError::Validation(reason)) => {
                tracing::debug!(conn_id = conn_id, reason = %reason, "Message rejected");
                return;
            }
            Err(error) => {
                tracing::error!(%error, conn_id = conn_id, "Message persistence failed");
                return;
            }
        };

        let record = MessageRecord::from(message);
        self.registry.send_to(
            conn_id,
            ServerEvent::MessageAck {
                temp_id,
                message: record.clone(),
            },
        );
        self.broadcast_topic(topic.id, ServerEvent::ReceiveMessage(record), Some(conn_id));
    }

    /// Delete a message (sender-or-admin gated) and notify its topic group.
    pub async fn delete_message(&self, conn_id: &str, message_id: i64, topic_id: i64) {
        let Some(identity) = self.registry.lookup(conn_id) else {
            return;
        };

        match self
            .messages
            .delete(message_id, topic_id, identity.user_id, identity.is_admin())
            .await
        {
            Ok(message) => {
                self.broadcast_topic(
                    message.topic_id,
                    ServerEvent::MessageDeleted { message_id },
                    None,
                );
            }
            Err(AppError::NotFound(_)) | Err(AppError::Forbidden(_)) => {
                tracing::debug!(
                    conn_id = conn_id,
                    message_id = message_id,
                    "Message delete refused"
                );
            }
            Err(error) => {
                tracing::error!(%error, message_id = message_id, "Message delete failed");
            }
        }
    }

    pub fn typing(&self, conn_id: &str, topic_id: Option<i64>) {
        self.relay_typing(conn_id, topic_id, true);
    }

    pub fn stop_typing(&self, conn_id: &str, topic_id: Option<i64>) {
        self.relay_typing(conn_id, topic_id, false);
    }

    /// Ban the user behind a handle, then sweep every one of their live
    /// connections: terminal error, kick, removal from rooms and registry.
    /// The sweep is synchronous so no new sends from the target interleave.
    pub async fn ban_user(&self, conn_id: &str, target_handle: i64, reason: Option<&str>) {
        let Some(requester) = self.registry.lookup(conn_id) else {
            return;
        };
        if !requester.is_admin() {
            tracing::debug!(conn_id = conn_id, "Unauthorized ban attempt");
            return;
        }

        let target = match self.moderation.ban_by_handle(target_handle, reason).await {
            Ok(Some(target)) => target,
            Ok(None) => {
                tracing::debug!(handle = target_handle, "Ban for unknown handle");
                return;
            }
            Err(error) => {
                tracing::error!(%error, handle = target_handle, "Ban persistence failed");
                return;
            }
        };

        let victims = self.registry.connections_of(target.id);

        let mut notify_topics: HashSet<i64> = victims
            .iter()
            .filter_map(|victim| self.registry.current_topic(victim))
            .collect();
        if notify_topics.is_empty() {
            // Offline target: the notice still lands where the admin is.
            if let Some(topic_id) = self.registry.current_topic(conn_id) {
                notify_topics.insert(topic_id);
            }
        }

        let notice = format!("User #{} has been banned.", target_handle);
        for topic_id in notify_topics {
            self.broadcast_topic(
                topic_id,
                ServerEvent::SystemMessage {
                    content: notice.clone(),
                },
                None,
            );
        }

        for victim in &victims {
            self.registry
                .send_to(victim, ServerEvent::Error(BANNED_NOTICE.into()));
            self.registry.kick(victim);
            self.rooms.leave_all(victim);
            self.registry.unregister(victim);
        }

        for victim in &victims {
            if let Err(error) = self.users.remove_session(victim).await {
                tracing::warn!(%error, conn_id = %victim, "Failed to remove session");
            }
        }

        if !victims.is_empty() {
            self.registry
                .broadcast_all(ServerEvent::UserCount(self.registry.count()));
        }
    }

    /// Clear a topic's history and notify that topic's group with an empty
    /// history and a system notice.
    pub async fn clear_topic(&self, conn_id: &str, topic_id: i64) {
        let Some(requester) = self.registry.lookup(conn_id) else {
            return;
        };
        if !requester.is_admin() {
            tracing::debug!(conn_id = conn_id, "Unauthorized clear attempt");
            return;
        }

        match self.moderation.clear_topic(topic_id).await {
            Ok(_) => {
                self.broadcast_topic(topic_id, ServerEvent::MessageHistory(Vec::new()), None);
                self.broadcast_topic(
                    topic_id,
                    ServerEvent::SystemMessage {
                        content: CLEARED_NOTICE.into(),
                    },
                    None,
                );
            }
            Err(AppError::NotFound(_)) => {
                tracing::debug!(topic_id = topic_id, "Clear for unknown topic");
            }
            Err(error) => {
                tracing::error!(%error, topic_id = topic_id, "Topic clear failed");
            }
        }
    }

    /// Tear down a connection and re-broadcast the online count.
    pub async fn disconnect(&self, conn_id: &str) {
        if self.registry.lookup(conn_id).is_none() {
            return;
        }

        self.rooms.leave_all(conn_id);
        self.registry.unregister(conn_id);

        if let Err(error) = self.users.remove_session(conn_id).await {
            tracing::warn!(%error, conn_id = conn_id, "Failed to remove session");
        }

        self.registry
            .broadcast_all(ServerEvent::UserCount(self.registry.count()));
        tracing::debug!(conn_id = conn_id, "Client disconnected");
    }

    async fn replay_history(&self, conn_id: &str, topic_id: i64) {
        match self.messages.history(topic_id, self.history_limit).await {
            Ok(history) => {
                let records = history.into_iter().map(MessageRecord::from).collect();
                self.registry
                    .send_to(conn_id, ServerEvent::MessageHistory(records));
            }
            Err(error) => {
                tracing::error!(%error, topic_id = topic_id, "History replay failed");
            }
        }
    }

    fn relay_typing(&self, conn_id: &str, topic_id: Option<i64>, started: bool) {
        if self.registry.lookup(conn_id).is_none() {
            return;
        }
        let Some(topic_id) = topic_id.or_else(|| self.registry.current_topic(conn_id)) else {
            return;
        };

        let event = if started {
            ServerEvent::UserTyping {
                connection_id: conn_id.to_string(),
            }
        } else {
            ServerEvent::UserStopTyping {
                connection_id: conn_id.to_string(),
            }
        };
        self.broadcast_topic(topic_id, event, Some(conn_id));
    }

    fn broadcast_topic(&self, topic_id: i64, event: ServerEvent, except: Option<&str>) {
        for member in self.rooms.members(topic_id) {
            if except.is_some_and(|skip| skip == member) {
                continue;
            }
            self.registry.send_to(&member, event.clone());
        }
    }
}
