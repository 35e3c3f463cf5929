//! Connection Registry
//!
//! Tracks every live WebSocket connection along with its authenticated
//! identity, current topic, outbound channel and kick signal. One user may
//! hold any number of concurrent connections.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{mpsc, Notify};

use super::events::ServerEvent;
use crate::domain::Role;

/// The authenticated identity bound to a connection at join time.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    pub handle: i64,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

struct Connection {
    identity: Identity,
    current_topic: Option<i64>,
    sender: mpsc::UnboundedSender<ServerEvent>,
    kick: Arc<Notify>,
}

/// In-memory map of connection id to live connection state.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<String, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        conn_id: &str,
        identity: Identity,
        sender: mpsc::UnboundedSender<ServerEvent>,
        kick: Arc<Notify>,
    ) {
        self.connections.insert(
            conn_id.to_string(),
            Connection {
                identity,
                current_topic: None,
                sender,
                kick,
            },
        );
    }

    pub fn unregister(&self, conn_id: &str) -> bool {
        self.connections.remove(conn_id).is_some()
    }

    pub fn lookup(&self, conn_id: &str) -> Option<Identity> {
        self.connections.get(conn_id).map(|c| c.identity.clone())
    }

    pub fn current_topic(&self, conn_id: &str) -> Option<i64> {
        self.connections.get(conn_id).and_then(|c| c.current_topic)
    }

    pub fn set_current_topic(&self, conn_id: &str, topic_id: i64) {
        if let Some(mut conn) = self.connections.get_mut(conn_id) {
            conn.current_topic = Some(topic_id);
        }
    }

    /// Number of live connections, which is what the online count reports.
    pub fn count(&self) -> usize {
        self.connections.len()
    }

    /// All connection ids belonging to a user.
    pub fn connections_of(&self, user_id: i64) -> Vec<String> {
        self.connections
            .iter()
            .filter(|entry| entry.identity.user_id == user_id)
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Unicast. Returns false when the connection is gone or its channel
    /// is closed.
    pub fn send_to(&self, conn_id: &str, event: ServerEvent) -> bool {
        match self.connections.get(conn_id) {
            Some(conn) => conn.sender.send(event).is_ok(),
            None => false,
        }
    }

    pub fn broadcast_all(&self, event: ServerEvent) {
        for conn in self.connections.iter() {
            let _ = conn.sender.send(event.clone());
        }
    }

    /// Signals the connection's read loop to terminate.
    pub fn kick(&self, conn_id: &str) {
        if let Some(conn) = self.connections.get(conn_id) {
            conn.kick.notify_one();
        }
    }
}
