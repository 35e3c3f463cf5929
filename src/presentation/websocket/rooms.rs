//! Topic Room Router
//!
//! Partitions connections into topic groups. Membership is exclusive: a
//! connection belongs to at most one topic at a time, and switching is an
//! atomic remove-then-add with no intermediate observable state.

use std::collections::HashSet;

use dashmap::DashMap;

#[derive(Default)]
pub struct RoomRouter {
    rooms: DashMap<i64, HashSet<String>>,
}

impl RoomRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the connection into `topic_id`, leaving any previous room
    /// first. Also used for the initial join.
    pub fn switch(&self, conn_id: &str, topic_id: i64) {
        self.remove_everywhere(conn_id);
        self.rooms
            .entry(topic_id)
            .or_default()
            .insert(conn_id.to_string());
    }

    /// Removes the connection from whatever room holds it.
    pub fn leave_all(&self, conn_id: &str) {
        self.remove_everywhere(conn_id);
    }

    pub fn members(&self, topic_id: i64) -> Vec<String> {
        self.rooms
            .get(&topic_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, topic_id: i64, conn_id: &str) -> bool {
        self.rooms
            .get(&topic_id)
            .is_some_and(|set| set.contains(conn_id))
    }

    fn remove_everywhere(&self, conn_id: &str) {
        self.rooms.retain(|_, set| {
            set.remove(conn_id);
            !set.is_empty()
        });
    }
}
