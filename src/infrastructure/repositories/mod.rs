//! Repository Implementations
//!
//! Two adapters implement the domain's repository traits: `PgStore`
//! (PostgreSQL) and `SqliteStore` (SQLite). They differ only in placeholder
//! syntax, insert-id retrieval, and DDL; behavior is identical.

mod postgres;
mod sqlite;

use std::sync::Arc;

pub use postgres::PgStore;
pub use sqlite::SqliteStore;

use crate::domain::{
    AnnouncementRepository, BanRepository, MessageRepository, TopicRepository, UserRepository,
};

/// The assembled storage port handed to the core. The core never learns
/// which engine sits behind these handles.
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn UserRepository>,
    pub topics: Arc<dyn TopicRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub announcements: Arc<dyn AnnouncementRepository>,
    pub bans: Arc<dyn BanRepository>,
}
