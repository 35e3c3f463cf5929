//! Ban record entity and repository trait.
//!
//! At most one ban row per user; bans never expire and there is no unban
//! path in the data model.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannedUser {
    pub user_id: i64,
    pub reason: Option<String>,
    pub banned_at: DateTime<Utc>,
}

#[async_trait]
pub trait BanRepository: Send + Sync {
    /// Insert a ban record unless one already exists. Returns true if a new
    /// row was inserted; a repeat ban is a no-op, not an error.
    async fn insert_ignore(&self, user_id: i64, reason: &str) -> Result<bool, AppError>;

    /// Check whether a user has an active ban record.
    async fn is_banned(&self, user_id: i64) -> Result<bool, AppError>;
}
