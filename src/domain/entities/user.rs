//! User entity and repository trait.
//!
//! Maps to the `users` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// User role matching the database VARCHAR constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a user account.
///
/// Maps to the `users` table:
/// - id: BIGINT PRIMARY KEY
/// - username: VARCHAR NOT NULL UNIQUE (stored lowercase)
/// - password_digest: VARCHAR NOT NULL
/// - role: VARCHAR DEFAULT 'user'
/// - handle: BIGINT NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
///
/// The `handle` is the pseudonymous numeric identity: the only identifier
/// ever shown to peers. It is assigned at creation and never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Internal account id (primary key)
    pub id: i64,

    /// Username (unique, case-insensitive; stored lowercase)
    pub username: String,

    /// One-way digest of the password
    #[serde(skip_serializing)]
    pub password_digest: String,

    /// Account role
    #[serde(default)]
    pub role: Role,

    /// Pseudonymous numeric handle, immutable for the account lifetime
    pub handle: i64,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Check whether this account holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Fields required to create a user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_digest: String,
    pub role: Role,
    pub handle: i64,
}

/// Repository trait for User data access operations.
///
/// Implementations of this trait handle the actual database interactions.
/// The trait is defined in the domain layer to maintain dependency inversion.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by internal id.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Find a user by lowercase username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Find a user by pseudonymous handle.
    async fn find_by_handle(&self, handle: i64) -> Result<Option<User>, AppError>;

    /// Find a user whose internal id and password digest both match.
    async fn find_by_id_and_digest(&self, id: i64, digest: &str)
        -> Result<Option<User>, AppError>;

    /// Find a user whose lowercase username and password digest both match.
    async fn find_by_username_and_digest(
        &self,
        username: &str,
        digest: &str,
    ) -> Result<Option<User>, AppError>;

    /// Find any admin account whose password digest matches.
    /// Used by the HTTP admin guard, where the claimed identity is implicit.
    async fn find_admin_by_digest(&self, digest: &str) -> Result<Option<User>, AppError>;

    /// Create a new user, returning the stored row.
    async fn create(&self, user: &NewUser) -> Result<User, AppError>;

    /// List all users.
    async fn list(&self) -> Result<Vec<User>, AppError>;

    /// Delete a user by id. Admin rows are never touched; returns the number
    /// of rows removed.
    async fn delete_non_admin(&self, id: i64) -> Result<u64, AppError>;

    /// Check if a username is already taken (case-insensitive).
    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;

    /// Check if a pseudonymous handle is already assigned.
    async fn handle_exists(&self, handle: i64) -> Result<bool, AppError>;

    /// Mirror a live connection into `active_sessions` (introspection only;
    /// the in-memory registry stays authoritative).
    async fn record_session(&self, connection_id: &str, user_id: i64) -> Result<(), AppError>;

    /// Remove the mirrored `active_sessions` row for a connection.
    async fn remove_session(&self, connection_id: &str) -> Result<(), AppError>;
}
