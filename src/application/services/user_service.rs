//! User Service
//!
//! Registration and admin user management: creation with pseudonymous handle
//! assignment, listing, and deletion (admin accounts are undeletable).

use std::sync::Arc;

use rand::Rng;

use crate::application::services::auth_service::digest;
use crate::domain::{NewUser, Role, User, UserRepository};
use crate::shared::error::AppError;

/// Pseudonymous handles are four-digit tags.
const HANDLE_MIN: i64 = 1000;
const HANDLE_MAX: i64 = 9999;
const HANDLE_ATTEMPTS: usize = 256;

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Create an account. Usernames are unique case-insensitively and stored
    /// lowercase; the handle is assigned here and never changes.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<User, AppError> {
        let username = username.trim().to_lowercase();
        if username.is_empty() {
            return Err(AppError::Validation("Username and password required".into()));
        }
        if password.is_empty() {
            return Err(AppError::Validation("Username and password required".into()));
        }

        if self.users.username_exists(&username).await? {
            return Err(AppError::Conflict("Username already exists".into()));
        }

        let handle = self.assign_handle().await?;
        let user = self
            .users
            .create(&NewUser {
                username,
                password_digest: digest(password),
                role,
                handle,
            })
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, role = %user.role, "User created");
        Ok(user)
    }

    /// Public registration path: always a regular user.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AppError> {
        self.create_user(username, password, Role::User).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.users.list().await
    }

    /// Delete an account. Admin accounts are undeletable through this path.
    pub async fn delete_user(&self, id: i64) -> Result<(), AppError> {
        let Some(user) = self.users.find_by_id(id).await? else {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        };

        if user.is_admin() {
            return Err(AppError::Forbidden("Admin accounts cannot be deleted".into()));
        }

        self.users.delete_non_admin(id).await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }

    /// Pick an unused handle in the four-digit range.
    async fn assign_handle(&self) -> Result<i64, AppError> {
        for _ in 0..HANDLE_ATTEMPTS {
            // ThreadRng is !Send, so it must not live across the await below.
            let candidate = rand::rng().random_range(HANDLE_MIN..=HANDLE_MAX);
            if !self.users.handle_exists(candidate).await? {
                return Ok(candidate);
            }
        }
        Err(AppError::Internal("Handle space exhausted".into()))
    }
}
