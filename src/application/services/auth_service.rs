//! Identity & Session Verifier
//!
//! Validates credentials against the one-way digest, resolves the user row,
//! and checks ban status. Read-only; the same check backs both the WebSocket
//! join handshake and the admin-gated HTTP actions.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::domain::{BanRepository, User, UserRepository};
use crate::shared::error::AppError;

/// Compute the one-way digest of a plaintext secret (lowercase hex SHA-256).
pub fn digest(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    let out = hasher.finalize();
    let mut hex = String::with_capacity(out.len() * 2);
    for byte in out {
        use std::fmt::Write;
        // Writing to a String cannot fail.
        let _ = write!(hex, "{:02x}", byte);
    }
    hex
}

/// The claimed identity presented alongside a plaintext secret.
#[derive(Debug, Clone)]
pub enum Claim {
    Id(i64),
    Username(String),
}

/// Outcome of a verification attempt.
#[derive(Debug)]
pub enum Verdict {
    Authenticated(User),
    InvalidCredentials,
    Banned,
}

/// Credential and ban verification over the storage port.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    bans: Arc<dyn BanRepository>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, bans: Arc<dyn BanRepository>) -> Self {
        Self { users, bans }
    }

    /// Verify a claimed identity and plaintext secret, then check ban status.
    pub async fn verify(&self, claim: Claim, password: &str) -> Result<Verdict, AppError> {
        let d = digest(password);

        let user = match claim {
            Claim::Id(id) => self.users.find_by_id_and_digest(id, &d).await?,
            Claim::Username(name) => self.users.find_by_username_and_digest(&name, &d).await?,
        };

        let Some(user) = user else {
            return Ok(Verdict::InvalidCredentials);
        };

        if self.bans.is_banned(user.id).await? {
            return Ok(Verdict::Banned);
        }

        Ok(Verdict::Authenticated(user))
    }

    /// Verify an admin bearer token: the plaintext admin password, re-hashed
    /// per call. The claimed identity is implicit (any matching admin row).
    pub async fn verify_admin(&self, token: &str) -> Result<Option<User>, AppError> {
        self.users.find_admin_by_digest(&digest(token)).await
    }
}
