//! SQLite Storage Adapter
//!
//! Implements every repository trait against a `SqlitePool`. Uses `?`
//! placeholders; inserts retrieve `last_insert_rowid()` and re-read the row,
//! since SQLite assigns ids at execution time.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::{
    Announcement, AnnouncementRepository, BanRepository, Message, MessageRepository, NewMessage,
    NewTopic, NewUser, Role, Topic, TopicPatch, TopicRepository, User, UserRepository,
};
use crate::infrastructure::repositories::Store;
use crate::shared::error::AppError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    username        TEXT NOT NULL UNIQUE,
    password_digest TEXT NOT NULL,
    role            TEXT NOT NULL DEFAULT 'user',
    handle          INTEGER NOT NULL,
    created_at      TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS topics (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    name             TEXT NOT NULL UNIQUE,
    slug             TEXT NOT NULL UNIQUE,
    description      TEXT,
    background_color TEXT,
    text_color       TEXT,
    accent_color     TEXT,
    username_color   TEXT,
    animation        TEXT,
    creator_id       INTEGER,
    created_at       TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS messages (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    content       TEXT NOT NULL,
    sender_id     INTEGER NOT NULL,
    sender_handle INTEGER NOT NULL,
    topic_id      INTEGER NOT NULL,
    created_at    TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_messages_topic ON messages (topic_id, id);

CREATE TABLE IF NOT EXISTS announcements (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    content    TEXT NOT NULL,
    author_id  INTEGER NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS banned_users (
    user_id   INTEGER PRIMARY KEY,
    reason    TEXT,
    banned_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS active_sessions (
    connection_id TEXT PRIMARY KEY,
    user_id       INTEGER NOT NULL,
    login_time    TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#;

/// SQLite adapter for the storage port.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Apply the schema. Idempotent.
    pub async fn init_schema(&self) -> Result<(), AppError> {
        for statement in SCHEMA.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Wrap this adapter in trait-object handles for the core.
    pub fn into_store(self) -> Store {
        let shared = Arc::new(self);
        Store {
            users: shared.clone(),
            topics: shared.clone(),
            messages: shared.clone(),
            announcements: shared.clone(),
            bans: shared,
        }
    }
}

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_digest: String,
    role: String,
    handle: i64,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            password_digest: self.password_digest,
            role: Role::from_str(&self.role),
            handle: self.handle,
            created_at: self.created_at,
        }
    }
}

const USER_COLUMNS: &str = "id, username, password_digest, role, handle, created_at";

#[async_trait]
impl UserRepository for SqliteStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_user()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_user()))
    }

    async fn find_by_handle(&self, handle: i64) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE handle = ?"
        ))
        .bind(handle)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_user()))
    }

    async fn find_by_id_and_digest(
        &self,
        id: i64,
        digest: &str,
    ) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ? AND password_digest = ?"
        ))
        .bind(id)
        .bind(digest)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_user()))
    }

    async fn find_by_username_and_digest(
        &self,
        username: &str,
        digest: &str,
    ) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ? AND password_digest = ?"
        ))
        .bind(username.to_lowercase())
        .bind(digest)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_user()))
    }

    async fn find_admin_by_digest(&self, digest: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE password_digest = ? AND role = 'admin'"
        ))
        .bind(digest)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_user()))
    }

    async fn create(&self, user: &NewUser) -> Result<User, AppError> {
        let result = sqlx::query(
            "INSERT INTO users (username, password_digest, role, handle) VALUES (?, ?, ?, ?)",
        )
        .bind(user.username.to_lowercase())
        .bind(&user.password_digest)
        .bind(user.role.as_str())
        .bind(user.handle)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_user())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_user()).collect())
    }

    async fn delete_non_admin(&self, id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ? AND role != 'admin'")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE username = ?",
        )
        .bind(username.to_lowercase())
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    async fn handle_exists(&self, handle: i64) -> Result<bool, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE handle = ?",
        )
        .bind(handle)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    async fn record_session(&self, connection_id: &str, user_id: i64) -> Result<(), AppError> {
        sqlx::query(
            "INSERT OR REPLACE INTO active_sessions (connection_id, user_id) VALUES (?, ?)",
        )
        .bind(connection_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_session(&self, connection_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM active_sessions WHERE connection_id = ?")
            .bind(connection_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Internal row type for topic queries.
#[derive(Debug, sqlx::FromRow)]
struct TopicRow {
    id: i64,
    name: String,
    slug: String,
    description: Option<String>,
    background_color: Option<String>,
    text_color: Option<String>,
    accent_color: Option<String>,
    username_color: Option<String>,
    animation: Option<String>,
    creator_id: Option<i64>,
    created_at: DateTime<Utc>,
}

impl TopicRow {
    fn into_topic(self) -> Topic {
        Topic {
            id: self.id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            background_color: self.background_color,
            text_color: self.text_color,
            accent_color: self.accent_color,
            username_color: self.username_color,
            animation: self.animation,
            creator_id: self.creator_id,
            created_at: self.created_at,
        }
    }
}

const TOPIC_COLUMNS: &str = "id, name, slug, description, background_color, text_color, \
     accent_color, username_color, animation, creator_id, created_at";

#[async_trait]
impl TopicRepository for SqliteStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Topic>, AppError> {
        let row = sqlx::query_as::<_, TopicRow>(&format!(
            "SELECT {TOPIC_COLUMNS} FROM topics WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_topic()))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Topic>, AppError> {
        let row = sqlx::query_as::<_, TopicRow>(&format!(
            "SELECT {TOPIC_COLUMNS} FROM topics WHERE slug = ?"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_topic()))
    }

    async fn list(&self) -> Result<Vec<Topic>, AppError> {
        let rows = sqlx::query_as::<_, TopicRow>(&format!(
            "SELECT {TOPIC_COLUMNS} FROM topics ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_topic()).collect())
    }

    async fn create(&self, topic: &NewTopic) -> Result<Topic, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO topics (name, slug, description, background_color, text_color,
                                accent_color, username_color, animation, creator_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&topic.name)
        .bind(&topic.slug)
        .bind(&topic.description)
        .bind(&topic.background_color)
        .bind(&topic.text_color)
        .bind(&topic.accent_color)
        .bind(&topic.username_color)
        .bind(&topic.animation)
        .bind(topic.creator_id)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        let row = sqlx::query_as::<_, TopicRow>(&format!(
            "SELECT {TOPIC_COLUMNS} FROM topics WHERE id = ?"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_topic())
    }

    async fn update(&self, id: i64, patch: &TopicPatch) -> Result<Option<Topic>, AppError> {
        sqlx::query(
            r#"
            UPDATE topics SET
                name             = COALESCE(?, name),
                slug             = COALESCE(?, slug),
                description      = COALESCE(?, description),
                background_color = COALESCE(?, background_color),
                text_color       = COALESCE(?, text_color),
                accent_color     = COALESCE(?, accent_color),
                username_color   = COALESCE(?, username_color),
                animation        = COALESCE(?, animation)
            WHERE id = ?
            "#,
        )
        .bind(&patch.name)
        .bind(&patch.slug)
        .bind(&patch.description)
        .bind(&patch.background_color)
        .bind(&patch.text_color)
        .bind(&patch.accent_color)
        .bind(&patch.username_color)
        .bind(&patch.animation)
        .bind(id)
        .execute(&self.pool)
        .await?;

        TopicRepository::find_by_id(self, id).await
    }

    async fn delete(&self, id: i64) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;

        // Topic deletion cascades to its messages.
        sqlx::query("DELETE FROM messages WHERE topic_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM topics WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM topics WHERE slug = ?",
        )
        .bind(slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }
}

/// Internal row type for message queries.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i64,
    content: String,
    sender_id: i64,
    sender_handle: i64,
    topic_id: i64,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    fn into_message(self) -> Message {
        Message {
            id: self.id,
            content: self.content,
            sender_id: self.sender_id,
            sender_handle: self.sender_handle,
            topic_id: self.topic_id,
            created_at: self.created_at,
        }
    }
}

const MESSAGE_COLUMNS: &str = "id, content, sender_id, sender_handle, topic_id, created_at";

#[async_trait]
impl MessageRepository for SqliteStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Message>, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_message()))
    }

    async fn recent(&self, topic_id: i64, limit: i64) -> Result<Vec<Message>, AppError> {
        // Fetch the newest `limit` rows, then return them oldest first.
        let mut rows = sqlx::query_as::<_, MessageRow>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS} FROM messages
            WHERE topic_id = ?
            ORDER BY id DESC
            LIMIT ?
            "#
        ))
        .bind(topic_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.reverse();
        Ok(rows.into_iter().map(|r| r.into_message()).collect())
    }

    async fn create(&self, message: &NewMessage) -> Result<Message, AppError> {
        let result = sqlx::query(
            "INSERT INTO messages (content, sender_id, sender_handle, topic_id) VALUES (?, ?, ?, ?)",
        )
        .bind(&message.content)
        .bind(message.sender_id)
        .bind(message.sender_handle)
        .bind(message.topic_id)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_message())
    }

    async fn delete(&self, id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_by_topic(&self, topic_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM messages WHERE topic_id = ?")
            .bind(topic_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Internal row type for announcement queries.
#[derive(Debug, sqlx::FromRow)]
struct AnnouncementRow {
    id: i64,
    content: String,
    author_id: i64,
    created_at: DateTime<Utc>,
}

impl AnnouncementRow {
    fn into_announcement(self) -> Announcement {
        Announcement {
            id: self.id,
            content: self.content,
            author_id: self.author_id,
            created_at: self.created_at,
        }
    }
}

#[async_trait]
impl AnnouncementRepository for SqliteStore {
    async fn create(&self, content: &str, author_id: i64) -> Result<Announcement, AppError> {
        let result = sqlx::query("INSERT INTO announcements (content, author_id) VALUES (?, ?)")
            .bind(content)
            .bind(author_id)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        let row = sqlx::query_as::<_, AnnouncementRow>(
            "SELECT id, content, author_id, created_at FROM announcements WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_announcement())
    }

    async fn list(&self) -> Result<Vec<Announcement>, AppError> {
        let rows = sqlx::query_as::<_, AnnouncementRow>(
            "SELECT id, content, author_id, created_at FROM announcements ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_announcement()).collect())
    }
}

#[async_trait]
impl BanRepository for SqliteStore {
    async fn insert_ignore(&self, user_id: i64, reason: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO banned_users (user_id, reason) VALUES (?, ?)",
        )
        .bind(user_id)
        .bind(reason)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_banned(&self, user_id: i64) -> Result<bool, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM banned_users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }
}
