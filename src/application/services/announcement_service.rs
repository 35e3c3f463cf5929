//! Announcement Service
//!
//! Append-only admin broadcast log.

use std::sync::Arc;

use crate::domain::{Announcement, AnnouncementRepository};
use crate::shared::error::AppError;

#[derive(Clone)]
pub struct AnnouncementService {
    announcements: Arc<dyn AnnouncementRepository>,
}

impl AnnouncementService {
    pub fn new(announcements: Arc<dyn AnnouncementRepository>) -> Self {
        Self { announcements }
    }

    pub async fn create(&self, content: &str, author_id: i64) -> Result<Announcement, AppError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("Announcement content required".into()));
        }
        self.announcements.create(content, author_id).await
    }

    pub async fn list(&self) -> Result<Vec<Announcement>, AppError> {
        self.announcements.list().await
    }
}
