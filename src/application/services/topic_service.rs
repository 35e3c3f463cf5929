//! Topic Service
//!
//! Admin topic management. Enforces slug uniqueness and the global-topic
//! invariant: the topic with slug `global` is seeded at startup and can
//! never be deleted.

use std::sync::Arc;

use crate::domain::{NewTopic, Topic, TopicPatch, TopicRepository, GLOBAL_SLUG};
use crate::shared::error::AppError;
use crate::shared::slug::slugify;

/// Fields accepted when creating or editing a topic.
#[derive(Debug, Clone, Default)]
pub struct TopicFields {
    pub description: Option<String>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub accent_color: Option<String>,
    pub username_color: Option<String>,
    pub animation: Option<String>,
}

#[derive(Clone)]
pub struct TopicService {
    topics: Arc<dyn TopicRepository>,
}

impl TopicService {
    pub fn new(topics: Arc<dyn TopicRepository>) -> Self {
        Self { topics }
    }

    pub async fn get(&self, id: i64) -> Result<Topic, AppError> {
        self.topics
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Topic {} not found", id)))
    }

    pub async fn list(&self) -> Result<Vec<Topic>, AppError> {
        self.topics.list().await
    }

    pub async fn create(
        &self,
        name: &str,
        fields: TopicFields,
        creator_id: i64,
    ) -> Result<Topic, AppError> {
        let name = name.trim();
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(AppError::Validation("Topic name required".into()));
        }

        if self.topics.slug_exists(&slug).await? {
            return Err(AppError::Conflict("Topic already exists".into()));
        }

        let topic = self
            .topics
            .create(&NewTopic {
                name: name.to_string(),
                slug,
                description: fields.description,
                background_color: fields.background_color,
                text_color: fields.text_color,
                accent_color: fields.accent_color,
                username_color: fields.username_color,
                animation: fields.animation,
                creator_id: Some(creator_id),
            })
            .await?;

        tracing::info!(topic_id = topic.id, slug = %topic.slug, "Topic created");
        Ok(topic)
    }

    /// Partial update. Renaming re-derives the slug, which must stay unique.
    pub async fn update(
        &self,
        id: i64,
        name: Option<String>,
        fields: TopicFields,
    ) -> Result<Topic, AppError> {
        let existing = self.get(id).await?;

        let mut patch = TopicPatch {
            name: None,
            slug: None,
            description: fields.description,
            background_color: fields.background_color,
            text_color: fields.text_color,
            accent_color: fields.accent_color,
            username_color: fields.username_color,
            animation: fields.animation,
        };

        if let Some(name) = name {
            let name = name.trim().to_string();
            let slug = slugify(&name);
            if slug.is_empty() {
                return Err(AppError::Validation("Topic name required".into()));
            }
            if slug != existing.slug {
                if existing.is_global() {
                    // Renaming the global topic would break its fixed slug.
                    return Err(AppError::Forbidden("The global topic cannot be renamed".into()));
                }
                if self.topics.slug_exists(&slug).await? {
                    return Err(AppError::Conflict("Topic already exists".into()));
                }
            }
            patch.name = Some(name);
            patch.slug = Some(slug);
        }

        let updated = self
            .topics
            .update(id, &patch)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Topic {} not found", id)))?;

        tracing::info!(topic_id = id, "Topic updated");
        Ok(updated)
    }

    /// Delete a topic and its messages. The global topic is refused.
    pub async fn delete(&self, id: i64) -> Result<Topic, AppError> {
        let topic = self.get(id).await?;

        if topic.is_global() {
            return Err(AppError::Forbidden(format!(
                "The {} topic cannot be deleted",
                GLOBAL_SLUG
            )));
        }

        self.topics.delete(id).await?;
        tracing::info!(topic_id = id, slug = %topic.slug, "Topic deleted");
        Ok(topic)
    }
}
