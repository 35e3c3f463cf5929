//! Application Services
//!
//! Each service wraps the repository traits with the business rules for one
//! area: identity verification, user administration, topics, messages,
//! announcements, and moderation.

pub mod announcement_service;
pub mod auth_service;
pub mod message_service;
pub mod moderation_service;
pub mod topic_service;
pub mod user_service;

pub use announcement_service::AnnouncementService;
pub use auth_service::{digest, AuthService, Claim, Verdict};
pub use message_service::MessageService;
pub use moderation_service::ModerationService;
pub use topic_service::{TopicFields, TopicService};
pub use user_service::UserService;
