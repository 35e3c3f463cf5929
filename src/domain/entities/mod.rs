//! # Domain Entities
//!
//! Core domain entities representing the main business objects.
//! All entities map directly to their corresponding database tables.
//!
//! ## Core Entities
//!
//! - **User**: Account with credentials, role, and pseudonymous handle
//! - **Topic**: A named, independently-themed chat room
//! - **Message**: A text message sent in a topic
//!
//! ## Supporting Entities
//!
//! - **Announcement**: Append-only admin broadcast log
//! - **BannedUser**: Ban records, at most one per user
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access
//! operations. The traits form the storage port: they are implemented once
//! per backing engine in the infrastructure layer, and nothing above the
//! composition root ever learns which engine is active.

mod announcement;
mod ban;
mod message;
mod topic;
mod user;

pub use user::{NewUser, Role, User, UserRepository};

pub use topic::{NewTopic, Topic, TopicPatch, TopicRepository, GLOBAL_SLUG};

pub use message::{Message, MessageRepository, NewMessage};

pub use announcement::{Announcement, AnnouncementRepository};

pub use ban::{BanRepository, BannedUser};
