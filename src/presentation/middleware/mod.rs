//! Middleware
//!
//! Tower middleware for request processing.

pub mod admin;
pub mod cors;

pub use admin::{admin_guard, require_admin, AdminUser};
pub use cors::create_cors_layer;
