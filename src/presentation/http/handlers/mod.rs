//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod announcement;
pub mod auth;
pub mod health;
pub mod topic;
pub mod user;
