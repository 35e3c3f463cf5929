//! Shared Utilities
//!
//! Cross-cutting helpers used by every layer.

pub mod error;
pub mod slug;

pub use error::AppError;
