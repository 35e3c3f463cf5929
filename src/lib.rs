//! # Burrow Chat Server
//!
//! A topic-based anonymous chat server:
//! - Username/password authentication with pseudonymous numeric handles
//! - Topic rooms with real-time fan-out over WebSocket
//! - Admin moderation (ban, clear, delete) with forced disconnection
//! - Relational persistence behind a storage port (PostgreSQL or SQLite)
//!
//! ## Module Structure
//!
//! ```text
//! burrow_chat/
//! +-- config/        Configuration management
//! +-- domain/        Domain entities and repository traits
//! +-- application/   Application services and DTOs
//! +-- infrastructure/ Storage adapters (PostgreSQL, SQLite)
//! +-- presentation/  HTTP routes and WebSocket handlers
//! +-- shared/        Common utilities (errors, slugs)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
