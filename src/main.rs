//! # Burrow Chat
//!
//! A topic-based anonymous chat server.
//!
//! This is the application entry point that initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - Database connection (PostgreSQL or SQLite)
//! - HTTP/WebSocket server

use anyhow::Result;
use tracing::info;

use burrow_chat::config::Settings;
use burrow_chat::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for structured logging
    burrow_chat::telemetry::init_tracing();

    info!("Starting Burrow Chat...");

    // Load configuration from environment and config files
    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        engine = %settings.database.engine,
        environment = %settings.environment,
        "Configuration loaded"
    );

    // Build and run the application
    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
