//! Database Module
//!
//! Connection setup and storage-port composition. This is the only place
//! that branches on the configured engine; everything above it sees the
//! repository traits behind `Store`.

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::config::DatabaseSettings;
use crate::infrastructure::repositories::{PgStore, SqliteStore, Store};

/// Connect to the configured engine, apply the schema, and assemble the
/// storage port.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Store> {
    match settings.engine.as_str() {
        "postgres" => {
            let pool = PgPoolOptions::new()
                .max_connections(settings.max_connections)
                .min_connections(settings.min_connections)
                .acquire_timeout(Duration::from_secs(settings.acquire_timeout))
                .connect(&settings.url)
                .await?;
            let store = PgStore::new(pool);
            store.init_schema().await?;
            tracing::info!("PostgreSQL connection pool created");
            Ok(store.into_store())
        }
        "sqlite" => {
            let options = SqliteConnectOptions::from_str(&settings.url)?
                .create_if_missing(true);
            let pool = SqlitePoolOptions::new()
                .max_connections(settings.max_connections)
                .acquire_timeout(Duration::from_secs(settings.acquire_timeout))
                .connect_with(options)
                .await?;
            let store = SqliteStore::new(pool);
            store.init_schema().await?;
            tracing::info!("SQLite database opened");
            Ok(store.into_store())
        }
        other => anyhow::bail!("unsupported database engine: {other}"),
    }
}

/// Open an in-memory SQLite store. Used by integration tests.
pub async fn connect_in_memory() -> anyhow::Result<Store> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
    // A single connection keeps the in-memory database alive.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    let store = SqliteStore::new(pool);
    store.init_schema().await?;
    Ok(store.into_store())
}
