use anyhow::Context;
use app_config::AppConfig;
use app_error::AppError;
use std::sync::Arc;

use crate::{Database, service::DbCredentials};

pub async fn initialize_user_db() -> Result<Arc<Database>, AppError> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    let db_config = config.database;

    tracing::debug!("Connecting to SurrealDB: {}", db_config.endpoint);

    if db_config.endpoint.starts_with("wss://") {
        tracing::info!("Using secure TLS connection to database");
    } else if !db_config.endpoint.contains("memory") {
        tracing::warn!("Using non-secure database connection");
    }

    let max_connections = db_config.pool.size;

    tracing::info!(
        "Initializing database connection pool with {} connections",
        max_connections
    );

    let credentials = DbCredentials::new(db_config.username, db_config.password);

    let db = Database::initialize(
        &db_config.endpoint,
        max_connections,
        std::time::Duration::from_millis(db_config.pool.connection_timeout),
        &db_config.namespace,
        &db_config.database,
        &credentials,
    )
    .await?;

    tracing::info!("Successfully connected to user SurrealDB with connection pool");

    Ok(Arc::new(db))
}

pub async fn initialize_memory_db() -> Result<Arc<Database>, AppError> {
    let db = Database::initialize_memory_db(10, "test", "test").await?;

    tracing::info!("Successfully connected to in-memory SurrealDB");

    Ok(Arc::new(db))
}
