//! Database connection and pool management for the Registrar API.
//!
//! Initializes a SeaORM connection pool with configurable parameters and
//! retry on transient connect failures.

use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::AppConfig;

/// Errors that can occur during database pool initialization.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("failed to connect to database: {source}")]
    ConnectionFailed {
        #[from]
        source: sea_orm::DbErr,
    },
    #[error("invalid database configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// Initializes the connection pool from the application configuration.
///
/// Connect attempts are retried with exponential backoff so a database that
/// comes up slightly after the service does not fail startup.
pub async fn init_pool(cfg: &AppConfig) -> Result<DatabaseConnection> {
    if cfg.database_url.is_empty() {
        return Err(DatabaseError::InvalidConfiguration {
            message: "database URL cannot be empty".to_string(),
        }
        .into());
    }

    let mut options = ConnectOptions::new(&cfg.database_url);
    options
        .max_connections(cfg.db_max_connections)
        .acquire_timeout(Duration::from_millis(cfg.db_acquire_timeout_ms))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let max_attempts = 5;
    let mut retry_delay = Duration::from_millis(100);
    let mut attempt = 1;

    loop {
        match Database::connect(options.clone()).await {
            Ok(conn) => {
                tracing::info!(attempt, "connected to database");
                return Ok(conn);
            }
            Err(err) if attempt >= max_attempts => {
                tracing::error!(error = %err, attempts = max_attempts, "giving up connecting to database");
                return Err(DatabaseError::ConnectionFailed { source: err }.into());
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    attempt,
                    retry_in_ms = retry_delay.as_millis() as u64,
                    "database connection attempt failed"
                );
                sleep(retry_delay).await;
                retry_delay *= 2;
                attempt += 1;
            }
        }
    }
}

/// Verifies that the connection pool can still reach the database.
pub async fn health_check(db: &DatabaseConnection) -> Result<()> {
    use sea_orm::Statement;

    let stmt = Statement::from_string(db.get_database_backend(), "SELECT 1".to_string());

    db.query_one(stmt)
        .await
        .context("database health check failed")?;

    Ok(())
}
