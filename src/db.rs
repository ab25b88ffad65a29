//! Database connection pool management.
//!
//! Builds the bounded `sqlx` pool used by the database backend. The pool is
//! created once at startup and handed to [`SqliteStore`](crate::store::sqlite::SqliteStore),
//! which owns it for the life of the process and closes it on shutdown.
//!
//! # Connection Pool
//!
//! - Minimum and maximum connection counts come from `[db]` in the config.
//! - Acquisition waits at most `acquire_timeout_secs` before failing the
//!   request with a storage error.
//! - The per-connection prepared statement cache is sized by
//!   `statement_cache_capacity`, which defaults to `0` (disabled).
//!
//! Connections are returned to the pool when their guard is dropped, so a
//! handler releases its connection on every exit path.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

use crate::config::{Config, DbConfig};

/// Create a connection pool from the configured `DATABASE_URL`.
///
/// # Errors
///
/// Fails if `DATABASE_URL` is unset, cannot be parsed, or the first
/// `min_connections` connections cannot be opened.
pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let url = config.require_database_url()?;
    connect_url(url, &config.db).await
}

/// Create a connection pool for an explicit URL.
pub async fn connect_url(url: &str, db: &DbConfig) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| "Invalid DATABASE_URL")?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .statement_cache_capacity(db.statement_cache_capacity);

    let pool = SqlitePoolOptions::new()
        .min_connections(db.min_connections)
        .max_connections(db.max_connections)
        .acquire_timeout(Duration::from_secs(db.acquire_timeout_secs))
        .connect_with(options)
        .await
        .with_context(|| "Failed to open database connection pool")?;

    tracing::info!(
        min = db.min_connections,
        max = db.max_connections,
        "database pool ready"
    );

    Ok(pool)
}
