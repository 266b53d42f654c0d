// SQLite Connection Pool Setup

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Create the SQLite connection pool with WAL mode and single-writer
/// semantics (§5: "`sqlx::SqlitePool` with `max_connections(1)` models
/// single writer... the pool itself serializes concurrent access, so no
/// additional application-level mutex is needed around Store calls").
///
/// # Configuration
/// - `LEADSIGNAL_POOL_SIZE`: Max connections (default: 1)
/// - `LEADSIGNAL_POOL_TIMEOUT`: Busy-timeout in seconds (default: 5)
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, Box<dyn std::error::Error>> {
    let max_connections: u32 = std::env::var("LEADSIGNAL_POOL_SIZE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1);

    let busy_timeout_secs: u64 = std::env::var("LEADSIGNAL_POOL_TIMEOUT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(5);

    let options = SqliteConnectOptions::from_str(database_url)?
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(busy_timeout_secs))
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .map_err(|e| leadsignal_core::error::AppError::Database(e.to_string()))?;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .map_err(|e| leadsignal_core::error::AppError::Database(e.to_string()))?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_an_in_memory_pool() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        assert!(pool.acquire().await.is_ok());
    }
}
