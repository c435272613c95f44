//! Database layer
//!
//! SQLite connection pool creation and embedded migrations. All data access
//! goes through the repository traits in [`repositories`].

pub mod migrations;
pub mod repositories;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;

/// Create a SQLite connection pool from configuration.
///
/// For file-backed databases the parent directory is created if missing and
/// the connection is opened in read-write-create mode.
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    let url = &config.url;

    if is_memory_url(url) {
        // A pooled in-memory database must stay on a single connection:
        // every new connection would otherwise see its own empty database.
        return SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database");
    }

    let path = url.trim_start_matches("sqlite:");
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }
    }

    let connection_url = if url.contains('?') {
        url.clone()
    } else {
        format!("sqlite:{}?mode=rwc", path)
    };

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&connection_url)
        .await
        .with_context(|| format!("Failed to open database: {}", url))
}

fn is_memory_url(url: &str) -> bool {
    url == ":memory:" || url == "sqlite::memory:"
}

/// Create an in-memory pool for tests.
pub async fn create_test_pool() -> Result<SqlitePool> {
    let config = DatabaseConfig {
        url: ":memory:".to_string(),
    };
    create_pool(&config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_pool_creation() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        let row: (i64,) = sqlx::query_as("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("Query should succeed");
        assert_eq!(row.0, 1);
    }

    #[tokio::test]
    async fn test_memory_pool_shares_schema_across_queries() {
        let pool = create_test_pool().await.unwrap();
        sqlx::query("CREATE TABLE t (x INTEGER)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO t (x) VALUES (7)")
            .execute(&pool)
            .await
            .unwrap();
        let row: (i64,) = sqlx::query_as("SELECT x FROM t")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.0, 7);
    }
}
