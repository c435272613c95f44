//! Database migrations
//!
//! Code-based migrations embedded in the binary for single-binary
//! deployment. Each migration is applied at most once; the applied set is
//! tracked in the `_migrations` table.

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version number (unique and sequential)
    pub version: i32,
    /// Human-readable migration name
    pub name: &'static str,
    /// SQL statements
    pub up: &'static str,
}

/// All migrations, in application order.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_users",
        up: r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_name TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            login_history TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL
        );
        "#,
    },
    Migration {
        version: 2,
        name: "create_categories",
        up: r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        );
        "#,
    },
    Migration {
        version: 3,
        name: "create_items",
        up: r#"
        CREATE TABLE IF NOT EXISTS items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            body TEXT NOT NULL DEFAULT '',
            post_date TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT '',
            feature_image TEXT NOT NULL DEFAULT '',
            published INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_items_category ON items(category);
        CREATE INDEX IF NOT EXISTS idx_items_post_date ON items(post_date);
        "#,
    },
];

/// Run all pending migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create migrations table")?;

    let applied: Vec<i32> = sqlx::query("SELECT version FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .context("Failed to read applied migrations")?
        .iter()
        .map(|row| row.get::<i32, _>("version"))
        .collect();

    for migration in MIGRATIONS {
        if applied.contains(&migration.version) {
            continue;
        }

        tracing::info!("Applying migration {}: {}", migration.version, migration.name);

        // SQLite accepts only one statement per execute call.
        for statement in migration
            .up
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            sqlx::query(statement)
                .execute(pool)
                .await
                .with_context(|| format!("Migration {} failed", migration.version))?;
        }

        sqlx::query("INSERT INTO _migrations (version, name, applied_at) VALUES (?, ?, ?)")
            .bind(migration.version)
            .bind(migration.name)
            .bind(chrono::Utc::now())
            .execute(pool)
            .await
            .with_context(|| format!("Failed to record migration {}", migration.version))?;
    }

    Ok(())
}
