//! User repository
//!
//! The login history is stored as a JSON column so the whole credential
//! record round-trips in one row.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::sync::Arc;

use crate::models::{LoginRecord, User};

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user and return it with its assigned id
    async fn create(&self, user_name: &str, email: &str, password_hash: &str) -> Result<User>;

    /// Get a user by user name
    async fn get_by_user_name(&self, user_name: &str) -> Result<Option<User>>;

    /// Replace a user's login history
    async fn update_login_history(&self, user_name: &str, history: &[LoginRecord]) -> Result<()>;
}

/// SQLx-based user repository
pub struct SqlxUserRepository {
    pool: SqlitePool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for dependency injection
    pub fn shared(pool: SqlitePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_user(row: &SqliteRow) -> Result<User> {
    let history_json: String = row.try_get("login_history")?;
    let login_history: Vec<LoginRecord> =
        serde_json::from_str(&history_json).context("Corrupt login_history column")?;

    Ok(User {
        id: row.try_get("id")?,
        user_name: row.try_get("user_name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        login_history,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user_name: &str, email: &str, password_hash: &str) -> Result<User> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (user_name, email, password_hash, login_history, created_at)
            VALUES (?, ?, ?, '[]', ?)
            "#,
        )
        .bind(user_name)
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create user")?;

        Ok(User {
            id: result.last_insert_rowid(),
            user_name: user_name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            login_history: Vec::new(),
            created_at: now,
        })
    }

    async fn get_by_user_name(&self, user_name: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_name, email, password_hash, login_history, created_at
            FROM users
            WHERE user_name = ?
            "#,
        )
        .bind(user_name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by user name")?;

        match row {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    async fn update_login_history(&self, user_name: &str, history: &[LoginRecord]) -> Result<()> {
        let history_json =
            serde_json::to_string(history).context("Failed to serialize login history")?;

        sqlx::query("UPDATE users SET login_history = ? WHERE user_name = ?")
            .bind(history_json)
            .bind(user_name)
            .execute(&self.pool)
            .await
            .context("Failed to update login history")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_repo() -> SqlxUserRepository {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        SqlxUserRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_fetch_user() {
        let repo = setup_repo().await;
        let created = repo
            .create("alice", "alice@example.com", "$argon2id$hash")
            .await
            .unwrap();
        assert!(created.id > 0);

        let fetched = repo.get_by_user_name("alice").await.unwrap().unwrap();
        assert_eq!(fetched.email, "alice@example.com");
        assert!(fetched.login_history.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_user_name_rejected() {
        let repo = setup_repo().await;
        repo.create("alice", "a@example.com", "h").await.unwrap();
        assert!(repo.create("alice", "b@example.com", "h").await.is_err());
    }

    #[tokio::test]
    async fn test_login_history_round_trip() {
        let repo = setup_repo().await;
        repo.create("alice", "a@example.com", "h").await.unwrap();

        let history = vec![LoginRecord {
            date_time: Utc::now(),
            user_agent: "test-agent".to_string(),
        }];
        repo.update_login_history("alice", &history).await.unwrap();

        let fetched = repo.get_by_user_name("alice").await.unwrap().unwrap();
        assert_eq!(fetched.login_history.len(), 1);
        assert_eq!(fetched.login_history[0].user_agent, "test-agent");
    }

    #[tokio::test]
    async fn test_missing_user_is_none() {
        let repo = setup_repo().await;
        assert!(repo.get_by_user_name("nobody").await.unwrap().is_none());
    }
}
