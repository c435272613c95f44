//! Category repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::Category;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Insert a new category and return it with its assigned id
    async fn create(&self, name: &str) -> Result<Category>;

    /// List all categories
    async fn list(&self) -> Result<Vec<Category>>;

    /// Get a category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Delete a category, returning the number of rows removed
    async fn delete(&self, id: i64) -> Result<u64>;
}

/// SQLx-based category repository
pub struct SqlxCategoryRepository {
    pool: SqlitePool,
}

impl SqlxCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for dependency injection
    pub fn shared(pool: SqlitePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, name: &str) -> Result<Category> {
        let result = sqlx::query("INSERT INTO categories (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .context("Failed to insert category")?;

        Ok(Category {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    async fn list(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list categories")?;

        rows.iter()
            .map(|row| {
                Ok(Category {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                })
            })
            .collect()
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT id, name FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get category by id")?;

        match row {
            Some(row) => Ok(Some(Category {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
            })),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete category")?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_repo() -> SqlxCategoryRepository {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        SqlxCategoryRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let repo = setup_repo().await;
        let tools = repo.create("tools").await.unwrap();
        let kitchen = repo.create("kitchen").await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all, vec![tools, kitchen]);
    }

    #[tokio::test]
    async fn test_delete_missing_category() {
        let repo = setup_repo().await;
        assert_eq!(repo.delete(42).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_existing_category() {
        let repo = setup_repo().await;
        let cat = repo.create("tools").await.unwrap();
        assert_eq!(repo.delete(cat.id).await.unwrap(), 1);
        assert!(repo.get_by_id(cat.id).await.unwrap().is_none());
    }
}
