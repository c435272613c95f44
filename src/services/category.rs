//! Category service

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::db::repositories::CategoryRepository;
use crate::models::Category;

/// Error types for category service operations
#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    /// Category not found
    #[error("Category not found: {0}")]
    NotFound(i64),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Category service for managing item categories
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    /// Create a new category service
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    /// List all categories
    pub async fn list(&self) -> Result<Vec<Category>, CategoryServiceError> {
        Ok(self
            .repo
            .list()
            .await
            .context("Failed to list categories")?)
    }

    /// Create a new category
    pub async fn add(&self, name: &str) -> Result<Category, CategoryServiceError> {
        Ok(self
            .repo
            .create(name)
            .await
            .context("Failed to create category")?)
    }

    /// Delete a category by id
    pub async fn delete(&self, id: i64) -> Result<(), CategoryServiceError> {
        let removed = self
            .repo
            .delete(id)
            .await
            .context("Failed to delete category")?;

        if removed == 0 {
            return Err(CategoryServiceError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxCategoryRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup_service() -> CategoryService {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        CategoryService::new(SqlxCategoryRepository::shared(pool))
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let service = setup_service().await;
        service.add("tools").await.unwrap();
        service.add("kitchen").await.unwrap();

        let names: Vec<String> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["tools", "kitchen"]);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let service = setup_service().await;
        assert!(matches!(
            service.delete(5).await.unwrap_err(),
            CategoryServiceError::NotFound(5)
        ));
    }
}
