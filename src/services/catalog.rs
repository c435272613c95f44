//! Catalog service
//!
//! Implements business logic for catalog items:
//! - Public listings (published only, optionally by category)
//! - Editor listings (all items, by category, by minimum date)
//! - Item lookup, creation and deletion

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::sync::Arc;

use crate::db::repositories::ItemRepository;
use crate::models::{CatalogItem, CreateItemInput};

/// Error types for catalog service operations
#[derive(Debug, thiserror::Error)]
pub enum CatalogServiceError {
    /// Item not found
    #[error("Item not found: {0}")]
    NotFound(i64),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Catalog service for managing shop items
pub struct CatalogService {
    repo: Arc<dyn ItemRepository>,
}

impl CatalogService {
    /// Create a new catalog service
    pub fn new(repo: Arc<dyn ItemRepository>) -> Self {
        Self { repo }
    }

    /// All published items, in fetch order
    pub async fn published(&self) -> Result<Vec<CatalogItem>, CatalogServiceError> {
        Ok(self
            .repo
            .list_published()
            .await
            .context("Failed to fetch published items")?)
    }

    /// Published items in one category
    pub async fn published_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<CatalogItem>, CatalogServiceError> {
        Ok(self
            .repo
            .list_published_by_category(category)
            .await
            .context("Failed to fetch items by category")?)
    }

    /// Every item, drafts included
    pub async fn all_items(&self) -> Result<Vec<CatalogItem>, CatalogServiceError> {
        Ok(self
            .repo
            .list_all()
            .await
            .context("Failed to fetch items")?)
    }

    /// Items published on or after the given date
    pub async fn items_by_min_date(
        &self,
        min_date: NaiveDate,
    ) -> Result<Vec<CatalogItem>, CatalogServiceError> {
        Ok(self
            .repo
            .list_by_min_date(min_date)
            .await
            .context("Failed to fetch items by date")?)
    }

    /// Look up a single item by id
    pub async fn get(&self, id: i64) -> Result<CatalogItem, CatalogServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to fetch item")?
            .ok_or(CatalogServiceError::NotFound(id))
    }

    /// Persist a new item
    pub async fn add(&self, input: CreateItemInput) -> Result<CatalogItem, CatalogServiceError> {
        Ok(self
            .repo
            .create(&input)
            .await
            .context("Failed to create item")?)
    }

    /// Delete an item by id
    pub async fn delete(&self, id: i64) -> Result<(), CatalogServiceError> {
        let removed = self
            .repo
            .delete(id)
            .await
            .context("Failed to delete item")?;

        if removed == 0 {
            return Err(CatalogServiceError::NotFound(id));
        }
        Ok(())
    }
}
