//! Catalog item repository
//!
//! Database operations for catalog items:
//! - `ItemRepository` trait defining the data-access interface
//! - `SqlxItemRepository` implementing it for SQLite

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::sync::Arc;

use crate::models::{CatalogItem, CreateItemInput};

/// Catalog item repository trait
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Insert a new item and return it with its assigned id
    async fn create(&self, input: &CreateItemInput) -> Result<CatalogItem>;

    /// Get an item by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<CatalogItem>>;

    /// List every item, drafts included
    async fn list_all(&self) -> Result<Vec<CatalogItem>>;

    /// List published items
    async fn list_published(&self) -> Result<Vec<CatalogItem>>;

    /// List published items in one category
    async fn list_published_by_category(&self, category: &str) -> Result<Vec<CatalogItem>>;

    /// List items with a publish date on or after the bound
    async fn list_by_min_date(&self, min_date: NaiveDate) -> Result<Vec<CatalogItem>>;

    /// Delete an item, returning the number of rows removed
    async fn delete(&self, id: i64) -> Result<u64>;
}

/// SQLx-based item repository
pub struct SqlxItemRepository {
    pool: SqlitePool,
}

impl SqlxItemRepository {
    /// Create a new SQLx item repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for dependency injection
    pub fn shared(pool: SqlitePool) -> Arc<dyn ItemRepository> {
        Arc::new(Self::new(pool))
    }
}

const ITEM_COLUMNS: &str = "id, title, body, post_date, category, feature_image, published";

fn row_to_item(row: &SqliteRow) -> Result<CatalogItem> {
    Ok(CatalogItem {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        body: row.try_get("body")?,
        post_date: row.try_get("post_date")?,
        category: row.try_get("category")?,
        feature_image: row.try_get("feature_image")?,
        published: row.try_get("published")?,
    })
}

#[async_trait]
impl ItemRepository for SqlxItemRepository {
    async fn create(&self, input: &CreateItemInput) -> Result<CatalogItem> {
        let result = sqlx::query(
            r#"
            INSERT INTO items (title, body, post_date, category, feature_image, published)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.title)
        .bind(&input.body)
        .bind(input.post_date)
        .bind(&input.category)
        .bind(&input.feature_image)
        .bind(input.published)
        .execute(&self.pool)
        .await
        .context("Failed to insert item")?;

        Ok(CatalogItem {
            id: result.last_insert_rowid(),
            title: input.title.clone(),
            body: input.body.clone(),
            post_date: input.post_date,
            category: input.category.clone(),
            feature_image: input.feature_image.clone(),
            published: input.published,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<CatalogItem>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM items WHERE id = ?",
            ITEM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get item by id")?;

        match row {
            Some(row) => Ok(Some(row_to_item(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> Result<Vec<CatalogItem>> {
        let rows = sqlx::query(&format!("SELECT {} FROM items ORDER BY id", ITEM_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .context("Failed to list items")?;

        rows.iter().map(row_to_item).collect()
    }

    async fn list_published(&self) -> Result<Vec<CatalogItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM items WHERE published = 1 ORDER BY id",
            ITEM_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list published items")?;

        rows.iter().map(row_to_item).collect()
    }

    async fn list_published_by_category(&self, category: &str) -> Result<Vec<CatalogItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM items WHERE published = 1 AND category = ? ORDER BY id",
            ITEM_COLUMNS
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list items by category")?;

        rows.iter().map(row_to_item).collect()
    }

    async fn list_by_min_date(&self, min_date: NaiveDate) -> Result<Vec<CatalogItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM items WHERE post_date >= ? ORDER BY id",
            ITEM_COLUMNS
        ))
        .bind(min_date)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list items by min date")?;

        rows.iter().map(row_to_item).collect()
    }

    async fn delete(&self, id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete item")?;

        Ok(result.rows_affected())
    }
}
