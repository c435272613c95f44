//! Catalog item model
//!
//! This module provides:
//! - `CatalogItem` entity representing a catalog entry
//! - `CreateItemInput` for the add-item pipeline

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Catalog item entity
///
/// `feature_image`, once set, holds a resolved remote asset reference
/// produced by the upload pipeline, never a local path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Unique identifier
    pub id: i64,
    /// Item title
    pub title: String,
    /// Body text
    pub body: String,
    /// Publish date (calendar date, no time component)
    pub post_date: NaiveDate,
    /// Category name this item belongs to
    pub category: String,
    /// Remote feature-image URL
    pub feature_image: String,
    /// Whether the item is visible on the public shop listing
    pub published: bool,
}

/// Input for creating a new catalog item
#[derive(Debug, Clone)]
pub struct CreateItemInput {
    pub title: String,
    pub body: String,
    pub post_date: NaiveDate,
    pub category: String,
    pub feature_image: String,
    pub published: bool,
}
