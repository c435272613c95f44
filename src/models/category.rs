//! Category model

use serde::{Deserialize, Serialize};

/// Category entity
///
/// Categories are referenced by name from catalog items; deleting a category
/// does not touch the items that point at it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// Category name
    pub name: String,
}
