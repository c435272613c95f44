//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.

pub mod category;
pub mod item;
pub mod user;

pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use item::{ItemRepository, SqlxItemRepository};
pub use user::{SqlxUserRepository, UserRepository};
