//! User model
//!
//! This module defines the User entity, the per-login history record, and
//! the registration input type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity representing a registered editor account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// User name (unique)
    pub user_name: String,
    /// Email address
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Most-recent-first login history
    pub login_history: Vec<LoginRecord>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// One successful login: when, and from what client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginRecord {
    /// Login timestamp
    pub date_time: DateTime<Utc>,
    /// User-Agent header of the logging-in client
    pub user_agent: String,
}

/// Input for creating a new user (before password hashing)
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub user_name: String,
    pub email: String,
    /// Plaintext password (will be hashed)
    pub password: String,
}
