//! Session model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::LoginRecord;

/// Identity carried inside a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionUser {
    pub user_name: String,
    pub email: String,
    pub login_history: Vec<LoginRecord>,
}

/// A client-held authentication session.
///
/// The whole session travels in a signed cookie; the server stores nothing.
/// Expiry is checked lazily on the next request that presents the cookie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    /// Authenticated identity
    pub user: SessionUser,
    /// Issue timestamp
    pub issued_at: DateTime<Utc>,
    /// Expiration timestamp (slides forward on activity)
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}
