//! User service
//!
//! Implements business logic for editor accounts:
//! - Registration with argon2 password hashing
//! - Credential checks at login, recording a login-history entry
//! - Login-history lookup

use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;

use crate::db::repositories::UserRepository;
use crate::models::{LoginRecord, RegisterInput, User};
use crate::services::password::{hash_password, verify_password};

/// Login-history entries kept per user, most recent first.
const MAX_LOGIN_HISTORY: usize = 8;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Invalid user name or password")]
    AuthenticationError,

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// User already exists
    #[error("User name '{0}' is already taken")]
    UserExists(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// User service for registration and authentication
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    /// Create a new user service
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    /// Register a new user.
    ///
    /// # Errors
    /// - `ValidationError` if the user name, email or password is empty
    /// - `UserExists` if the user name is already taken
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserServiceError> {
        let user_name = input.user_name.trim();
        if user_name.is_empty() {
            return Err(UserServiceError::ValidationError(
                "User name must not be empty".to_string(),
            ));
        }
        if input.email.trim().is_empty() {
            return Err(UserServiceError::ValidationError(
                "Email must not be empty".to_string(),
            ));
        }
        if input.password.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Password must not be empty".to_string(),
            ));
        }

        if self
            .repo
            .get_by_user_name(user_name)
            .await
            .context("Failed to check user name")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(user_name.to_string()));
        }

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;

        let user = self
            .repo
            .create(user_name, input.email.trim(), &password_hash)
            .await
            .context("Failed to create user")?;

        Ok(user)
    }

    /// Check credentials and record the login.
    ///
    /// On success a `LoginRecord` with the client's User-Agent is prepended
    /// to the user's history (capped at [`MAX_LOGIN_HISTORY`]) and
    /// persisted; the returned user carries the updated history.
    ///
    /// A wrong user name and a wrong password produce the same error.
    pub async fn authenticate(
        &self,
        user_name: &str,
        password: &str,
        user_agent: &str,
    ) -> Result<User, UserServiceError> {
        let mut user = self
            .repo
            .get_by_user_name(user_name)
            .await
            .context("Failed to look up user")?
            .ok_or(UserServiceError::AuthenticationError)?;

        let password_valid =
            verify_password(password, &user.password_hash).context("Failed to verify password")?;
        if !password_valid {
            return Err(UserServiceError::AuthenticationError);
        }

        user.login_history.insert(
            0,
            LoginRecord {
                date_time: Utc::now(),
                user_agent: user_agent.to_string(),
            },
        );
        user.login_history.truncate(MAX_LOGIN_HISTORY);

        self.repo
            .update_login_history(&user.user_name, &user.login_history)
            .await
            .context("Failed to record login")?;

        Ok(user)
    }

    /// Fetch a user's login history, most recent first.
    pub async fn login_history(&self, user_name: &str) -> Result<Vec<LoginRecord>, UserServiceError> {
        let user = self
            .repo
            .get_by_user_name(user_name)
            .await
            .context("Failed to look up user")?
            .ok_or(UserServiceError::AuthenticationError)?;

        Ok(user.login_history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxUserRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup_service() -> UserService {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        UserService::new(SqlxUserRepository::shared(pool))
    }

    fn register_input(user_name: &str) -> RegisterInput {
        RegisterInput {
            user_name: user_name.to_string(),
            email: format!("{}@example.com", user_name),
            password: "hunter2".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let service = setup_service().await;
        let user = service.register(register_input("alice")).await.unwrap();
        assert_ne!(user.password_hash, "hunter2");
        assert!(user.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let service = setup_service().await;
        service.register(register_input("alice")).await.unwrap();

        let err = service.register(register_input("alice")).await.unwrap_err();
        assert!(matches!(err, UserServiceError::UserExists(_)));
    }

    #[tokio::test]
    async fn test_register_rejects_empty_fields() {
        let service = setup_service().await;

        let mut input = register_input("alice");
        input.user_name = "  ".to_string();
        assert!(matches!(
            service.register(input).await.unwrap_err(),
            UserServiceError::ValidationError(_)
        ));

        let mut input = register_input("bob");
        input.password = String::new();
        assert!(matches!(
            service.register(input).await.unwrap_err(),
            UserServiceError::ValidationError(_)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_success_records_login() {
        let service = setup_service().await;
        service.register(register_input("alice")).await.unwrap();

        let user = service
            .authenticate("alice", "hunter2", "test-browser/1.0")
            .await
            .unwrap();
        assert_eq!(user.login_history.len(), 1);
        assert_eq!(user.login_history[0].user_agent, "test-browser/1.0");

        // The record is persisted, not just returned
        let history = service.login_history("alice").await.unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let service = setup_service().await;
        service.register(register_input("alice")).await.unwrap();

        let err = service
            .authenticate("alice", "wrong", "ua")
            .await
            .unwrap_err();
        assert!(matches!(err, UserServiceError::AuthenticationError));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_user_same_error() {
        let service = setup_service().await;
        let err = service
            .authenticate("nobody", "hunter2", "ua")
            .await
            .unwrap_err();
        assert!(matches!(err, UserServiceError::AuthenticationError));
    }

    #[tokio::test]
    async fn test_login_history_is_capped() {
        let service = setup_service().await;
        service.register(register_input("alice")).await.unwrap();

        for i in 0..(MAX_LOGIN_HISTORY + 3) {
            service
                .authenticate("alice", "hunter2", &format!("agent-{}", i))
                .await
                .unwrap();
        }

        let history = service.login_history("alice").await.unwrap();
        assert_eq!(history.len(), MAX_LOGIN_HISTORY);
        // Most recent first
        assert_eq!(
            history[0].user_agent,
            format!("agent-{}", MAX_LOGIN_HISTORY + 2)
        );
    }
}
