//! Authentication service
//!
//! Login is the single place credentials are minted; everything after
//! that is carried by the signed token itself. When the user table is
//! empty at startup, one admin account is seeded from configuration so
//! a fresh deployment can log in at all.

use crate::db::repositories::UserRepository;
use crate::models::User;
use crate::services::password::{hash_password, verify_password};
use crate::services::token::TokenService;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Error types for authentication operations
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    /// Unknown username and wrong password are reported identically
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Authentication service: login and admin bootstrap
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(user_repo: Arc<dyn UserRepository>, tokens: Arc<TokenService>) -> Self {
        Self { user_repo, tokens }
    }

    /// Verify a username/password pair and mint a credential.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(User, String), AuthServiceError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AuthServiceError::ValidationError(
                "username and password are required".to_string(),
            ));
        }

        let user = self
            .user_repo
            .find_by_username(username)
            .await
            .context("Failed to look up user")?
            .ok_or(AuthServiceError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).context("Failed to verify password")? {
            return Err(AuthServiceError::InvalidCredentials);
        }

        let token = self.tokens.mint(&user).context("Failed to mint credential")?;
        tracing::info!(user_id = user.id, "User logged in: {}", user.username);
        Ok((user, token))
    }

    /// Seed the configured admin account if no accounts exist yet.
    ///
    /// Returns whether an account was created.
    pub async fn seed_admin(&self, username: &str, password: &str) -> Result<bool> {
        if self.user_repo.count().await.context("Failed to count users")? > 0 {
            return Ok(false);
        }

        let password_hash = hash_password(password).context("Failed to hash admin password")?;
        let admin = User::new(username.to_string(), password_hash, true);
        let created = self
            .user_repo
            .create(&admin)
            .await
            .context("Failed to seed admin account")?;

        tracing::info!(user_id = created.id, "Seeded admin account: {}", created.username);
        Ok(true)
    }
}
