//! User model
//!
//! Accounts exist only so that login can mint credentials; there is no
//! user-management surface beyond the startup seed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User account entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Login name
    pub username: String,
    /// Argon2 password hash, never serialized outward
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Name shown in the portal
    pub display_name: Option<String>,
    /// Whether this account may modify the schedule
    pub is_admin: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(username: String, password_hash: String, is_admin: bool) -> Self {
        Self {
            id: 0, // Will be set by the database
            username,
            password_hash,
            display_name: None,
            is_admin,
            created_at: Utc::now(),
        }
    }

    /// The name to place into minted credentials.
    pub fn credential_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}
