//! Credential claims model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Claims embedded in a signed session credential.
///
/// The credential is self-contained: everything needed to authorize a
/// request travels inside it, and nothing is looked up or stored
/// server-side. Expiry is the only termination.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (user) identifier
    pub sub: i64,
    /// Display name of the subject
    pub name: String,
    /// Whether the subject may mutate the schedule
    pub is_admin: bool,
    /// Issued-at, seconds since the Unix epoch
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch
    pub exp: i64,
}

impl Claims {
    /// Check whether the credential is past its validity window at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp < now.timestamp()
    }
}
