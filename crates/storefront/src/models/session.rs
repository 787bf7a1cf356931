//! Session-related types.
//!
//! Types persisted in the store for authentication state.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use keynest_core::{Email, UserId};

/// Persisted identity of the signed-in user.
///
/// Deliberately has no password field: credentials belong to the auth
/// collaborator and never reach the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    /// When this record was written.
    pub created_at: DateTime<Utc>,
}

/// An opaque session token with an absolute expiry.
///
/// Implements `Debug` manually to redact the token value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl AuthToken {
    /// Prefix of every locally minted token.
    pub const PREFIX: &'static str = "mock-token-";

    /// Mint a new token valid for `ttl` from `now`.
    #[must_use]
    pub fn issue(now: DateTime<Utc>, ttl: TimeDelta) -> Self {
        Self {
            token: format!("{}{}", Self::PREFIX, Uuid::new_v4()),
            expires_at: now + ttl,
        }
    }

    /// Rebuild a token from its parts.
    #[must_use]
    pub const fn from_parts(token: String, expires_at: DateTime<Utc>) -> Self {
        Self { token, expires_at }
    }

    /// The token string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the token is past its expiry at `now`.
    ///
    /// A token is still valid at the exact instant of expiry.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
