//! Session error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No token is stored.
    #[error("not signed in")]
    NotSignedIn,

    /// A token is stored but its expiry has passed. Session state has been
    /// cleared as a side effect of detecting this.
    #[error("session expired at {expired_at}")]
    SessionExpired {
        /// When the token stopped being valid.
        expired_at: DateTime<Utc>,
    },

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] keynest_core::EmailError),

    /// Sign-up password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Password field left empty.
    #[error("password cannot be empty")]
    EmptyPassword,

    /// Display name left empty on sign-up.
    #[error("name cannot be empty")]
    EmptyName,

    /// The user or token could not be persisted or read.
    #[error("session storage error: {0}")]
    Store(#[from] StoreError),
}
