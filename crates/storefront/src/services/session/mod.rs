//! Session service.
//!
//! Mock authentication over the key/value store. Signing in or up writes a
//! [`StoredUser`] and a fresh [`AuthToken`]; signing out deletes both. No
//! credentials are checked or stored: this stands in for a real auth
//! collaborator, and the rest of the storefront only relies on
//! [`SessionStore::is_session_active`].

mod error;

pub use error::SessionError;

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument, warn};

use keynest_core::{Email, UserId};

use crate::models::{AuthToken, StoredUser};
use crate::store::{KeyValueStore, keys};

/// Display name given to every mock sign-in.
const MOCK_USER_NAME: &str = "Test User";

/// Sign-up form contents.
#[derive(Debug)]
pub struct SignUp {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
}

/// Session state persisted in the store.
#[derive(Debug, Clone)]
pub struct SessionStore {
    store: KeyValueStore,
    token_ttl: TimeDelta,
    reset_delay: Duration,
}

impl SessionStore {
    /// Create a session store.
    ///
    /// * `token_ttl` - lifetime of newly issued tokens
    /// * `reset_delay` - simulated latency of the password reset request
    #[must_use]
    pub const fn new(store: KeyValueStore, token_ttl: TimeDelta, reset_delay: Duration) -> Self {
        Self {
            store,
            token_ttl,
            reset_delay,
        }
    }

    // =========================================================================
    // Session Gate
    // =========================================================================

    /// Whether a non-expired token is present right now.
    ///
    /// Never cached: expiry is time-dependent, so gated operations call this
    /// at the moment they run.
    #[must_use]
    pub fn is_session_active(&self) -> bool {
        self.check_session().is_ok()
    }

    /// The current token, or why there is none.
    ///
    /// # Errors
    ///
    /// See [`SessionStore::check_session_at`].
    pub fn check_session(&self) -> Result<AuthToken, SessionError> {
        self.check_session_at(Utc::now())
    }

    /// The token valid at `now`, or why there is none.
    ///
    /// Detecting an expired token signs the user out.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSignedIn` if no readable token is stored and
    /// `SessionError::SessionExpired` if the stored token has expired.
    pub fn check_session_at(&self, now: DateTime<Utc>) -> Result<AuthToken, SessionError> {
        let token = self
            .store
            .get::<AuthToken>(keys::AUTH_TOKEN)
            .ok_or(SessionError::NotSignedIn)?;

        if token.is_expired_at(now) {
            info!(expired_at = %token.expires_at(), "Session expired, clearing user");
            if let Err(e) = self.clear() {
                warn!(error = %e, "Failed to clear expired session");
            }
            return Err(SessionError::SessionExpired {
                expired_at: token.expires_at(),
            });
        }

        Ok(token)
    }

    /// The persisted user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<StoredUser> {
        self.store.get(keys::USER)
    }

    // =========================================================================
    // Mock Authentication
    // =========================================================================

    /// Sign in as the mock user under `email`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidEmail` or `SessionError::EmptyPassword`
    /// for bad input and `SessionError::Store` if the session cannot be saved.
    #[instrument(skip(self, password))]
    pub fn sign_in(&self, email: &str, password: &SecretString) -> Result<StoredUser, SessionError> {
        let email = Email::parse(email)?;
        if password.expose_secret().is_empty() {
            return Err(SessionError::EmptyPassword);
        }

        let now = Utc::now();
        let user = StoredUser {
            id: UserId::new(1),
            name: MOCK_USER_NAME.to_string(),
            email,
            created_at: now,
        };
        self.establish(&user, now)?;

        info!(user_id = %user.id, "Signed in");
        Ok(user)
    }

    /// Register a new mock user and sign them in.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyName`, `SessionError::InvalidEmail`,
    /// `SessionError::EmptyPassword` or `SessionError::PasswordMismatch` for
    /// bad input and `SessionError::Store` if the session cannot be saved.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub fn sign_up(&self, form: &SignUp) -> Result<StoredUser, SessionError> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }
        let email = Email::parse(&form.email)?;
        if form.password.expose_secret().is_empty() {
            return Err(SessionError::EmptyPassword);
        }
        if form.password.expose_secret() != form.confirm_password.expose_secret() {
            return Err(SessionError::PasswordMismatch);
        }

        let now = Utc::now();
        let user = StoredUser {
            id: UserId::new(now.timestamp_millis()),
            name: name.to_string(),
            email,
            created_at: now,
        };
        self.establish(&user, now)?;

        info!(user_id = %user.id, "Registered");
        Ok(user)
    }

    /// Persist `user` and a fresh token. If the token cannot be written the
    /// user record is rolled back so no half-open session remains.
    fn establish(&self, user: &StoredUser, now: DateTime<Utc>) -> Result<(), SessionError> {
        self.store.try_put(keys::USER, user)?;

        let token = AuthToken::issue(now, self.token_ttl);
        if let Err(e) = self.store.try_put(keys::AUTH_TOKEN, &token) {
            if !self.store.remove(keys::USER) {
                warn!("Failed to roll back user after token write failed");
            }
            return Err(e.into());
        }
        Ok(())
    }

    /// Delete the user and token.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` if either key cannot be removed.
    #[instrument(skip(self))]
    pub fn sign_out(&self) -> Result<(), SessionError> {
        self.clear()?;
        info!("Signed out");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        self.store.try_remove(keys::USER)?;
        self.store.try_remove(keys::AUTH_TOKEN)?;
        Ok(())
    }

    /// Pretend to send a password reset link to `email`.
    ///
    /// Waits the configured delay to mimic a network round trip; no email is
    /// sent.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidEmail` if the address is malformed.
    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<Email, SessionError> {
        let email = Email::parse(email)?;
        tokio::time::sleep(self.reset_delay).await;
        info!(email = %email, "Password reset link would be sent");
        Ok(email)
    }
}
