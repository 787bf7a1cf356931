//! Persistent key/value store.
//!
//! [`KeyValueStore`] wraps a [`StorageBackend`] and moves JSON values in and
//! out of it. The plain operations (`probe`, `put`, `get`, `remove`) are
//! total: any fault is logged and degrades to `false` / `None`, because their
//! callers sit next to rendering code that cannot do anything useful with an
//! error. The `try_*` variants expose the fault for callers that must tell a
//! failed write apart from a successful one.
//!
//! # Keys
//!
//! ```text
//! keynest_cart        → JSON array of cart lines
//! keynest_user        → JSON object, never contains a password
//! keynest_auth_token  → {"token": "...", "expiresAt": "..."}
//! ```

mod backend;
mod file;
mod memory;

pub use backend::{BackendError, StorageBackend};
pub use file::FileBackend;
pub use memory::MemoryBackend;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

/// Fixed keys under which storefront state is persisted.
pub mod keys {
    /// Key for the JSON array of cart lines.
    pub const CART: &str = "keynest_cart";

    /// Key for the signed-in user.
    pub const USER: &str = "keynest_user";

    /// Key for the session token and its expiry.
    pub const AUTH_TOKEN: &str = "keynest_auth_token";

    /// Sentinel written and deleted by availability probes.
    pub const PROBE: &str = "__storage_test__";
}

/// Errors surfaced by the fallible store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend failed its availability probe.
    #[error("storage is unavailable")]
    Unavailable,

    /// The value could not be converted to or from JSON.
    #[error("serialization fault: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend rejected an otherwise valid operation.
    #[error("storage backend error: {0}")]
    Backend(#[from] BackendError),
}

/// JSON view over a shared storage backend.
///
/// Cloning is cheap; clones share the backend, like two scripts running
/// against the same origin's storage.
#[derive(Clone)]
pub struct KeyValueStore {
    backend: Arc<dyn StorageBackend>,
}

impl std::fmt::Debug for KeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyValueStore").finish_non_exhaustive()
    }
}

impl KeyValueStore {
    /// Wrap a backend.
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// A store over a fresh [`MemoryBackend`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Check whether the backend accepts a write and a delete.
    ///
    /// Never fails; any fault yields `false`.
    #[must_use]
    pub fn probe(&self) -> bool {
        let result = self
            .backend
            .set_item(keys::PROBE, keys::PROBE)
            .and_then(|()| self.backend.remove_item(keys::PROBE));

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Storage is not available");
                false
            }
        }
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.probe() {
            Ok(())
        } else {
            Err(StoreError::Unavailable)
        }
    }

    /// Serialize `value` and store it under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the probe fails,
    /// `StoreError::Serialization` if `value` cannot be encoded, or
    /// `StoreError::Backend` if the write is rejected.
    pub fn try_put<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        self.ensure_available()?;
        let text = serde_json::to_string(value)?;
        self.backend.set_item(key, &text)?;
        debug!(key, bytes = text.len(), "Stored value");
        Ok(())
    }

    /// Read and deserialize the value under `key`.
    ///
    /// Probes the backend before every read, so each call also costs a
    /// sentinel write and delete (two document rewrites on [`FileBackend`]).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the probe fails,
    /// `StoreError::Backend` if the read fails, or `StoreError::Serialization`
    /// if the stored text is not a valid `T`.
    pub fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        self.ensure_available()?;
        match self.backend.get_item(key)? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Delete `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the probe fails or
    /// `StoreError::Backend` if the delete is rejected.
    pub fn try_remove(&self, key: &str) -> Result<(), StoreError> {
        self.ensure_available()?;
        self.backend.remove_item(key)?;
        debug!(key, "Removed value");
        Ok(())
    }

    /// Store `value` under `key`, returning whether it was written.
    #[must_use = "a failed write leaves the previous value in place"]
    pub fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        self.try_put(key, value)
            .inspect_err(|e| warn!(key, error = %e, "Failed to store value"))
            .is_ok()
    }

    /// Read the value under `key`; absent if unset, unreadable or malformed.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.try_get(key)
            .inspect_err(|e| warn!(key, error = %e, "Failed to read value"))
            .ok()
            .flatten()
    }

    /// Delete `key`, returning whether the delete went through.
    #[must_use = "a failed delete leaves the value in place"]
    pub fn remove(&self, key: &str) -> bool {
        self.try_remove(key)
            .inspect_err(|e| warn!(key, error = %e, "Failed to remove value"))
            .is_ok()
    }
}
