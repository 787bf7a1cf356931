//! Raw string storage backends.

use thiserror::Error;

/// Errors raised by a [`StorageBackend`].
#[derive(Debug, Error)]
pub enum BackendError {
    /// Writing the value would exceed the backend's size quota.
    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded {
        /// Total bytes the store would occupy after the write.
        needed: usize,
        /// Configured quota in bytes.
        quota: usize,
    },

    /// The backend has been switched off (private browsing, disabled storage).
    #[error("storage is disabled")]
    Disabled,

    /// Filesystem error.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted document could not be parsed.
    #[error("storage document is corrupt: {0}")]
    Corrupt(String),

    /// A thread panicked while holding the backend lock.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// A synchronous, origin-scoped string key/value store.
///
/// This is the shape of the browser's local storage: string keys, string
/// values, every call completes before returning. Implementations must be
/// shareable so that several views of the same origin (tabs) can hold one.
pub trait StorageBackend: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, BackendError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the write is rejected.
    fn set_item(&self, key: &str, value: &str) -> Result<(), BackendError>;

    /// Delete `key`. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), BackendError>;
}
