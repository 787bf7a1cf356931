//! In-memory storage backend.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use super::backend::{BackendError, StorageBackend};

/// A process-local backend backed by a `HashMap`.
///
/// Supports an optional byte quota (key + value lengths, summed over all
/// entries) and can be switched off at runtime, which is how tests reproduce
/// the faults a browser's local storage raises.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    items: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
    disabled: AtomicBool,
}

impl MemoryBackend {
    /// Create an empty backend without a quota.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty backend that rejects writes beyond `quota` bytes.
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    /// Enable or disable the backend. A disabled backend fails every call.
    pub fn set_enabled(&self, enabled: bool) {
        self.disabled.store(!enabled, Ordering::SeqCst);
    }

    fn check_enabled(&self) -> Result<(), BackendError> {
        if self.disabled.load(Ordering::SeqCst) {
            return Err(BackendError::Disabled);
        }
        Ok(())
    }
}

fn occupied_bytes<'a>(items: impl Iterator<Item = (&'a String, &'a String)>) -> usize {
    items.map(|(k, v)| k.len() + v.len()).sum()
}

impl StorageBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, BackendError> {
        self.check_enabled()?;
        let items = self.items.read().map_err(|_| BackendError::Poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), BackendError> {
        self.check_enabled()?;
        let mut items = self.items.write().map_err(|_| BackendError::Poisoned)?;

        if let Some(quota) = self.quota {
            let others = occupied_bytes(items.iter().filter(|(k, _)| k.as_str() != key));
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(BackendError::QuotaExceeded { needed, quota });
            }
        }

        items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), BackendError> {
        self.check_enabled()?;
        let mut items = self.items.write().map_err(|_| BackendError::Poisoned)?;
        items.remove(key);
        Ok(())
    }
}
