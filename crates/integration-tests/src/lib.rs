//! Integration tests for KeyNest.
//!
//! Each test gets a [`TestContext`]: a temporary data directory with its own
//! catalog file, opened through the same file-backed path the CLI uses.
//! Opening a second [`Storefront`] on the same context simulates a second
//! browser tab sharing one origin's storage.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p keynest-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use tempfile::TempDir;

use keynest_storefront::notify::{Notifier, RecordingNotifier};
use keynest_storefront::store::{FileBackend, StorageBackend};
use keynest_storefront::{Storefront, StorefrontConfig};

/// Catalog written into every test context.
pub const CATALOG_JSON: &str = r#"[
    {"id": 3, "name": "Aurora 65", "price": "15.00", "image": "a.jpg",
     "description": "Gasket-mounted 65% board", "store": "KeyNest", "featured": "New"},
    {"id": 7, "name": "Tactile Pro", "price": "49.99", "image": "b.jpg",
     "description": "Brown tactile switches", "store": "Clack Co", "featured": "Sale"}
]"#;

/// Origin used unless a test picks another.
pub const DEFAULT_ORIGIN: &str = "shop.test";

/// A temporary storefront environment.
pub struct TestContext {
    dir: TempDir,
    pub config: StorefrontConfig,
}

impl TestContext {
    /// Create a fresh data directory and catalog.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or catalog cannot be written.
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let catalog_path = dir.path().join("catalog.json");
        std::fs::write(&catalog_path, CATALOG_JSON).expect("Failed to write catalog");

        let config = StorefrontConfig {
            data_dir: dir.path().join("data"),
            origin: DEFAULT_ORIGIN.to_string(),
            catalog_path,
            reset_delay: Duration::ZERO,
            ..StorefrontConfig::default()
        };
        Self { dir, config }
    }

    /// Root of the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Open a storefront (a "tab") on this context's origin.
    ///
    /// # Panics
    ///
    /// Panics if the storefront cannot be opened.
    #[must_use]
    pub fn open(&self) -> (Storefront, Arc<RecordingNotifier>) {
        self.open_with(self.config.clone())
    }

    /// Open a storefront on a different origin sharing the same data root.
    ///
    /// # Panics
    ///
    /// Panics if the storefront cannot be opened.
    #[must_use]
    pub fn open_origin(&self, origin: &str) -> (Storefront, Arc<RecordingNotifier>) {
        self.open_with(StorefrontConfig {
            origin: origin.to_string(),
            ..self.config.clone()
        })
    }

    fn open_with(&self, config: StorefrontConfig) -> (Storefront, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let shop = Storefront::open(config, Arc::clone(&notifier) as Arc<dyn Notifier>)
            .expect("Failed to open storefront");
        (shop, notifier)
    }

    fn backend(&self) -> FileBackend {
        FileBackend::open(&self.config.data_dir, &self.config.origin)
            .expect("Failed to open file backend")
    }

    /// Raw stored string under `key`, bypassing the storefront.
    ///
    /// # Panics
    ///
    /// Panics if the backing document cannot be read.
    #[must_use]
    pub fn read_raw(&self, key: &str) -> Option<String> {
        self.backend().get_item(key).expect("Failed to read item")
    }

    /// Raw stored value under `key` parsed as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the value is missing or not JSON.
    #[must_use]
    pub fn read_json(&self, key: &str) -> serde_json::Value {
        let raw = self.read_raw(key).expect("Key not set");
        serde_json::from_str(&raw).expect("Stored value is not JSON")
    }

    /// Overwrite `key` with a raw string, as another tab or a user editing
    /// storage by hand might.
    ///
    /// # Panics
    ///
    /// Panics if the backing document cannot be written.
    pub fn write_raw(&self, key: &str, value: &str) {
        self.backend()
            .set_item(key, value)
            .expect("Failed to write item");
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap a test password.
#[must_use]
pub fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

/// Open a storefront and sign in.
///
/// # Panics
///
/// Panics if sign-in fails.
#[must_use]
pub fn signed_in(ctx: &TestContext) -> (Storefront, Arc<RecordingNotifier>) {
    let (mut shop, notifier) = ctx.open();
    shop.sign_in("test@example.com", &secret("password"))
        .expect("Sign-in failed");
    (shop, notifier)
}
