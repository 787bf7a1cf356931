//! File-backed storage backend.
//!
//! Each origin gets its own directory under the data root holding a single
//! JSON document (`local_storage.json`) that maps keys to string values.
//! Writes replace the document atomically via a temporary file and rename,
//! so a crash mid-write leaves the previous document intact.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use super::backend::{BackendError, StorageBackend};

const DOCUMENT_NAME: &str = "local_storage.json";

type Document = BTreeMap<String, String>;

/// A backend persisting one origin's items to disk.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileBackend {
    /// Open (creating if needed) the storage directory for `origin` under `root`.
    ///
    /// The origin is sanitized into a single path component, so
    /// `https://shop.example:8443` and `shop.example` get distinct directories
    /// and no origin can escape `root`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Io` if the directory cannot be created.
    pub fn open(root: &Path, origin: &str) -> Result<Self, BackendError> {
        let dir = root.join(origin_dir_name(origin));
        fs::create_dir_all(&dir)?;
        let path = dir.join(DOCUMENT_NAME);
        debug!(path = %path.display(), "Opened file storage");
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// Path of the JSON document backing this origin.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Document, BackendError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(Document::new()),
            Ok(text) => {
                serde_json::from_str(&text).map_err(|e| BackendError::Corrupt(e.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Document::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_document(&self, document: &Document) -> Result<(), BackendError> {
        let text = serde_json::to_string_pretty(document)
            .map_err(|e| BackendError::Corrupt(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");

        let mut file = File::create(&tmp)?;
        file.write_all(text.as_bytes())?;
        // Data must be on disk before the rename makes it visible.
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn modify(&self, f: impl FnOnce(&mut Document)) -> Result<(), BackendError> {
        let _guard = self.lock.lock().map_err(|_| BackendError::Poisoned)?;
        let mut document = self.read_document()?;
        f(&mut document);
        self.write_document(&document)
    }
}

/// Map an origin string onto a filesystem-safe directory name.
fn origin_dir_name(origin: &str) -> String {
    let name: String = origin
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();

    match name.trim_matches('.') {
        "" => "default".to_owned(),
        trimmed => trimmed.to_owned(),
    }
}

impl StorageBackend for FileBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, BackendError> {
        let _guard = self.lock.lock().map_err(|_| BackendError::Poisoned)?;
        Ok(self.read_document()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), BackendError> {
        self.modify(|doc| {
            doc.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), BackendError> {
        self.modify(|doc| {
            doc.remove(key);
        })
    }
}
