//! Read-only product catalog.
//!
//! The catalog is owned elsewhere; the storefront only looks items up by id
//! and filters them for search. [`StaticCatalog`] holds a fixed list, loaded
//! from a JSON array or built in code.

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use keynest_core::CatalogId;

use crate::models::CatalogItem;

/// Errors loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate catalog id: {0}")]
    DuplicateId(CatalogId),
}

/// Lookup capability the cart depends on.
pub trait Catalog: Send + Sync {
    /// The item with `id`, if the catalog has one.
    fn get(&self, id: CatalogId) -> Option<&CatalogItem>;

    /// Every item, in display order.
    fn items(&self) -> &[CatalogItem];

    /// Items whose name, description, store or badge contains `term`,
    /// ignoring case. A blank term matches everything.
    fn search(&self, term: &str) -> Vec<&CatalogItem> {
        let needle = term.trim().to_lowercase();
        self.items()
            .iter()
            .filter(|item| needle.is_empty() || item.matches(&needle))
            .collect()
    }
}

/// A catalog backed by an in-memory list.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    items: Vec<CatalogItem>,
}

impl StaticCatalog {
    /// Build a catalog from `items`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateId` if two items share an id.
    pub fn new(items: Vec<CatalogItem>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(items.len());
        if let Some(dup) = items.iter().find(|item| !seen.insert(item.id)) {
            return Err(CatalogError::DuplicateId(dup.id));
        }
        Ok(Self { items })
    }

    /// Parse a catalog from a JSON array of items.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed JSON and
    /// `CatalogError::DuplicateId` for repeated ids.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Self::new(serde_json::from_str(json)?)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read, otherwise as
    /// [`StaticCatalog::from_json`].
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&text)?;
        info!(path = %path.display(), items = catalog.items.len(), "Loaded catalog");
        Ok(catalog)
    }
}

impl Catalog for StaticCatalog {
    fn get(&self, id: CatalogId) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn items(&self) -> &[CatalogItem] {
        &self.items
    }
}
