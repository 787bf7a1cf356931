//! Catalog item type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use keynest_core::CatalogId;

/// One product in the read-only catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Catalog-assigned identifier.
    pub id: CatalogId,
    /// Display name.
    pub name: String,
    /// Unit price in dollars.
    pub price: Decimal,
    /// Image URL or path.
    pub image: String,
    /// Short marketing description.
    pub description: String,
    /// Seller name.
    pub store: String,
    /// Badge text shown on the product card (e.g. "New").
    pub featured: String,
}

impl CatalogItem {
    /// Whether `needle` (already lowercased) occurs in any searchable field.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        [&self.name, &self.description, &self.store, &self.featured]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}
