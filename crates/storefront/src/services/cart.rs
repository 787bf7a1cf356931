//! Cart manager.
//!
//! The persisted cart under [`keys::CART`] is authoritative. The manager keeps
//! an in-memory mirror for reads, but every mutation starts by re-reading the
//! store, applies the change to that fresh copy, writes it back, and only then
//! replaces the mirror. A failed write therefore leaves the mirror exactly as
//! it was.
//!
//! There is no locking across managers sharing a backend: two managers that
//! interleave read-modify-write cycles resolve as last writer wins.

use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use keynest_core::CatalogId;

use crate::catalog::Catalog;
use crate::models::{Cart, CartLine, CartOverflow, Decrement};
use crate::notify::Notifier;
use crate::store::{KeyValueStore, StoreError, keys};

/// Where a missing item was looked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemLocation {
    Catalog,
    Cart,
}

impl fmt::Display for ItemLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog => f.write_str("catalog"),
            Self::Cart => f.write_str("cart"),
        }
    }
}

/// Errors from cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The id is absent from the catalog (on add) or the cart (on decrement).
    #[error("item {id} not found in {location}")]
    ItemNotFound {
        id: CatalogId,
        location: ItemLocation,
    },

    /// The change would push a quantity or total out of range.
    #[error("cart limit reached: {0}")]
    Overflow(#[from] CartOverflow),

    /// The updated cart could not be persisted.
    #[error("failed to save cart: {0}")]
    Store(#[from] StoreError),
}

/// Owner of the shopping cart.
pub struct CartManager {
    store: KeyValueStore,
    catalog: Arc<dyn Catalog>,
    notifier: Arc<dyn Notifier>,
    mirror: Cart,
}

impl fmt::Debug for CartManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartManager")
            .field("mirror", &self.mirror)
            .finish_non_exhaustive()
    }
}

impl CartManager {
    /// Create a manager and load the current cart from the store.
    #[must_use]
    pub fn new(
        store: KeyValueStore,
        catalog: Arc<dyn Catalog>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let mut manager = Self {
            store,
            catalog,
            notifier,
            mirror: Cart::new(),
        };
        manager.mirror = manager.load();
        manager
    }

    /// Write an empty cart if the store has never held one.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the store cannot be read or written.
    pub fn initialize(&mut self) -> Result<(), CartError> {
        if self.store.try_get::<Cart>(keys::CART)?.is_none() {
            self.store.try_put(keys::CART, &Cart::new())?;
            debug!("Initialized empty cart");
        }
        self.mirror = self.load();
        Ok(())
    }

    /// Read the persisted cart, treating any fault as an empty cart.
    fn load(&self) -> Cart {
        match self.store.try_get::<Cart>(keys::CART) {
            Ok(cart) => cart.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Failed to load cart, treating as empty");
                Cart::new()
            }
        }
    }

    /// Persist `cart`, then adopt it as the mirror and request a redraw.
    fn commit(&mut self, cart: Cart) -> Result<(), CartError> {
        self.store.try_put(keys::CART, &cart)?;
        self.mirror = cart;
        self.notifier.cart_changed(self.mirror.lines());
        Ok(())
    }

    /// Resynchronize the mirror from the store and return it.
    pub fn refresh(&mut self) -> &Cart {
        self.mirror = self.load();
        &self.mirror
    }

    /// Add one unit of `id`, snapshotting its catalog fields if it is new.
    ///
    /// The caller is responsible for checking that a session is active.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the catalog has no such item,
    /// `CartError::Overflow` if the cart cannot hold another unit, and
    /// `CartError::Store` if the cart cannot be saved.
    #[instrument(skip(self))]
    pub fn add_item(&mut self, id: CatalogId) -> Result<CartLine, CartError> {
        let Some(item) = self.catalog.get(id) else {
            warn!("Item not found in catalog");
            return Err(CartError::ItemNotFound {
                id,
                location: ItemLocation::Catalog,
            });
        };

        let mut cart = self.load();
        let line = cart.add(item)?;
        self.commit(cart)?;

        info!(quantity = line.quantity.get(), "Added item to cart");
        Ok(line)
    }

    /// Remove one unit of `id`, dropping the line when it reaches zero.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the cart has no line for `id` and
    /// `CartError::Store` if the cart cannot be saved.
    #[instrument(skip(self))]
    pub fn decrement_item(&mut self, id: CatalogId) -> Result<Decrement, CartError> {
        let mut cart = self.load();
        let outcome = cart.decrement(id).ok_or(CartError::ItemNotFound {
            id,
            location: ItemLocation::Cart,
        })?;
        self.commit(cart)?;

        debug!(?outcome, "Decremented cart item");
        Ok(outcome)
    }

    /// Remove the line for `id` whatever its quantity.
    ///
    /// Removing an id that is not in the cart still rewrites the cart and
    /// returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the cart cannot be saved.
    #[instrument(skip(self))]
    pub fn remove_item(&mut self, id: CatalogId) -> Result<Option<CartLine>, CartError> {
        let mut cart = self.load();
        let removed = cart.remove(id);
        self.commit(cart)?;

        debug!(removed = removed.is_some(), "Removed cart item");
        Ok(removed)
    }

    /// Empty the cart. Clearing an empty cart succeeds.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the empty cart cannot be saved.
    #[instrument(skip(self))]
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.commit(Cart::new())?;
        info!("Cart cleared");
        Ok(())
    }

    /// The cart as last read or written.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.mirror
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.mirror.lines()
    }

    /// Sum of line quantities; 0 for an empty cart.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.mirror.total_quantity()
    }

    /// Sum of `price * quantity`, unrounded.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.mirror.subtotal()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::models::CatalogItem;
    use crate::notify::RecordingNotifier;
    use crate::store::{MemoryBackend, StorageBackend};

    fn catalog() -> Arc<dyn Catalog> {
        let item = |id: u32, cents: i64| CatalogItem {
            id: CatalogId::new(id),
            name: format!("Board {id}"),
            price: Decimal::new(cents, 2),
            image: String::new(),
            description: String::new(),
            store: "KeyNest".to_string(),
            featured: String::new(),
        };
        Arc::new(StaticCatalog::new(vec![item(3, 1500), item(7, 4999)]).unwrap())
    }

    fn manager_on(backend: &Arc<MemoryBackend>) -> (CartManager, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let store = KeyValueStore::new(Arc::clone(backend) as Arc<dyn StorageBackend>);
        let manager = CartManager::new(store, catalog(), Arc::clone(&notifier) as Arc<dyn Notifier>);
        (manager, notifier)
    }

    fn manager() -> (CartManager, Arc<MemoryBackend>, Arc<RecordingNotifier>) {
        let backend = Arc::new(MemoryBackend::new());
        let (manager, notifier) = manager_on(&backend);
        (manager, backend, notifier)
    }

    #[test]
    fn test_add_twice_scenario() {
        let (mut cart, _, _) = manager();
        cart.add_item(CatalogId::new(7)).unwrap();
        let line = cart.add_item(CatalogId::new(7)).unwrap();

        assert_eq!(line.quantity.get(), 2);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.subtotal(), Decimal::new(9998, 2));
    }

    #[test]
    fn test_add_unknown_item_is_noop() {
        let (mut cart, backend, notifier) = manager();
        let err = cart.add_item(CatalogId::new(99)).unwrap_err();

        assert!(matches!(
            err,
            CartError::ItemNotFound {
                location: ItemLocation::Catalog,
                ..
            }
        ));
        assert_eq!(backend.get_item(keys::CART).unwrap(), None);
        assert!(notifier.renders().is_empty());
    }

    #[test]
    fn test_add_at_quantity_limit_reports_overflow() {
        let (mut cart, backend, notifier) = manager();
        let stored = format!(
            r#"[{{"id": 7, "name": "Board 7", "price": "49.99", "quantity": {}}}]"#,
            u32::MAX
        );
        backend.set_item(keys::CART, &stored).unwrap();
        assert_eq!(cart.refresh().total_quantity(), u32::MAX);

        assert!(matches!(
            cart.add_item(CatalogId::new(7)),
            Err(CartError::Overflow(CartOverflow::Quantity(_)))
        ));
        assert_eq!(backend.get_item(keys::CART).unwrap().unwrap(), stored);
        assert_eq!(cart.total_quantity(), u32::MAX);
        assert!(notifier.renders().is_empty());
    }

    #[test]
    fn test_overflowing_stored_cart_reads_as_empty() {
        let (mut cart, backend, _) = manager();
        backend
            .set_item(
                keys::CART,
                r#"[{"id": 3, "name": "A", "price": "1", "quantity": 3000000000},
                    {"id": 7, "name": "B", "price": "1", "quantity": 3000000000}]"#,
            )
            .unwrap();

        assert_eq!(cart.refresh().total_quantity(), 0);
        let line = cart.add_item(CatalogId::new(7)).unwrap();
        assert_eq!(line.quantity.get(), 1);
        assert_eq!(cart.total_quantity(), 1);
    }

    #[test]
    fn test_decrement_last_unit_empties_cart() {
        let (mut cart, _, _) = manager();
        cart.add_item(CatalogId::new(3)).unwrap();

        let outcome = cart.decrement_item(CatalogId::new(3)).unwrap();
        assert!(matches!(outcome, Decrement::Removed(_)));
        assert!(cart.lines().is_empty());
        assert_eq!(cart.total_quantity(), 0);
    }

    #[test]
    fn test_decrement_absent_reports_not_found() {
        let (mut cart, _, notifier) = manager();
        let err = cart.decrement_item(CatalogId::new(3)).unwrap_err();
        assert!(matches!(
            err,
            CartError::ItemNotFound {
                location: ItemLocation::Cart,
                ..
            }
        ));
        assert!(notifier.renders().is_empty());
    }

    #[test]
    fn test_clear_writes_empty_array() {
        let (mut cart, backend, _) = manager();
        cart.add_item(CatalogId::new(3)).unwrap();
        cart.add_item(CatalogId::new(7)).unwrap();

        cart.clear().unwrap();
        cart.clear().unwrap();

        let stored: Value = serde_json::from_str(&backend.get_item(keys::CART).unwrap().unwrap())
            .unwrap();
        assert_eq!(stored, Value::Array(Vec::new()));
        assert_eq!(cart.total_quantity(), 0);
    }

    #[test]
    fn test_failed_save_keeps_mirror() {
        let (mut cart, backend, notifier) = manager();
        cart.add_item(CatalogId::new(7)).unwrap();
        let before = cart.cart().clone();
        let renders = notifier.renders().len();

        backend.set_enabled(false);
        assert!(matches!(
            cart.add_item(CatalogId::new(3)),
            Err(CartError::Store(StoreError::Unavailable))
        ));
        assert!(cart.remove_item(CatalogId::new(7)).is_err());
        assert!(cart.clear().is_err());

        assert_eq!(cart.cart(), &before);
        assert_eq!(notifier.renders().len(), renders);
    }

    #[test]
    fn test_mutation_resyncs_from_store() {
        let backend = Arc::new(MemoryBackend::new());
        let (mut tab_a, _) = manager_on(&backend);
        let (mut tab_b, _) = manager_on(&backend);

        tab_a.add_item(CatalogId::new(7)).unwrap();
        // tab_b's mirror is stale, but its next mutation starts from the store.
        assert_eq!(tab_b.total_quantity(), 0);
        tab_b.add_item(CatalogId::new(3)).unwrap();

        assert_eq!(tab_b.total_quantity(), 2);
        assert_eq!(tab_a.refresh().total_quantity(), 2);
    }

    #[test]
    fn test_initialize_creates_empty_cart_once() {
        let (mut cart, backend, _) = manager();
        cart.initialize().unwrap();
        assert_eq!(backend.get_item(keys::CART).unwrap().as_deref(), Some("[]"));

        cart.add_item(CatalogId::new(3)).unwrap();
        cart.initialize().unwrap();
        assert_eq!(cart.total_quantity(), 1);
    }

    #[test]
    fn test_corrupt_stored_cart_treated_as_empty() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set_item(keys::CART, "not json").unwrap();
        let (mut cart, _) = manager_on(&backend);

        assert_eq!(cart.total_quantity(), 0);
        cart.add_item(CatalogId::new(7)).unwrap();
        assert_eq!(cart.refresh().total_quantity(), 1);
    }

    #[test]
    fn test_successful_mutation_requests_redraw() {
        let (mut cart, _, notifier) = manager();
        cart.add_item(CatalogId::new(7)).unwrap();
        cart.add_item(CatalogId::new(3)).unwrap();
        cart.remove_item(CatalogId::new(7)).unwrap();

        let renders = notifier.renders();
        assert_eq!(renders.len(), 3);
        assert_eq!(renders[2].len(), 1);
        assert_eq!(renders[2][0].id, CatalogId::new(3));
    }
}
