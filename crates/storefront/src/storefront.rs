//! Storefront facade.
//!
//! UI events land here. The facade checks the session gate before gated
//! operations, delegates to the cart and session services, and turns every
//! outcome into a [`Notification`]. Errors are still returned so callers can
//! branch on them, but nothing here panics or needs handling to keep going.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use keynest_core::CatalogId;

use crate::catalog::{Catalog, StaticCatalog};
use crate::config::StorefrontConfig;
use crate::error::{GatedAction, Result, StorefrontError};
use crate::models::{Cart, CartLine, CatalogItem, Decrement, StoredUser};
use crate::notify::{Notification, Notifier};
use crate::services::cart::{CartError, CartManager};
use crate::services::checkout::{OrderConfirmation, OrderSummary, PaymentMethod};
use crate::services::session::{SessionError, SessionStore, SignUp};
use crate::store::{FileBackend, KeyValueStore};

/// The storefront: catalog, cart and session behind one event surface.
pub struct Storefront {
    config: StorefrontConfig,
    catalog: Arc<dyn Catalog>,
    session: SessionStore,
    cart: CartManager,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("config", &self.config)
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}

impl Storefront {
    /// Assemble a storefront over an existing store and catalog.
    ///
    /// Initializes the persisted cart on first use. An unusable store is
    /// logged, not fatal: the storefront then behaves as signed out with an
    /// empty cart.
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        store: KeyValueStore,
        catalog: Arc<dyn Catalog>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        if !store.probe() {
            warn!("Storage unavailable; cart and session will not persist");
        }

        let session = SessionStore::new(store.clone(), config.session_ttl, config.reset_delay);
        let mut cart = CartManager::new(store, Arc::clone(&catalog), Arc::clone(&notifier));
        if let Err(e) = cart.initialize() {
            warn!(error = %e, "Failed to initialize cart");
        }

        Self {
            config,
            catalog,
            session,
            cart,
            notifier,
        }
    }

    /// Open a storefront using file storage and the catalog file named in
    /// `config`.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Storage` if the data directory cannot be
    /// created and `StorefrontError::Catalog` if the catalog cannot be loaded.
    pub fn open(config: StorefrontConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let backend = FileBackend::open(&config.data_dir, &config.origin)?;
        let catalog = StaticCatalog::load(&config.catalog_path)?;
        info!(origin = %config.origin, "Storefront opened");
        Ok(Self::new(
            config,
            KeyValueStore::new(Arc::new(backend)),
            Arc::new(catalog),
            notifier,
        ))
    }

    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &dyn Catalog {
        self.catalog.as_ref()
    }

    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub const fn cart(&self) -> &CartManager {
        &self.cart
    }

    /// Reread the cart from the store, picking up writes from other tabs.
    pub fn refresh_cart(&mut self) -> &Cart {
        self.cart.refresh()
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn notify(&self, notification: &Notification) {
        self.notifier.notify(notification);
    }

    /// Log `err`, show its user message, and return it.
    fn fail<T>(&self, err: impl Into<StorefrontError>) -> Result<T> {
        let err = err.into();
        warn!(error = %err, "Storefront operation failed");
        self.notify(&Notification::error(err.user_message()));
        Err(err)
    }

    /// Check the session gate for `action` at this instant.
    fn require_session(&self, action: GatedAction) -> Result<()> {
        match self.session.check_session() {
            Ok(_) => Ok(()),
            Err(SessionError::NotSignedIn | SessionError::SessionExpired { .. }) => {
                debug!(%action, "Blocked by session gate");
                self.fail(StorefrontError::SessionRequired(action))
            }
            Err(e) => self.fail(e),
        }
    }

    /// The signed-in user, if the session is active.
    #[must_use]
    pub fn signed_in_user(&self) -> Option<StoredUser> {
        if self.session.is_session_active() {
            self.session.current_user()
        } else {
            None
        }
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add one unit of `id` to the cart. Requires an active session.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::SessionRequired` without a session, otherwise
    /// any [`crate::services::cart::CartError`].
    #[instrument(skip(self))]
    pub fn add_to_cart(&mut self, id: CatalogId) -> Result<CartLine> {
        self.require_session(GatedAction::AddToCart)?;
        match self.cart.add_item(id) {
            Ok(line) => {
                self.notify(&Notification::info(format!("{} added to cart!", line.name)));
                Ok(line)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Remove one unit of `id`.
    ///
    /// # Errors
    ///
    /// Returns any [`crate::services::cart::CartError`].
    #[instrument(skip(self))]
    pub fn decrement(&mut self, id: CatalogId) -> Result<Decrement> {
        self.cart.decrement_item(id).or_else(|e| self.fail(e))
    }

    /// Remove the line for `id` entirely.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Cart` if the cart cannot be saved.
    #[instrument(skip(self))]
    pub fn remove(&mut self, id: CatalogId) -> Result<Option<CartLine>> {
        match self.cart.remove_item(id) {
            Ok(removed) => {
                self.notify(&Notification::info("Item removed from cart"));
                Ok(removed)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Cart` if the cart cannot be saved.
    #[instrument(skip(self))]
    pub fn clear_cart(&mut self) -> Result<()> {
        match self.cart.clear() {
            Ok(()) => {
                self.notify(&Notification::success("Cart has been cleared!"));
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Mock sign-in.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Session` for invalid input or storage faults.
    pub fn sign_in(&mut self, email: &str, password: &secrecy::SecretString) -> Result<StoredUser> {
        match self.session.sign_in(email, password) {
            Ok(user) => {
                self.notify(&Notification::success("Successfully signed in!"));
                Ok(user)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Mock sign-up.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Session` for invalid input or storage faults.
    pub fn sign_up(&mut self, form: &SignUp) -> Result<StoredUser> {
        match self.session.sign_up(form) {
            Ok(user) => {
                self.notify(&Notification::success("Successfully registered!"));
                Ok(user)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Sign out and empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Session` or `StorefrontError::Cart` if state
    /// cannot be removed.
    #[instrument(skip(self))]
    pub fn sign_out(&mut self) -> Result<()> {
        if let Err(e) = self.session.sign_out() {
            return self.fail(e);
        }
        if let Err(e) = self.cart.clear() {
            return self.fail(e);
        }
        self.notify(&Notification::success("Successfully signed out!"));
        Ok(())
    }

    /// Simulate sending a password reset link.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Session` if the email is malformed.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        match self.session.request_password_reset(email).await {
            Ok(_) => {
                self.notify(&Notification::success(
                    "Password reset link has been sent to your email!",
                ));
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Catalog items matching `term`; see [`Catalog::search`].
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<&CatalogItem> {
        let results = self.catalog.search(term);
        if results.is_empty() {
            self.notify(&Notification::info(format!(
                "No products found matching \"{}\"",
                term.trim()
            )));
        }
        results
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Summarize the cart for payment. Requires an active session.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::SessionRequired` without a session and
    /// `StorefrontError::EmptyCart` if there is nothing to buy.
    #[instrument(skip(self))]
    pub fn begin_checkout(&mut self) -> Result<OrderSummary> {
        self.require_session(GatedAction::Purchase)?;

        let cart = self.cart.refresh();
        if cart.is_empty() {
            return self.fail(StorefrontError::EmptyCart);
        }
        match OrderSummary::from_lines(cart.lines(), self.config.tax_rate) {
            Ok(summary) => Ok(summary),
            Err(e) => self.fail(CartError::from(e)),
        }
    }

    /// Add `id` to the cart and go straight to checkout.
    ///
    /// # Errors
    ///
    /// As [`Storefront::add_to_cart`] and [`Storefront::begin_checkout`].
    #[instrument(skip(self))]
    pub fn buy_now(&mut self, id: CatalogId) -> Result<OrderSummary> {
        self.require_session(GatedAction::Purchase)?;
        self.add_to_cart(id)?;
        self.begin_checkout()
    }

    /// Complete a simulated payment for the current cart and empty it.
    ///
    /// # Errors
    ///
    /// As [`Storefront::begin_checkout`], plus `StorefrontError::Cart` if the
    /// cart cannot be cleared, in which case no order is placed.
    #[instrument(skip(self))]
    pub fn complete_payment(&mut self, method: PaymentMethod) -> Result<OrderConfirmation> {
        let summary = self.begin_checkout()?;
        if let Err(e) = self.cart.clear() {
            return self.fail(e);
        }

        let confirmation = OrderConfirmation::place(summary, method);
        info!(
            order_id = %confirmation.order_id,
            total = %confirmation.summary.total,
            "Order placed"
        );
        self.notify(&Notification::success(
            "Payment successful! Your order has been placed.",
        ));
        Ok(confirmation)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use rust_decimal::Decimal;
    use secrecy::SecretString;

    use super::*;
    use crate::notify::{NotificationLevel, RecordingNotifier};
    use crate::store::{MemoryBackend, StorageBackend, keys};

    fn catalog() -> Arc<dyn Catalog> {
        let item = |id: u32, name: &str, cents: i64| CatalogItem {
            id: CatalogId::new(id),
            name: name.to_string(),
            price: Decimal::new(cents, 2),
            image: String::new(),
            description: "Hot-swappable".to_string(),
            store: "KeyNest".to_string(),
            featured: "New".to_string(),
        };
        Arc::new(
            StaticCatalog::new(vec![
                item(3, "Aurora 65", 1500),
                item(7, "Tactile Pro", 4999),
            ])
            .unwrap(),
        )
    }

    fn storefront() -> (Storefront, Arc<MemoryBackend>, Arc<RecordingNotifier>) {
        let backend = Arc::new(MemoryBackend::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let config = StorefrontConfig {
            reset_delay: Duration::ZERO,
            ..StorefrontConfig::default()
        };
        let shop = Storefront::new(
            config,
            KeyValueStore::new(Arc::clone(&backend) as Arc<dyn StorageBackend>),
            catalog(),
            Arc::clone(&notifier) as Arc<dyn Notifier>,
        );
        (shop, backend, notifier)
    }

    fn signed_in() -> (Storefront, Arc<MemoryBackend>, Arc<RecordingNotifier>) {
        let (mut shop, backend, notifier) = storefront();
        shop.sign_in("test@example.com", &SecretString::from("pw".to_string()))
            .unwrap();
        (shop, backend, notifier)
    }

    #[test]
    fn test_new_initializes_empty_cart() {
        let (_, backend, _) = storefront();
        assert_eq!(backend.get_item(keys::CART).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_add_requires_session() {
        let (mut shop, backend, notifier) = storefront();

        let err = shop.add_to_cart(CatalogId::new(7)).unwrap_err();
        assert!(matches!(
            err,
            StorefrontError::SessionRequired(GatedAction::AddToCart)
        ));
        assert_eq!(
            notifier.last().unwrap(),
            Notification::error("Please sign in to add items to cart")
        );
        assert_eq!(backend.get_item(keys::CART).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_add_when_signed_in() {
        let (mut shop, _, notifier) = signed_in();

        shop.add_to_cart(CatalogId::new(7)).unwrap();
        let line = shop.add_to_cart(CatalogId::new(7)).unwrap();

        assert_eq!(line.quantity.get(), 2);
        assert_eq!(shop.cart().total_quantity(), 2);
        assert_eq!(
            notifier.last().unwrap(),
            Notification::info("Tactile Pro added to cart!")
        );
    }

    #[test]
    fn test_unknown_item_reports_error() {
        let (mut shop, _, notifier) = signed_in();

        assert!(shop.add_to_cart(CatalogId::new(99)).is_err());
        assert_eq!(notifier.last().unwrap().level, NotificationLevel::Error);
        assert!(shop.cart().cart().is_empty());
    }

    #[test]
    fn test_expired_session_blocks_purchase() {
        let (mut shop, backend, notifier) = signed_in();
        shop.add_to_cart(CatalogId::new(3)).unwrap();
        backend
            .set_item(
                keys::AUTH_TOKEN,
                r#"{"token":"mock-token-old","expiresAt":"2020-01-01T00:00:00Z"}"#,
            )
            .unwrap();

        assert!(matches!(
            shop.begin_checkout(),
            Err(StorefrontError::SessionRequired(GatedAction::Purchase))
        ));
        assert_eq!(
            notifier.last().unwrap().message,
            "Please sign in to make a purchase"
        );
        assert!(shop.signed_in_user().is_none());
        assert_eq!(backend.get_item(keys::USER).unwrap(), None);
    }

    #[test]
    fn test_checkout_empty_cart() {
        let (mut shop, _, _) = signed_in();
        assert!(matches!(
            shop.begin_checkout(),
            Err(StorefrontError::EmptyCart)
        ));
    }

    #[test]
    fn test_buy_now_then_pay() {
        let (mut shop, backend, notifier) = signed_in();

        let summary = shop.buy_now(CatalogId::new(7)).unwrap();
        assert_eq!(summary.item_count(), 1);
        assert_eq!(summary.display_total(), "$54.99");

        let confirmation = shop.complete_payment(PaymentMethod::Card).unwrap();
        assert!(confirmation.order_id.starts_with("ORD-"));
        assert_eq!(confirmation.summary, summary);
        assert!(shop.cart().cart().is_empty());
        assert_eq!(backend.get_item(keys::CART).unwrap().as_deref(), Some("[]"));
        assert_eq!(
            notifier.last().unwrap(),
            Notification::success("Payment successful! Your order has been placed.")
        );
    }

    #[test]
    fn test_sign_out_clears_cart() {
        let (mut shop, backend, _) = signed_in();
        shop.add_to_cart(CatalogId::new(3)).unwrap();

        shop.sign_out().unwrap();

        assert!(shop.signed_in_user().is_none());
        assert!(shop.cart().cart().is_empty());
        assert_eq!(backend.get_item(keys::CART).unwrap().as_deref(), Some("[]"));
        assert_eq!(backend.get_item(keys::AUTH_TOKEN).unwrap(), None);
    }

    #[test]
    fn test_storage_fault_surfaces_as_notification() {
        let (mut shop, backend, notifier) = signed_in();
        shop.add_to_cart(CatalogId::new(3)).unwrap();
        backend.set_enabled(false);

        assert!(shop.clear_cart().is_err());
        assert_eq!(
            notifier.last().unwrap(),
            Notification::error("Error saving your changes. Please try again.")
        );
        assert_eq!(shop.cart().total_quantity(), 1);
    }

    #[test]
    fn test_out_of_range_totals_fail_without_panicking() {
        let (mut shop, backend, notifier) = signed_in();
        backend
            .set_item(
                keys::CART,
                r#"[{"id": 7, "name": "Tactile Pro", "price": "79228162514264337593543950335", "quantity": 1}]"#,
            )
            .unwrap();

        assert!(matches!(
            shop.add_to_cart(CatalogId::new(7)),
            Err(StorefrontError::Cart(CartError::Overflow(_)))
        ));
        assert_eq!(
            notifier.last().unwrap(),
            Notification::error("Your cart total is too large")
        );

        assert!(matches!(
            shop.begin_checkout(),
            Err(StorefrontError::Cart(CartError::Overflow(_)))
        ));
        assert_eq!(shop.cart().total_quantity(), 1);
    }

    #[test]
    fn test_decrement_and_remove() {
        let (mut shop, _, notifier) = signed_in();
        shop.add_to_cart(CatalogId::new(3)).unwrap();
        shop.add_to_cart(CatalogId::new(3)).unwrap();
        shop.add_to_cart(CatalogId::new(7)).unwrap();

        assert!(matches!(
            shop.decrement(CatalogId::new(3)).unwrap(),
            Decrement::Decremented(line) if line.quantity.get() == 1
        ));
        assert!(shop.remove(CatalogId::new(7)).unwrap().is_some());
        assert_eq!(
            notifier.last().unwrap(),
            Notification::info("Item removed from cart")
        );
        assert_eq!(shop.cart().total_quantity(), 1);
    }

    #[test]
    fn test_search_notifies_on_no_results() {
        let (shop, _, notifier) = storefront();

        assert_eq!(shop.search("aurora").len(), 1);
        assert_eq!(shop.search("").len(), 2);
        assert!(notifier.notifications().is_empty());

        assert!(shop.search("  trackball ").is_empty());
        assert_eq!(
            notifier.last().unwrap().message,
            "No products found matching \"trackball\""
        );
    }

    #[tokio::test]
    async fn test_password_reset_notifies() {
        let (shop, _, notifier) = storefront();

        shop.request_password_reset("ada@example.com").await.unwrap();
        assert_eq!(
            notifier.last().unwrap(),
            Notification::success("Password reset link has been sent to your email!")
        );

        assert!(shop.request_password_reset("nope").await.is_err());
        assert_eq!(
            notifier.last().unwrap().message,
            "Please enter a valid email address"
        );
    }
}
