//! Checkout commands.

use tracing::info;

use keynest_core::CatalogId;
use keynest_storefront::Storefront;
use keynest_storefront::StorefrontError;
use keynest_storefront::services::{OrderSummary, PaymentMethod};

fn log_summary(summary: &OrderSummary) {
    for line in &summary.lines {
        info!(id = %line.id, quantity = line.quantity.get(), "{}", line.name);
    }
    info!(
        items = summary.item_count(),
        subtotal = %summary.display_subtotal(),
        shipping = "Free",
        tax = %summary.display_tax(),
        total = %summary.display_total(),
        "Order summary"
    );
}

/// Show the order summary for the current cart.
///
/// # Errors
///
/// Returns the storefront error if not signed in or the cart is empty.
pub fn summary(shop: &mut Storefront) -> Result<(), StorefrontError> {
    let summary = shop.begin_checkout()?;
    log_summary(&summary);
    Ok(())
}

/// Add `id` and show the order summary.
///
/// # Errors
///
/// Returns the storefront error if not signed in or the item is unknown.
pub fn buy_now(shop: &mut Storefront, id: u32) -> Result<(), StorefrontError> {
    let summary = shop.buy_now(CatalogId::new(id))?;
    log_summary(&summary);
    Ok(())
}

/// Pay for the cart.
///
/// # Errors
///
/// Returns the storefront error if not signed in, the cart is empty, or the
/// cart cannot be cleared.
pub fn pay(shop: &mut Storefront, method: PaymentMethod) -> Result<(), StorefrontError> {
    let confirmation = shop.complete_payment(method)?;
    info!(
        order_id = %confirmation.order_id,
        method = ?confirmation.method,
        total = %confirmation.summary.display_total(),
        placed_at = %confirmation.placed_at,
        "Order confirmed"
    );
    Ok(())
}
