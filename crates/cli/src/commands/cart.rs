//! Cart commands.

use tracing::info;

use keynest_core::{CatalogId, Price};
use keynest_storefront::Storefront;
use keynest_storefront::StorefrontError;
use keynest_storefront::models::Decrement;

/// Show the persisted cart.
pub fn show(shop: &mut Storefront) {
    let cart = shop.refresh_cart();
    if cart.is_empty() {
        info!("Your cart is empty");
        return;
    }

    for line in cart.lines() {
        info!(
            id = %line.id,
            quantity = line.quantity.get(),
            "{} - {} each, {}",
            line.name,
            Price::usd(line.price).display(),
            Price::usd(line.line_total()).display()
        );
    }
    info!(
        items = cart.total_quantity(),
        subtotal = %Price::usd(cart.subtotal()).display(),
        "Cart"
    );
}

/// Add one unit of `id`.
///
/// # Errors
///
/// Returns the storefront error if the item cannot be added.
pub fn add(shop: &mut Storefront, id: u32) -> Result<(), StorefrontError> {
    let line = shop.add_to_cart(CatalogId::new(id))?;
    info!(quantity = line.quantity.get(), "{} in cart", line.name);
    Ok(())
}

/// Remove one unit of `id`.
///
/// # Errors
///
/// Returns the storefront error if the cart has no such line.
pub fn decrement(shop: &mut Storefront, id: u32) -> Result<(), StorefrontError> {
    match shop.decrement(CatalogId::new(id))? {
        Decrement::Decremented(line) => {
            info!(quantity = line.quantity.get(), "{} in cart", line.name);
        }
        Decrement::Removed(line) => info!("{} removed from cart", line.name),
    }
    Ok(())
}

/// Remove the line for `id`.
///
/// # Errors
///
/// Returns the storefront error if the cart cannot be saved.
pub fn remove(shop: &mut Storefront, id: u32) -> Result<(), StorefrontError> {
    shop.remove(CatalogId::new(id))?;
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns the storefront error if the cart cannot be saved.
pub fn clear(shop: &mut Storefront) -> Result<(), StorefrontError> {
    shop.clear_cart()
}
