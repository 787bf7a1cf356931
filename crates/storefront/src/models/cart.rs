//! Cart types.
//!
//! A [`Cart`] is an ordered list of [`CartLine`]s with at most one line per
//! catalog id. Catalog fields are copied into the line when it is first added
//! and never refreshed, so a line keeps the price it was added at even if the
//! catalog changes later.

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use keynest_core::CatalogId;

use super::catalog::CatalogItem;

/// One entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Catalog id of the item.
    pub id: CatalogId,
    /// Name at add-time.
    pub name: String,
    /// Unit price at add-time.
    pub price: Decimal,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub store: String,
    #[serde(default)]
    pub featured: String,
    /// Number of units; a stored zero is rejected on read.
    pub quantity: NonZeroU32,
}

impl CartLine {
    /// Snapshot a catalog item into a new line with quantity 1.
    #[must_use]
    pub fn snapshot(item: &CatalogItem) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            price: item.price,
            image: item.image.clone(),
            description: item.description.clone(),
            store: item.store.clone(),
            featured: item.featured.clone(),
            quantity: NonZeroU32::MIN,
        }
    }

    /// `price * quantity`, or `None` if it does not fit a `Decimal`.
    #[must_use]
    pub fn checked_line_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity.get()))
    }

    /// `price * quantity`, unrounded. Saturates at the `Decimal` bounds.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.checked_line_total()
            .unwrap_or_else(|| saturated(self.price))
    }
}

/// A cart whose quantities or totals do not fit their numeric types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CartOverflow {
    #[error("quantity of item {0} is at its maximum")]
    Quantity(CatalogId),

    #[error("cart totals are out of range")]
    Totals,
}

/// Sum of line quantities, or `None` on overflow.
#[must_use]
pub fn checked_quantity(lines: &[CartLine]) -> Option<u32> {
    lines
        .iter()
        .try_fold(0u32, |acc, line| acc.checked_add(line.quantity.get()))
}

/// Sum of line totals, or `None` on overflow.
#[must_use]
pub fn checked_subtotal(lines: &[CartLine]) -> Option<Decimal> {
    lines.iter().try_fold(Decimal::ZERO, |acc, line| {
        acc.checked_add(line.checked_line_total()?)
    })
}

fn saturated(sign_of: Decimal) -> Decimal {
    if sign_of.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}

/// Outcome of decrementing a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decrement {
    /// Quantity went down by one; the updated line.
    Decremented(CartLine),
    /// Quantity was one; the line was removed.
    Removed(CartLine),
}

/// The shopping cart, persisted as a bare JSON array of lines.
///
/// Every `Cart` has a total quantity that fits a `u32` and a subtotal that
/// fits a `Decimal`; stored carts that break this fail to deserialize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartLine>", into = "Vec<CartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line for `id`, if present.
    #[must_use]
    pub fn get(&self, id: CatalogId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    /// Increment the line for `item`, or append a fresh snapshot of it.
    ///
    /// Returns the line as it now stands.
    ///
    /// # Errors
    ///
    /// Returns `CartOverflow` and leaves the cart unchanged if the line's
    /// quantity or the cart totals would go out of range.
    pub fn add(&mut self, item: &CatalogItem) -> Result<CartLine, CartOverflow> {
        let mut lines = self.lines.clone();
        let line = match lines.iter_mut().find(|line| line.id == item.id) {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .checked_add(1)
                    .ok_or(CartOverflow::Quantity(item.id))?;
                line.clone()
            }
            None => {
                let line = CartLine::snapshot(item);
                lines.push(line.clone());
                line
            }
        };

        *self = Self::try_from(lines)?;
        Ok(line)
    }

    /// Decrement the line for `id`, removing it when its quantity is one.
    ///
    /// Returns `None` if there is no such line.
    pub fn decrement(&mut self, id: CatalogId) -> Option<Decrement> {
        let pos = self.lines.iter().position(|line| line.id == id)?;
        let line = self.lines.get_mut(pos)?;

        match NonZeroU32::new(line.quantity.get() - 1) {
            Some(quantity) => {
                line.quantity = quantity;
                Some(Decrement::Decremented(line.clone()))
            }
            None => Some(Decrement::Removed(self.lines.remove(pos))),
        }
    }

    /// Remove the line for `id` regardless of quantity.
    pub fn remove(&mut self, id: CatalogId) -> Option<CartLine> {
        let pos = self.lines.iter().position(|line| line.id == id)?;
        Some(self.lines.remove(pos))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        checked_quantity(&self.lines).unwrap_or(u32::MAX)
    }

    /// Sum of `price * quantity` over all lines, unrounded.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        checked_subtotal(&self.lines).unwrap_or(Decimal::MAX)
    }
}

// Stored carts written by other tabs or older builds may repeat an id; fold
// repeats into the first occurrence so the one-line-per-id rule holds.
impl TryFrom<Vec<CartLine>> for Cart {
    type Error = CartOverflow;

    fn try_from(lines: Vec<CartLine>) -> Result<Self, Self::Error> {
        let mut merged: Vec<CartLine> = Vec::with_capacity(lines.len());
        for line in lines {
            match merged.iter_mut().find(|existing| existing.id == line.id) {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .checked_add(line.quantity.get())
                        .ok_or(CartOverflow::Quantity(line.id))?;
                }
                None => merged.push(line),
            }
        }

        if checked_quantity(&merged).is_none() || checked_subtotal(&merged).is_none() {
            return Err(CartOverflow::Totals);
        }
        Ok(Self { lines: merged })
    }
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}
