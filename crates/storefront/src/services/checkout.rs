//! Checkout calculations and the simulated payment outcome.
//!
//! Nothing here talks to a payment processor. A summary is computed from the
//! cart, and a "completed" payment is just an order id and a timestamp.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use rust_decimal::Decimal;
use serde::Serialize;

use keynest_core::Price;

use crate::models::cart::{checked_quantity, checked_subtotal};
use crate::models::{CartLine, CartOverflow};

/// Length of the random part of an order id.
const ORDER_ID_LENGTH: usize = 9;

/// How the customer chose to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Qr,
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "card" => Ok(Self::Card),
            "qr" => Ok(Self::Qr),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

/// Totals shown before payment.
///
/// Amounts are unrounded; use [`Price`] to format them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub lines: Vec<CartLine>,
    pub subtotal: Decimal,
    /// Always zero: shipping is free.
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl OrderSummary {
    /// Summarize `lines` with tax charged at `tax_rate` (e.g. `0.10`).
    ///
    /// # Errors
    ///
    /// Returns `CartOverflow::Totals` if the item count or any amount is out
    /// of range.
    pub fn from_lines(lines: &[CartLine], tax_rate: Decimal) -> Result<Self, CartOverflow> {
        checked_quantity(lines).ok_or(CartOverflow::Totals)?;
        let subtotal = checked_subtotal(lines).ok_or(CartOverflow::Totals)?;
        let shipping = Decimal::ZERO;
        let tax = subtotal
            .checked_mul(tax_rate)
            .ok_or(CartOverflow::Totals)?;
        let total = subtotal
            .checked_add(shipping)
            .and_then(|amount| amount.checked_add(tax))
            .ok_or(CartOverflow::Totals)?;

        Ok(Self {
            lines: lines.to_vec(),
            subtotal,
            shipping,
            tax,
            total,
        })
    }

    /// Number of units across all lines. Saturates at `u32::MAX`.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        checked_quantity(&self.lines).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn display_subtotal(&self) -> String {
        Price::usd(self.subtotal).display()
    }

    #[must_use]
    pub fn display_tax(&self) -> String {
        Price::usd(self.tax).display()
    }

    #[must_use]
    pub fn display_total(&self) -> String {
        Price::usd(self.total).display()
    }
}

/// Receipt for a simulated payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderConfirmation {
    pub order_id: String,
    pub method: PaymentMethod,
    pub summary: OrderSummary,
    pub placed_at: DateTime<Utc>,
}

impl OrderConfirmation {
    /// Confirm `summary` as paid with `method`, minting a fresh order id.
    #[must_use]
    pub fn place(summary: OrderSummary, method: PaymentMethod) -> Self {
        Self {
            order_id: generate_order_id(),
            method,
            summary,
            placed_at: Utc::now(),
        }
    }
}

/// Generate an order id: `ORD-` followed by 9 uppercase alphanumerics.
#[must_use]
pub fn generate_order_id() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ORDER_ID_LENGTH)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();
    format!("ORD-{suffix}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroU32;

    use keynest_core::CatalogId;

    use super::*;

    fn line(id: u32, cents: i64, quantity: u32) -> CartLine {
        CartLine {
            id: CatalogId::new(id),
            name: format!("Board {id}"),
            price: Decimal::new(cents, 2),
            image: String::new(),
            description: String::new(),
            store: String::new(),
            featured: String::new(),
            quantity: NonZeroU32::new(quantity).unwrap(),
        }
    }

    #[test]
    fn test_summary_totals() {
        let summary = OrderSummary::from_lines(&[line(7, 4999, 2)], Decimal::new(10, 2)).unwrap();

        assert_eq!(summary.subtotal, Decimal::new(9998, 2));
        assert_eq!(summary.shipping, Decimal::ZERO);
        assert_eq!(summary.tax, Decimal::new(9998, 3));
        assert_eq!(summary.total, Decimal::new(109_978, 3));
        assert_eq!(summary.item_count(), 2);

        assert_eq!(summary.display_subtotal(), "$99.98");
        assert_eq!(summary.display_tax(), "$10.00");
        assert_eq!(summary.display_total(), "$109.98");
    }

    #[test]
    fn test_summary_of_empty_cart() {
        let summary = OrderSummary::from_lines(&[], Decimal::new(10, 2)).unwrap();
        assert_eq!(summary.total, Decimal::ZERO);
        assert_eq!(summary.display_total(), "$0.00");
    }

    #[test]
    fn test_summary_out_of_range() {
        let mut huge = line(1, 0, 1);
        huge.price = Decimal::MAX;
        assert!(OrderSummary::from_lines(&[huge.clone()], Decimal::ZERO).is_ok());
        assert_eq!(
            OrderSummary::from_lines(&[huge], Decimal::new(10, 2)),
            Err(CartOverflow::Totals)
        );

        let many = [line(1, 1, u32::MAX), line(2, 1, 1)];
        assert_eq!(
            OrderSummary::from_lines(&many, Decimal::ZERO),
            Err(CartOverflow::Totals)
        );
    }

    #[test]
    fn test_order_id_format() {
        for _ in 0..50 {
            let id = generate_order_id();
            let suffix = id.strip_prefix("ORD-").unwrap();
            assert_eq!(suffix.len(), ORDER_ID_LENGTH);
            assert!(
                suffix
                    .chars()
                    .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
            );
        }
    }

    #[test]
    fn test_payment_method_from_str() {
        assert_eq!("Card".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert_eq!(" qr ".parse::<PaymentMethod>().unwrap(), PaymentMethod::Qr);
        assert!("cash".parse::<PaymentMethod>().is_err());
    }
}
