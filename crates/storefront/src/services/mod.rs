//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `cart` - Cart manager over the key/value store
//! - `session` - Mock authentication and the session gate
//! - `checkout` - Order summaries, order ids and simulated payment

pub mod cart;
pub mod checkout;
pub mod session;

pub use cart::{CartError, CartManager, ItemLocation};
pub use checkout::{OrderConfirmation, OrderSummary, PaymentMethod};
pub use session::{SessionError, SessionStore, SignUp};
