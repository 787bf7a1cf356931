//! Domain models for the storefront.
//!
//! These are the shapes persisted in the key/value store and handed to the
//! rendering layer. They carry no I/O.

pub mod cart;
pub mod catalog;
pub mod session;

pub use cart::{Cart, CartLine, CartOverflow, Decrement};
pub use catalog::CatalogItem;
pub use session::{AuthToken, StoredUser};
