//! Unified error handling.
//!
//! Provides a unified `StorefrontError` type over every component's errors.
//! The facade never lets one escape as a crash: each is logged, turned into a
//! user-facing notification via [`StorefrontError::user_message`], and handed
//! back to the caller, who may ignore it.

use std::fmt;

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::models::CartOverflow;
use crate::services::cart::{CartError, ItemLocation};
use crate::services::session::SessionError;
use crate::store::BackendError;

/// Operations that require an active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatedAction {
    AddToCart,
    Purchase,
}

impl fmt::Display for GatedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddToCart => f.write_str("add items to cart"),
            Self::Purchase => f.write_str("make a purchase"),
        }
    }
}

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog could not be loaded.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Storage backend could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] BackendError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Session operation failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// A gated operation ran without an active session.
    #[error("Sign-in required to {0}")]
    SessionRequired(GatedAction),

    /// Checkout was started with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,
}

impl StorefrontError {
    /// Message suitable for showing to the user.
    ///
    /// Internal details (paths, backend faults) are not exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::SessionRequired(action) => format!("Please sign in to {action}"),
            Self::EmptyCart => "Your cart is empty".to_string(),
            Self::Cart(CartError::ItemNotFound {
                location: ItemLocation::Catalog,
                ..
            }) => "That item is not available".to_string(),
            Self::Cart(CartError::ItemNotFound {
                location: ItemLocation::Cart,
                ..
            }) => "That item is not in your cart".to_string(),
            Self::Cart(CartError::Overflow(CartOverflow::Quantity(_))) => {
                "Your cart cannot hold any more of that item".to_string()
            }
            Self::Cart(CartError::Overflow(CartOverflow::Totals)) => {
                "Your cart total is too large".to_string()
            }
            Self::Cart(CartError::Store(_)) | Self::Session(SessionError::Store(_)) => {
                "Error saving your changes. Please try again.".to_string()
            }
            Self::Session(err) => match err {
                SessionError::PasswordMismatch => "Passwords do not match!".to_string(),
                SessionError::InvalidEmail(_) => "Please enter a valid email address".to_string(),
                SessionError::EmptyPassword => "Please enter a password".to_string(),
                SessionError::EmptyName => "Please enter your name".to_string(),
                SessionError::SessionExpired { .. } => {
                    "Your session has expired. Please sign in again.".to_string()
                }
                _ => "Please sign in to continue".to_string(),
            },
            Self::Config(_) | Self::Catalog(_) | Self::Storage(_) => {
                "The store is temporarily unavailable".to_string()
            }
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

#[cfg(test)]
mod tests {
    use keynest_core::CatalogId;

    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_gate_messages() {
        assert_eq!(
            StorefrontError::SessionRequired(GatedAction::AddToCart).user_message(),
            "Please sign in to add items to cart"
        );
        assert_eq!(
            StorefrontError::SessionRequired(GatedAction::Purchase).user_message(),
            "Please sign in to make a purchase"
        );
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = StorefrontError::Cart(CartError::Store(StoreError::Unavailable));
        assert!(!err.user_message().contains("unavailable"));

        let err = StorefrontError::Storage(BackendError::Corrupt("/secret/path".to_string()));
        assert!(!err.user_message().contains("/secret"));
    }

    #[test]
    fn test_item_not_found_messages() {
        let err = StorefrontError::from(CartError::ItemNotFound {
            id: CatalogId::new(1),
            location: ItemLocation::Cart,
        });
        assert_eq!(err.user_message(), "That item is not in your cart");
    }
}
