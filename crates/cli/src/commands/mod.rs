//! Command implementations.
//!
//! Output goes through `tracing` like the rest of the workspace; run with
//! `RUST_LOG` to change what is shown.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;

use thiserror::Error;

use keynest_storefront::StorefrontError;
use keynest_storefront::config::ConfigError;

/// Errors that end a CLI invocation.
#[derive(Debug, Error)]
pub enum CliError {
    /// Environment variables could not be parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The storefront rejected the command. The user has already been
    /// notified.
    #[error(transparent)]
    Storefront(#[from] StorefrontError),
}
