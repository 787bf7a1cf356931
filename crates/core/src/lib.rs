//! KeyNest Core - Shared types library.
//!
//! This crate provides the value types shared by every KeyNest component:
//! - `storefront` - Cart, session and checkout logic over a key/value store
//! - `cli` - Command-line driver for the storefront
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no clocks.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
