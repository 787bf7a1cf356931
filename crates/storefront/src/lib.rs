//! KeyNest Storefront library.
//!
//! The storefront core: a shopping cart, a mock session, catalog lookup and a
//! simulated checkout, all persisted in a synchronous string key/value store.
//!
//! # Architecture
//!
//! - [`store`] - Total (never-failing) JSON wrapper over a [`store::StorageBackend`]
//! - [`services::cart`] - The cart manager: read-modify-write over the store
//! - [`services::session`] - Mock sign-in/sign-up and the session gate
//! - [`services::checkout`] - Order summaries and simulated payment
//! - [`storefront`] - The facade UI events call into; enforces the session gate
//!
//! Rendering is external: components report through the [`notify::Notifier`]
//! hooks and never draw anything themselves.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod services;
pub mod store;
pub mod storefront;

pub use config::StorefrontConfig;
pub use error::StorefrontError;
pub use storefront::Storefront;
