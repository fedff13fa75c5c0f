//! Pipo Core - Shared types library.
//!
//! This crate provides common types used across all Pipo components:
//! - `cart` - Cart engine (storage adapter, cart model, shipping, checkout)
//! - `cli` - Command-line front end driving the cart engine
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no
//! clocks. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for line item IDs, prices, postal codes, and
//!   quantity directions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
