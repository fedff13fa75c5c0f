//! Pipo cart engine.
//!
//! Client-side shopping cart for the Pipo food storefront: line items live in
//! a flat key-value store, quantities are adjusted by explicit commands, a
//! shipping fee is simulated from the postal code, and checkout is a local
//! state reset with a confirmation notice.
//!
//! # Architecture
//!
//! - [`CartService`] - command handlers called by the presentation layer
//! - [`storage`] - `KeyValueStore` trait, memory and file backends, and the
//!   typed [`CartStore`] adapter
//! - [`model`] - products, line items, and the cart
//! - [`shipping`] - region/distance lookup and fee rules
//! - [`totals`] - totals and the cart page view model
//! - [`checkout`] - checkout guard and receipt
//! - [`events`] - render, badge, and notice events for observers
//! - [`ids`] - line item id generators
//! - [`config`] - environment configuration
//!
//! # Example
//!
//! ```
//! use pipo_cart::{CartService, CartStore, MemoryStore, Product, SequentialIdGenerator};
//! use pipo_core::Price;
//!
//! let mut cart = CartService::new(CartStore::new(MemoryStore::new()))
//!     .with_id_generator(SequentialIdGenerator::default());
//!
//! cart.add_item(Product::new("Pipoca Doce", Price::from_cents(1_000), "doce.png")).unwrap();
//! cart.add_item(Product::new("Pipoca Doce", Price::from_cents(1_000), "doce.png")).unwrap();
//! let quote = cart.calculate_shipping("01310-000").unwrap();
//!
//! assert_eq!(quote.fee, Price::from_cents(800));
//! assert_eq!(cart.compute_totals().unwrap().total, Price::from_cents(2_800));
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod config;
pub mod error;
pub mod events;
pub mod ids;
pub mod model;
pub mod service;
pub mod shipping;
pub mod storage;
pub mod totals;

pub use checkout::OrderReceipt;
pub use config::{CartConfig, ConfigError};
pub use error::{CartError, Result};
pub use events::{CartEvent, CartObserver, EventLog, Notice, NoticeLevel};
pub use ids::{ClockIdGenerator, IdGenerator, SequentialIdGenerator};
pub use model::{Cart, LineItem, Product};
pub use service::{CartService, QuantityChange};
pub use shipping::{Region, ShippingQuote, ShippingRules};
pub use storage::{CartStore, FileStore, KeyValueStore, MemoryStore, StorageError};
pub use totals::{CartSummary, LineView, Totals};
