//! Persistent key-value storage for the cart.
//!
//! # Layout
//!
//! The cart lives in a flat, string-valued key-value store (the browser's
//! `localStorage` in the original storefront):
//!
//! - `pipoCarrinho` - JSON array of line items
//! - `freteValor` - last computed shipping fee as a decimal string
//!
//! Both key names are configurable through [`crate::CartConfig`].
//!
//! # Backends
//!
//! - [`MemoryStore`] - in-process map, used by tests and embedders
//! - [`FileStore`] - JSON file on disk, used by the `pipo` CLI
//!
//! Anything implementing [`KeyValueStore`] can back a [`CartStore`].

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use pipo_core::Price;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::model::Cart;

/// Default key holding the serialized cart.
pub const DEFAULT_CART_KEY: &str = "pipoCarrinho";

/// Default key holding the shipping fee.
pub const DEFAULT_SHIPPING_KEY: &str = "freteValor";

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A persisted value exists but cannot be decoded.
    #[error("Corrupt value under key {key}: {reason}")]
    Corrupt {
        /// Storage key holding the bad value.
        key: String,
        /// Decoder message.
        reason: String,
    },
}

/// A string-valued key-value store.
///
/// Mirrors the `getItem`/`setItem`/`removeItem` surface of web storage.
pub trait KeyValueStore {
    /// Read the value under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

/// Typed access to the cart and shipping values inside a [`KeyValueStore`].
///
/// Nothing is cached: every load goes back to the backend.
#[derive(Debug)]
pub struct CartStore<S> {
    backend: S,
    cart_key: String,
    shipping_key: String,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Wrap a backend using the default key names.
    pub fn new(backend: S) -> Self {
        Self::with_keys(backend, DEFAULT_CART_KEY, DEFAULT_SHIPPING_KEY)
    }

    /// Wrap a backend using custom key names.
    pub fn with_keys(backend: S, cart_key: impl Into<String>, shipping_key: impl Into<String>) -> Self {
        Self {
            backend,
            cart_key: cart_key.into(),
            shipping_key: shipping_key.into(),
        }
    }

    /// Load the persisted cart. A missing or empty value is an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Corrupt` if the stored JSON cannot be decoded,
    /// or decodes to a cart that breaks the line item rules (see
    /// [`Cart::check_invariants`]).
    pub fn load_cart(&self) -> Result<Cart, StorageError> {
        let Some(raw) = self.backend.get_item(&self.cart_key)? else {
            return Ok(Cart::default());
        };
        if raw.trim().is_empty() {
            return Ok(Cart::default());
        }

        let cart: Cart = serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
            key: self.cart_key.clone(),
            reason: e.to_string(),
        })?;
        cart.check_invariants()
            .map_err(|reason| StorageError::Corrupt {
                key: self.cart_key.clone(),
                reason,
            })?;
        tracing::debug!(lines = cart.len(), "Loaded cart");
        Ok(cart)
    }

    /// Persist the whole cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or writing fails.
    pub fn save_cart(&mut self, cart: &Cart) -> Result<(), StorageError> {
        let json = serde_json::to_string(cart)?;
        self.backend.set_item(&self.cart_key, &json)
    }

    /// Delete the persisted cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub fn clear_cart(&mut self) -> Result<(), StorageError> {
        self.backend.remove_item(&self.cart_key)
    }

    /// Load the last computed shipping fee.
    ///
    /// Values that do not parse as a decimal are logged and treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub fn load_shipping(&self) -> Result<Option<Price>, StorageError> {
        let Some(raw) = self.backend.get_item(&self.shipping_key)? else {
            return Ok(None);
        };

        match raw.trim().parse::<Decimal>() {
            Ok(amount) => Ok(Some(Price::new(amount))),
            Err(e) => {
                tracing::warn!(key = %self.shipping_key, value = %raw, "Ignoring unparseable shipping value: {e}");
                Ok(None)
            }
        }
    }

    /// Persist the shipping fee as a two-decimal string.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub fn save_shipping(&mut self, fee: Price) -> Result<(), StorageError> {
        self.backend
            .set_item(&self.shipping_key, &fee.to_storage_string())
    }

    /// Delete the persisted shipping fee.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub fn clear_shipping(&mut self) -> Result<(), StorageError> {
        self.backend.remove_item(&self.shipping_key)
    }

    /// Key under which the cart is stored.
    #[must_use]
    pub fn cart_key(&self) -> &str {
        &self.cart_key
    }

    /// Key under which the shipping fee is stored.
    #[must_use]
    pub fn shipping_key(&self) -> &str {
        &self.shipping_key
    }

    /// Borrow the underlying backend.
    pub const fn backend(&self) -> &S {
        &self.backend
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pipo_core::LineItemId;

    use super::*;
    use crate::model::Product;

    fn sample_cart() -> Cart {
        let mut cart = Cart::default();
        cart.add(
            Product::new("Pipoca Doce", Price::from_cents(1_000), "img/doce.png"),
            || LineItemId::new(1),
        )
        .unwrap();
        cart
    }

    #[test]
    fn test_missing_cart_is_empty() {
        let store = CartStore::new(MemoryStore::new());
        assert!(store.load_cart().unwrap().is_empty());
    }

    #[test]
    fn test_blank_cart_value_is_empty() {
        let store = CartStore::new(MemoryStore::new().with_item(DEFAULT_CART_KEY, ""));
        assert!(store.load_cart().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load_cart() {
        let mut store = CartStore::new(MemoryStore::new());
        store.save_cart(&sample_cart()).unwrap();

        let loaded = store.load_cart().unwrap();
        assert_eq!(loaded, sample_cart());
    }

    #[test]
    fn test_cart_is_written_in_browser_format() {
        let mut store = CartStore::new(MemoryStore::new());
        store.save_cart(&sample_cart()).unwrap();

        let raw = store.backend().get_item(DEFAULT_CART_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["titulo"], "Pipoca Doce");
        assert_eq!(value[0]["quantidade"], 1);
        assert_eq!(value[0]["id"], 1);
        assert_eq!(value[0]["imagemSrc"], "img/doce.png");
        assert!(value[0]["preco"].is_number());
    }

    #[test]
    fn test_corrupt_cart_is_reported() {
        let store = CartStore::new(MemoryStore::new().with_item(DEFAULT_CART_KEY, "{not json"));
        assert!(matches!(
            store.load_cart(),
            Err(StorageError::Corrupt { ref key, .. }) if key == DEFAULT_CART_KEY
        ));
    }

    #[test]
    fn test_cart_breaking_line_rules_is_reported() {
        let seeded = r#"[
            {"titulo":"A","preco":5,"imagemSrc":"a.png","id":1,"quantidade":0},
            {"titulo":"A","preco":5,"imagemSrc":"a.png","id":2,"quantidade":1}
        ]"#;
        let store = CartStore::new(MemoryStore::new().with_item(DEFAULT_CART_KEY, seeded));

        assert!(matches!(
            store.load_cart(),
            Err(StorageError::Corrupt { ref key, ref reason })
                if key == DEFAULT_CART_KEY && reason.contains("quantity 0")
        ));
    }

    #[test]
    fn test_cart_with_duplicate_titles_is_reported() {
        let seeded = r#"[
            {"titulo":"A","preco":5,"imagemSrc":"a.png","id":1,"quantidade":1},
            {"titulo":"A","preco":5,"imagemSrc":"a.png","id":2,"quantidade":1}
        ]"#;
        let store = CartStore::new(MemoryStore::new().with_item(DEFAULT_CART_KEY, seeded));
        assert!(matches!(store.load_cart(), Err(StorageError::Corrupt { .. })));
    }

    #[test]
    fn test_shipping_roundtrip_and_clear() {
        let mut store = CartStore::new(MemoryStore::new());
        assert_eq!(store.load_shipping().unwrap(), None);

        store.save_shipping(Price::from_cents(800)).unwrap();
        assert_eq!(
            store.backend().get_item(DEFAULT_SHIPPING_KEY).unwrap().as_deref(),
            Some("8.00")
        );
        assert_eq!(store.load_shipping().unwrap(), Some(Price::from_cents(800)));

        store.clear_shipping().unwrap();
        assert_eq!(store.load_shipping().unwrap(), None);
    }

    #[test]
    fn test_legacy_zero_shipping_value_parses() {
        let store = CartStore::new(MemoryStore::new().with_item(DEFAULT_SHIPPING_KEY, "0"));
        assert_eq!(store.load_shipping().unwrap(), Some(Price::ZERO));
    }

    #[test]
    fn test_unparseable_shipping_is_absent() {
        let store = CartStore::new(MemoryStore::new().with_item(DEFAULT_SHIPPING_KEY, "grátis"));
        assert_eq!(store.load_shipping().unwrap(), None);
    }

    #[test]
    fn test_custom_keys() {
        let mut store = CartStore::with_keys(MemoryStore::new(), "cart", "ship");
        store.save_cart(&sample_cart()).unwrap();
        store.save_shipping(Price::from_cents(300)).unwrap();

        assert!(store.backend().get_item("cart").unwrap().is_some());
        assert!(store.backend().get_item("ship").unwrap().is_some());
        assert!(store.backend().get_item(DEFAULT_CART_KEY).unwrap().is_none());
    }
}
