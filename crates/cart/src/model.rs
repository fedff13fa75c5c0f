//! Cart model: products, line items, and the ordered cart.
//!
//! The model is pure data. Loading, persisting, and notifying observers is
//! the job of [`crate::CartService`].

use std::collections::HashSet;

use pipo_core::{LineItemId, Price};
use serde::{Deserialize, Serialize};

use crate::error::CartError;

/// Largest quantity a single line may hold.
pub const MAX_QUANTITY: u32 = 9_999;

/// Highest unit price accepted for a product, in centavos (R$ 100.000,00).
pub const MAX_UNIT_PRICE_CENTS: i64 = 10_000_000;

fn max_unit_price() -> Price {
    Price::from_cents(MAX_UNIT_PRICE_CENTS)
}

/// A product as offered on the menu page, before it is in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    pub unit_price: Price,
    pub image_ref: String,
}

impl Product {
    pub fn new(title: impl Into<String>, unit_price: Price, image_ref: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            unit_price,
            image_ref: image_ref.into(),
        }
    }

    /// Check that the product carries everything a line item needs.
    ///
    /// # Errors
    ///
    /// Returns `CartError::IncompleteProduct` if the title or image reference
    /// is blank, or the price is not strictly positive or above
    /// [`MAX_UNIT_PRICE_CENTS`].
    pub fn validate(&self) -> Result<(), CartError> {
        if self.title.trim().is_empty() {
            return Err(CartError::IncompleteProduct("missing title".to_string()));
        }
        if self.unit_price <= Price::ZERO {
            return Err(CartError::IncompleteProduct(format!(
                "price must be positive for {:?}",
                self.title
            )));
        }
        if self.unit_price > max_unit_price() {
            return Err(CartError::IncompleteProduct(format!(
                "price above {} for {:?}",
                max_unit_price(),
                self.title
            )));
        }
        if self.image_ref.trim().is_empty() {
            return Err(CartError::IncompleteProduct(format!(
                "missing image for {:?}",
                self.title
            )));
        }
        Ok(())
    }
}

/// One product entry in the cart.
///
/// Field names on the wire match what the storefront has always written to
/// browser storage, so carts saved by older pages keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "preco", with = "price_as_number")]
    pub unit_price: Price,
    #[serde(rename = "imagemSrc")]
    pub image_ref: String,
    pub id: LineItemId,
    /// Always at least 1.
    #[serde(rename = "quantidade")]
    pub quantity: u32,
}

impl LineItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price * self.quantity
    }

    /// Add one unit.
    ///
    /// # Errors
    ///
    /// Returns `CartError::QuantityLimit` if the line already holds
    /// [`MAX_QUANTITY`] units; the line is left unchanged.
    pub fn increment(&mut self) -> Result<(), CartError> {
        if self.quantity >= MAX_QUANTITY {
            return Err(CartError::QuantityLimit {
                title: self.title.clone(),
                max: MAX_QUANTITY,
            });
        }
        self.quantity += 1;
        Ok(())
    }

    /// Why this line could not have been written by [`Cart::add`], if so.
    fn violation(&self) -> Option<String> {
        if self.title.trim().is_empty() {
            return Some(format!("line {} has no title", self.id));
        }
        if self.quantity == 0 || self.quantity > MAX_QUANTITY {
            return Some(format!(
                "line {:?} has quantity {} (expected 1..={MAX_QUANTITY})",
                self.title, self.quantity
            ));
        }
        if self.unit_price <= Price::ZERO || self.unit_price > max_unit_price() {
            return Some(format!(
                "line {:?} has out-of-range price {}",
                self.title,
                self.unit_price.amount()
            ));
        }
        None
    }
}

/// Prices in stored carts are plain JSON numbers.
mod price_as_number {
    use pipo_core::Price;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(price: &Price, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&price.amount(), serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Price, D::Error> {
        rust_decimal::serde::float::deserialize(deserializer).map(Price::new)
    }
}

/// Ordered line items; insertion order is the order products were first added.
///
/// Titles are unique within a cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn get(&self, id: LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn get_mut(&mut self, id: LineItemId) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Exact, case-sensitive title lookup.
    #[must_use]
    pub fn find_by_title(&self, title: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.title == title)
    }

    /// Add one unit of `product`.
    ///
    /// A product whose title is already in the cart bumps that line's
    /// quantity; otherwise a new line is appended with quantity 1 and an id
    /// drawn from `next_id`. Returns the resulting line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::QuantityLimit` if the matching line is already at
    /// [`MAX_QUANTITY`].
    pub fn add(
        &mut self,
        product: Product,
        next_id: impl FnOnce() -> LineItemId,
    ) -> Result<LineItem, CartError> {
        if let Some(existing) = self.items.iter_mut().find(|item| item.title == product.title) {
            existing.increment()?;
            return Ok(existing.clone());
        }

        let item = LineItem {
            title: product.title,
            unit_price: product.unit_price,
            image_ref: product.image_ref,
            id: next_id(),
            quantity: 1,
        };
        self.items.push(item.clone());
        Ok(item)
    }

    /// Remove the line with `id`, returning it if it was present.
    pub fn remove(&mut self, id: LineItemId) -> Option<LineItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Sum of unit price times quantity over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Total number of units (the badge count).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |count, item| count.saturating_add(item.quantity))
    }

    /// Check the rules every stored cart must follow: each line has a title,
    /// a quantity in `1..=MAX_QUANTITY` and a price in range, and no two
    /// lines share a title or an id.
    ///
    /// # Errors
    ///
    /// Returns a description of the first broken rule.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut titles = HashSet::new();
        let mut ids = HashSet::new();
        for item in &self.items {
            if let Some(reason) = item.violation() {
                return Err(reason);
            }
            if !titles.insert(item.title.as_str()) {
                return Err(format!("title {:?} appears on more than one line", item.title));
            }
            if !ids.insert(item.id) {
                return Err(format!("id {} appears on more than one line", item.id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(title: &str, cents: i64) -> Product {
        Product::new(title, Price::from_cents(cents), format!("img/{title}.png"))
    }

    #[test]
    fn test_add_same_title_twice_increments() {
        let mut cart = Cart::default();
        cart.add(product("Pipoca Doce", 1_000), || LineItemId::new(1)).unwrap();
        let line = cart.add(product("Pipoca Doce", 1_000), || LineItemId::new(2)).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(line.quantity, 2);
        assert_eq!(line.id, LineItemId::new(1));
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let mut cart = Cart::default();
        cart.add(product("B", 100), || LineItemId::new(1)).unwrap();
        cart.add(product("A", 100), || LineItemId::new(2)).unwrap();
        cart.add(product("B", 100), || LineItemId::new(3)).unwrap();

        let titles: Vec<_> = cart.items().iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["B", "A"]);
    }

    #[test]
    fn test_title_match_is_exact() {
        let mut cart = Cart::default();
        cart.add(product("Pipoca", 100), || LineItemId::new(1)).unwrap();
        cart.add(product("pipoca", 100), || LineItemId::new(2)).unwrap();
        assert_eq!(cart.len(), 2);
        assert!(cart.find_by_title("Pipoca").is_some());
        assert!(cart.find_by_title("Pipoca ").is_none());
    }

    #[test]
    fn test_subtotal() {
        let mut cart = Cart::default();
        cart.add(product("Ten", 1_000), || LineItemId::new(1)).unwrap();
        cart.add(product("Ten", 1_000), || LineItemId::new(2)).unwrap();
        cart.add(product("Five", 500), || LineItemId::new(3)).unwrap();

        assert_eq!(cart.subtotal(), Price::from_cents(2_500));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_empty_cart_subtotal_is_zero() {
        let cart = Cart::default();
        assert_eq!(cart.subtotal(), Price::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_remove() {
        let mut cart = Cart::default();
        cart.add(product("A", 100), || LineItemId::new(1)).unwrap();
        assert!(cart.remove(LineItemId::new(99)).is_none());
        assert_eq!(cart.remove(LineItemId::new(1)).unwrap().title, "A");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_validate_product() {
        assert!(product("A", 100).validate().is_ok());
        assert!(matches!(
            product("  ", 100).validate(),
            Err(CartError::IncompleteProduct(_))
        ));
        assert!(product("A", 0).validate().is_err());
        assert!(Product::new("A", Price::from_cents(100), "").validate().is_err());
        assert!(product("A", MAX_UNIT_PRICE_CENTS).validate().is_ok());
        assert!(product("A", MAX_UNIT_PRICE_CENTS + 1).validate().is_err());
    }

    #[test]
    fn test_add_stops_at_max_quantity() {
        let json = format!(
            r#"[{{"titulo":"A","preco":1,"imagemSrc":"a.png","id":1,"quantidade":{MAX_QUANTITY}}}]"#
        );
        let mut cart: Cart = serde_json::from_str(&json).unwrap();

        let result = cart.add(product("A", 100), || LineItemId::new(2));

        assert!(matches!(
            result,
            Err(CartError::QuantityLimit { max: MAX_QUANTITY, .. })
        ));
        assert_eq!(cart.item_count(), MAX_QUANTITY);
    }

    #[test]
    fn test_item_count_saturates() {
        let json = r#"[
            {"titulo":"A","preco":1,"imagemSrc":"a.png","id":1,"quantidade":4294967295},
            {"titulo":"B","preco":1,"imagemSrc":"b.png","id":2,"quantidade":1}
        ]"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.item_count(), u32::MAX);
    }

    #[test]
    fn test_invariants_hold_for_added_lines() {
        let mut cart = Cart::default();
        cart.add(product("A", 100), || LineItemId::new(1)).unwrap();
        cart.add(product("A", 100), || LineItemId::new(2)).unwrap();
        cart.add(product("B", 100), || LineItemId::new(3)).unwrap();
        assert!(cart.check_invariants().is_ok());
    }

    #[test]
    fn test_invariants_reject_zero_quantity_and_duplicate_titles() {
        let zero = r#"[{"titulo":"A","preco":1,"imagemSrc":"a.png","id":1,"quantidade":0}]"#;
        let cart: Cart = serde_json::from_str(zero).unwrap();
        assert!(cart.check_invariants().unwrap_err().contains("quantity 0"));

        let duplicate = r#"[
            {"titulo":"A","preco":1,"imagemSrc":"a.png","id":1,"quantidade":1},
            {"titulo":"A","preco":1,"imagemSrc":"a.png","id":2,"quantidade":1}
        ]"#;
        let cart: Cart = serde_json::from_str(duplicate).unwrap();
        assert!(cart.check_invariants().unwrap_err().contains("more than one line"));
    }

    #[test]
    fn test_invariants_reject_huge_quantity_and_price() {
        let quantity = r#"[{"titulo":"A","preco":1,"imagemSrc":"a.png","id":1,"quantidade":4294967295}]"#;
        let cart: Cart = serde_json::from_str(quantity).unwrap();
        assert!(cart.check_invariants().is_err());

        let price = r#"[{"titulo":"A","preco":1e27,"imagemSrc":"a.png","id":1,"quantidade":1}]"#;
        let cart: Cart = serde_json::from_str(price).unwrap();
        assert!(cart.check_invariants().is_err());
    }

    #[test]
    fn test_line_item_reads_browser_json() {
        let json = r#"[{"titulo":"Combo","preco":12.9,"imagemSrc":"a.png","id":1700000000000,"quantidade":3}]"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        let line = cart.items().first().unwrap();

        assert_eq!(line.unit_price, Price::from_cents(1_290));
        assert_eq!(line.line_total(), Price::from_cents(3_870));
        assert_eq!(line.id, LineItemId::new(1_700_000_000_000));
    }
}
