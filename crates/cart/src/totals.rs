//! Order totals and the cart page view model.

use pipo_core::{LineItemId, Price};
use serde::Serialize;

use crate::model::{Cart, LineItem};

/// Subtotal, shipping, and their sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub subtotal: Price,
    pub shipping: Price,
    pub total: Price,
}

impl Totals {
    #[must_use]
    pub fn new(subtotal: Price, shipping: Price) -> Self {
        Self {
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }

    /// Totals for `cart` with an optional persisted shipping fee.
    #[must_use]
    pub fn for_cart(cart: &Cart, shipping: Option<Price>) -> Self {
        Self::new(cart.subtotal(), shipping.unwrap_or(Price::ZERO))
    }

    /// Label shown next to the postal code field.
    #[must_use]
    pub fn shipping_label(&self) -> String {
        if self.shipping > Price::ZERO {
            format!("Frete: {}", self.shipping)
        } else {
            "Frete: Grátis / Não calculado".to_string()
        }
    }
}

/// One rendered cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineView {
    pub id: LineItemId,
    pub title: String,
    pub image_ref: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&LineItem> for LineView {
    fn from(item: &LineItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            image_ref: item.image_ref.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price.display(),
            line_total: item.line_total().display(),
        }
    }
}

/// Everything the cart page renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub lines: Vec<LineView>,
    pub totals: Totals,
    pub subtotal_display: String,
    pub shipping_display: String,
    pub total_display: String,
    pub shipping_label: String,
    pub item_count: u32,
    /// The page hides shipping, totals, and checkout when this is set.
    pub is_empty: bool,
}

impl CartSummary {
    #[must_use]
    pub fn new(cart: &Cart, shipping: Option<Price>) -> Self {
        let totals = Totals::for_cart(cart, shipping);
        Self {
            lines: cart.items().iter().map(LineView::from).collect(),
            subtotal_display: totals.subtotal.display(),
            shipping_display: totals.shipping.display(),
            total_display: totals.total.display(),
            shipping_label: totals.shipping_label(),
            item_count: cart.item_count(),
            is_empty: cart.is_empty(),
            totals,
        }
    }
}
