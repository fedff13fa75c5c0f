//! Simulated checkout.
//!
//! No payment or order is sent anywhere. Finalizing validates the cart,
//! produces a receipt for the confirmation message, and resets local state.

use pipo_core::{PostalCode, Price};
use serde::Serialize;

use crate::error::CartError;
use crate::model::{Cart, LineItem};
use crate::totals::Totals;

/// What the shopper ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderReceipt {
    pub items: Vec<LineItem>,
    pub totals: Totals,
}

impl OrderReceipt {
    /// Confirmation text shown after a successful checkout.
    #[must_use]
    pub fn confirmation_message(&self) -> String {
        format!(
            "Pedido finalizado com sucesso! Total a pagar: {}. Em breve enviaremos as instruções de pagamento.",
            self.totals.total
        )
    }
}

/// Check that `cart` can be finalized.
///
/// A zero or missing shipping fee is accepted only when the postal code field
/// holds a valid CEP, which covers the free-shipping promotion.
///
/// # Errors
///
/// - `CartError::EmptyCart` if there is nothing to order
/// - `CartError::ShippingNotCalculated` if shipping is zero and no valid postal
///   code was entered
pub fn ensure_ready(
    cart: &Cart,
    shipping: Option<Price>,
    postal_code_field: Option<&str>,
) -> Result<(), CartError> {
    if cart.is_empty() {
        return Err(CartError::EmptyCart);
    }

    let shipping_is_zero = shipping.is_none_or(|fee| fee.is_zero());
    let has_postal_code = postal_code_field.is_some_and(|raw| PostalCode::parse(raw).is_ok());
    if shipping_is_zero && !has_postal_code {
        return Err(CartError::ShippingNotCalculated);
    }

    Ok(())
}
