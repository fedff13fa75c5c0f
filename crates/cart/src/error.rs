//! Unified error handling for the cart engine.
//!
//! Every public command on [`crate::CartService`] returns `Result<T, CartError>`.
//! Validation failures are also reported to observers as warning notices, so
//! a presentation layer may ignore the error value and rely on the notice.

use pipo_core::PostalCodeError;
use thiserror::Error;

use crate::storage::StorageError;

/// Cart-level error type.
#[derive(Debug, Error)]
pub enum CartError {
    /// Reading or writing the persisted cart failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The product handed to `add_item` is missing a title, price, or image,
    /// or its price is out of range.
    #[error("Incomplete product data: {0}")]
    IncompleteProduct(String),

    /// A line is already at the largest quantity a cart accepts.
    #[error("Quantity limit of {max} reached for {title:?}")]
    QuantityLimit {
        /// Title of the full line.
        title: String,
        /// The limit.
        max: u32,
    },

    /// The operation needs at least one line item.
    #[error("Cart is empty")]
    EmptyCart,

    /// The postal code could not be used for a shipping estimate.
    #[error("Invalid postal code: {0}")]
    InvalidPostalCode(#[from] PostalCodeError),

    /// Checkout was attempted before a shipping estimate was made.
    #[error("Shipping has not been calculated")]
    ShippingNotCalculated,
}

impl CartError {
    /// Whether the error is a user-input problem rather than a storage failure.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
