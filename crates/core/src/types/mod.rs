//! Core types for Pipo.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod direction;
pub mod id;
pub mod postal_code;
pub mod price;

pub use direction::QuantityDirection;
pub use id::*;
pub use postal_code::{PostalCode, PostalCodeError};
pub use price::Price;
