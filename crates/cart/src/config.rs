//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `PIPO_STORE_PATH` - File backing the store (default: `pipo-store.json`)
//! - `PIPO_CART_KEY` - Key holding the cart (default: `pipoCarrinho`)
//! - `PIPO_SHIPPING_KEY` - Key holding the shipping fee (default: `freteValor`)
//! - `PIPO_SHIPPING_BASE_FEE` - Flat fee inside the base radius (default: 3.00)
//! - `PIPO_SHIPPING_BASE_RADIUS_KM` - Radius covered by the flat fee (default: 5)
//! - `PIPO_SHIPPING_FEE_PER_KM` - Charge per km beyond the radius (default: 1.00)
//! - `PIPO_FREE_SHIPPING_THRESHOLD` - Subtotal for free nearby shipping (default: 70.00)

use std::path::PathBuf;
use std::str::FromStr;

use pipo_core::Price;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::shipping::ShippingRules;
use crate::storage::{DEFAULT_CART_KEY, DEFAULT_SHIPPING_KEY};

const DEFAULT_STORE_PATH: &str = "pipo-store.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart engine configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// File backing the store
    pub store_path: PathBuf,
    /// Storage key for the serialized cart
    pub cart_key: String,
    /// Storage key for the shipping fee
    pub shipping_key: String,
    /// Shipping fee parameters
    pub shipping: ShippingRules,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            cart_key: DEFAULT_CART_KEY.to_string(),
            shipping_key: DEFAULT_SHIPPING_KEY.to_string(),
            shipping: ShippingRules::default(),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a numeric variable is not a valid decimal or
    /// a key name is blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let defaults = Self::default();
        let rules = defaults.shipping;

        let shipping = ShippingRules {
            base_fee: get_price_env("PIPO_SHIPPING_BASE_FEE", rules.base_fee)?,
            base_radius_km: get_decimal_env("PIPO_SHIPPING_BASE_RADIUS_KM", rules.base_radius_km)?,
            fee_per_extra_km: get_price_env("PIPO_SHIPPING_FEE_PER_KM", rules.fee_per_extra_km)?,
            free_shipping_threshold: get_price_env(
                "PIPO_FREE_SHIPPING_THRESHOLD",
                rules.free_shipping_threshold,
            )?,
        };

        Ok(Self {
            store_path: get_optional_env("PIPO_STORE_PATH").map_or(defaults.store_path, PathBuf::from),
            cart_key: get_key_env("PIPO_CART_KEY", &defaults.cart_key)?,
            shipping_key: get_key_env("PIPO_SHIPPING_KEY", &defaults.shipping_key)?,
            shipping,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get a storage key name, rejecting blank values.
fn get_key_env(key: &str, default: &str) -> Result<String, ConfigError> {
    match get_optional_env(key) {
        None => Ok(default.to_string()),
        Some(value) if value.trim().is_empty() => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must not be blank".to_string(),
        )),
        Some(value) => Ok(value),
    }
}

/// Get a non-negative decimal from the environment.
fn get_decimal_env(key: &str, default: Decimal) -> Result<Decimal, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |raw| parse_non_negative(key, &raw))
}

fn get_price_env(key: &str, default: Price) -> Result<Price, ConfigError> {
    get_decimal_env(key, default.amount()).map(Price::new)
}

/// Parse a decimal, accepting either `.` or `,` as the decimal separator.
fn parse_non_negative(key: &str, raw: &str) -> Result<Decimal, ConfigError> {
    let normalized = raw.trim().replace(',', ".");
    let value = Decimal::from_str(&normalized)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must not be negative (got {raw})"),
        ));
    }
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CartConfig::default();
        assert_eq!(config.cart_key, "pipoCarrinho");
        assert_eq!(config.shipping_key, "freteValor");
        assert_eq!(config.store_path, PathBuf::from("pipo-store.json"));
        assert_eq!(config.shipping, ShippingRules::default());
    }

    #[test]
    fn test_parse_decimal_with_dot_or_comma() {
        assert_eq!(parse_non_negative("X", "3.50").unwrap(), Decimal::new(350, 2));
        assert_eq!(parse_non_negative("X", " 3,50 ").unwrap(), Decimal::new(350, 2));
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        let err = parse_non_negative("PIPO_SHIPPING_BASE_FEE", "three").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "PIPO_SHIPPING_BASE_FEE"));
    }

    #[test]
    fn test_parse_decimal_rejects_negative() {
        assert!(parse_non_negative("X", "-1").is_err());
        assert!(parse_non_negative("X", "0").is_ok());
    }

    #[test]
    fn test_unset_variables_use_defaults() {
        assert_eq!(
            get_decimal_env("PIPO_TEST_SURELY_UNSET_VARIABLE", Decimal::ONE).unwrap(),
            Decimal::ONE
        );
        assert_eq!(
            get_key_env("PIPO_TEST_SURELY_UNSET_VARIABLE", "fallback").unwrap(),
            "fallback"
        );
    }
}
