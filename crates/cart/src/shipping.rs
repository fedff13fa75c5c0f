//! Simulated shipping estimator.
//!
//! There is no carrier integration. A postal code is mapped to a simulated
//! region and distance by prefix, and the fee is a flat base rate inside a
//! radius plus a per-kilometre charge beyond it:
//!
//! | CEP prefix      | Region     | Distance |
//! |-----------------|------------|----------|
//! | `087`           | `Near`     | 4.5 km   |
//! | `01`, `05`      | `Far`      | 10 km    |
//! | anything else   | `Standard` | 7 km     |
//!
//! Orders to the `Near` region at or above the free-shipping threshold ship
//! free.

use pipo_core::{PostalCode, Price};
use rust_decimal::Decimal;
use serde::Serialize;

/// Fee parameters. Defaults: R$ 3,00 up to 5 km, R$ 1,00 per extra km, free
/// shipping for nearby orders from R$ 70,00.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingRules {
    pub base_fee: Price,
    pub base_radius_km: Decimal,
    pub fee_per_extra_km: Price,
    pub free_shipping_threshold: Price,
}

impl Default for ShippingRules {
    fn default() -> Self {
        Self {
            base_fee: Price::from_cents(300),
            base_radius_km: Decimal::from(5),
            fee_per_extra_km: Price::from_cents(100),
            free_shipping_threshold: Price::from_cents(7_000),
        }
    }
}

/// Simulated delivery region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// Around the shop; eligible for free shipping.
    Near,
    /// Far side of the metro area.
    Far,
    /// Everywhere else.
    Standard,
}

/// Region and distance derived from a postal code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DistanceEstimate {
    pub region: Region,
    pub distance_km: Decimal,
}

/// Look up the simulated region and distance for `postal_code`.
#[must_use]
pub fn estimate_distance(postal_code: &PostalCode) -> DistanceEstimate {
    if postal_code.has_prefix("087") {
        DistanceEstimate {
            region: Region::Near,
            distance_km: Decimal::new(45, 1),
        }
    } else if postal_code.has_prefix("01") || postal_code.has_prefix("05") {
        DistanceEstimate {
            region: Region::Far,
            distance_km: Decimal::from(10),
        }
    } else {
        DistanceEstimate {
            region: Region::Standard,
            distance_km: Decimal::from(7),
        }
    }
}

/// Result of a shipping calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingQuote {
    pub postal_code: PostalCode,
    pub region: Region,
    pub distance_km: Decimal,
    pub fee: Price,
    /// The free-shipping promotion applied.
    pub free: bool,
}

impl ShippingQuote {
    /// Distance as shown to shoppers, e.g. `4,5` or `10`.
    #[must_use]
    pub fn distance_label(&self) -> String {
        self.distance_km.normalize().to_string().replace('.', ",")
    }
}

impl ShippingRules {
    /// Fee by distance alone, rounded to centavos.
    #[must_use]
    pub fn fee_for_distance(&self, distance_km: Decimal) -> Price {
        if distance_km <= self.base_radius_km {
            return self.base_fee.round_to_cents();
        }

        let extra_km = distance_km - self.base_radius_km;
        let extra = Price::new(self.fee_per_extra_km.amount() * extra_km);
        (self.base_fee + extra).round_to_cents()
    }

    /// Quote shipping for an order of `subtotal` to `postal_code`.
    #[must_use]
    pub fn quote(&self, postal_code: &PostalCode, subtotal: Price) -> ShippingQuote {
        let DistanceEstimate {
            region,
            distance_km,
        } = estimate_distance(postal_code);

        let free = region == Region::Near && subtotal >= self.free_shipping_threshold;
        let fee = if free {
            Price::ZERO
        } else {
            self.fee_for_distance(distance_km)
        };

        ShippingQuote {
            postal_code: postal_code.clone(),
            region,
            distance_km,
            fee,
            free,
        }
    }
}
