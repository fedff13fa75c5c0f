//! Quantity adjustment direction for cart line items.

use serde::{Deserialize, Serialize};

/// Which way a quantity button moves a line item.
///
/// The storefront markup tags its `+`/`-` buttons with `adicionar` and
/// `remover`; both those and the English names parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityDirection {
    /// Add one unit.
    #[serde(alias = "adicionar")]
    Increment,
    /// Take one unit away; a line at quantity 1 is removed instead.
    #[serde(alias = "remover")]
    Decrement,
}

impl std::fmt::Display for QuantityDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Increment => write!(f, "increment"),
            Self::Decrement => write!(f, "decrement"),
        }
    }
}

impl std::str::FromStr for QuantityDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "increment" | "adicionar" | "+" => Ok(Self::Increment),
            "decrement" | "remover" | "-" => Ok(Self::Decrement),
            _ => Err(format!("invalid quantity direction: {s}")),
        }
    }
}
