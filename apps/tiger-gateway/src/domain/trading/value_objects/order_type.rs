//! Order type (market, limit, stop).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order types the gateway can route to Tiger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Execute at the best available price.
    Market,
    /// Execute at the limit price or better.
    Limit,
    /// Becomes a market order once the stop price trades.
    Stop,
}

impl OrderType {
    /// Platform code, e.g. `LIMIT`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "MARKET",
            Self::Limit => "LIMIT",
            Self::Stop => "STOP",
        }
    }

    /// Returns true if the order carries a limit price.
    #[must_use]
    pub const fn has_limit_price(&self) -> bool {
        matches!(self, Self::Limit)
    }

    /// Returns true if the order carries a stop (aux) price.
    #[must_use]
    pub const fn has_stop_price(&self) -> bool {
        matches!(self, Self::Stop)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_type_price_requirements() {
        assert!(!OrderType::Market.has_limit_price());
        assert!(!OrderType::Market.has_stop_price());
        assert!(OrderType::Limit.has_limit_price());
        assert!(OrderType::Stop.has_stop_price());
    }

    #[test]
    fn order_type_display() {
        assert_eq!(OrderType::Market.to_string(), "MARKET");
        assert_eq!(OrderType::Stop.to_string(), "STOP");
    }
}
