//! Trade direction (long or short).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of an order, fill or position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Buy side / long holding.
    Long,
    /// Sell side / short holding.
    Short,
}

impl Direction {
    /// Direction of a holding given its signed broker quantity.
    ///
    /// Zero counts as short, matching how flat positions are reported.
    #[must_use]
    pub fn from_signed_quantity(quantity: i64) -> Self {
        if quantity > 0 { Self::Long } else { Self::Short }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "LONG"),
            Self::Short => write!(f, "SHORT"),
        }
    }
}
