//! Product class of an instrument.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Product class attached to a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Product {
    /// Common stock or ETF.
    #[default]
    Equity,
    /// Listed option.
    Option,
    /// Futures contract.
    Futures,
    /// Warrant or callable bull/bear contract.
    Warrant,
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equity => write!(f, "EQUITY"),
            Self::Option => write!(f, "OPTION"),
            Self::Futures => write!(f, "FUTURES"),
            Self::Warrant => write!(f, "WARRANT"),
        }
    }
}
