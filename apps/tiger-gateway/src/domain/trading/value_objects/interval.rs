//! Bar interval.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bar interval for history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    /// One minute.
    Minute,
    /// One hour.
    Hour,
    /// One trading day.
    Daily,
    /// One week.
    Weekly,
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minute => write!(f, "1m"),
            Self::Hour => write!(f, "1h"),
            Self::Daily => write!(f, "d"),
            Self::Weekly => write!(f, "w"),
        }
    }
}
