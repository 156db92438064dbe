//! Historical bar.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{Exchange, Symbol};
use crate::domain::trading::value_objects::Interval;

/// OHLCV bar for one interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarRecord {
    /// Instrument symbol.
    pub symbol: Symbol,
    /// Listing exchange.
    pub exchange: Exchange,
    /// Bar interval.
    pub interval: Interval,
    /// Bar open time.
    pub datetime: DateTime<Utc>,
    /// Open price.
    pub open_price: Decimal,
    /// High price.
    pub high_price: Decimal,
    /// Low price.
    pub low_price: Decimal,
    /// Close price.
    pub close_price: Decimal,
    /// Traded volume.
    pub volume: Decimal,
    /// Traded value.
    pub turnover: Decimal,
}
