//! Trade (fill) record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{Exchange, LocalOrderId, Symbol, TradeId};
use crate::domain::trading::value_objects::Direction;

/// One increment of filled volume on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Fill identifier.
    pub trade_id: TradeId,
    /// Order the fill belongs to.
    pub order_id: LocalOrderId,
    /// Instrument symbol.
    pub symbol: Symbol,
    /// Listing exchange.
    pub exchange: Exchange,
    /// Side of the filled order.
    pub direction: Direction,
    /// Price of this increment.
    pub price: Decimal,
    /// Volume of this increment.
    pub volume: Decimal,
    /// When the fill was observed.
    pub datetime: DateTime<Utc>,
}
