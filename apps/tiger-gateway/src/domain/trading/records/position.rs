//! Position record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{AccountId, Exchange, Symbol};
use crate::domain::trading::value_objects::Direction;

/// Latest holding snapshot for one (symbol, exchange, direction).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRecord {
    /// Account holding the position.
    pub account_id: AccountId,
    /// Instrument symbol.
    pub symbol: Symbol,
    /// Listing exchange.
    pub exchange: Exchange,
    /// Long for positive broker quantity, short otherwise.
    pub direction: Direction,
    /// Absolute quantity held.
    pub volume: Decimal,
    /// Volume locked by working orders.
    pub frozen: Decimal,
    /// Average cost.
    pub price: Decimal,
    /// Unrealized profit and loss.
    pub pnl: Decimal,
    /// Time of the observation.
    pub datetime: DateTime<Utc>,
}

/// Key under which positions are cached.
pub type PositionKey = (Symbol, Exchange, Direction);

impl PositionRecord {
    /// Cache key.
    #[must_use]
    pub fn key(&self) -> PositionKey {
        (self.symbol.clone(), self.exchange, self.direction)
    }
}
