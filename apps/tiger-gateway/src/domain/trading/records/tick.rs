//! Last-known quote for an instrument.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{Exchange, InstrumentKey, Symbol};

/// Level-one quote snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSnapshot {
    /// Instrument symbol.
    pub symbol: Symbol,
    /// Listing exchange.
    pub exchange: Exchange,
    /// Quote time.
    pub datetime: DateTime<Utc>,
    /// Last traded price.
    pub last_price: Decimal,
    /// Session open.
    pub open_price: Decimal,
    /// Session high.
    pub high_price: Decimal,
    /// Session low.
    pub low_price: Decimal,
    /// Previous session close.
    pub pre_close: Decimal,
    /// Session volume.
    pub volume: Decimal,
    /// Session turnover.
    pub turnover: Decimal,
    /// Best bid.
    pub bid_price: Decimal,
    /// Best ask.
    pub ask_price: Decimal,
    /// Size at the best bid.
    pub bid_volume: Decimal,
    /// Size at the best ask.
    pub ask_volume: Decimal,
}

impl TickSnapshot {
    /// Cache key.
    #[must_use]
    pub fn key(&self) -> InstrumentKey {
        InstrumentKey::new(self.symbol.clone(), self.exchange)
    }

    /// True when every market field matches `other`, ignoring the timestamp.
    #[must_use]
    pub fn same_quote(&self, other: &Self) -> bool {
        self.symbol == other.symbol
            && self.exchange == other.exchange
            && self.last_price == other.last_price
            && self.open_price == other.open_price
            && self.high_price == other.high_price
            && self.low_price == other.low_price
            && self.pre_close == other.pre_close
            && self.volume == other.volume
            && self.turnover == other.turnover
            && self.bid_price == other.bid_price
            && self.ask_price == other.ask_price
            && self.bid_volume == other.bid_volume
            && self.ask_volume == other.ask_volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn tick(last: Decimal) -> TickSnapshot {
        TickSnapshot {
            symbol: Symbol::new("AAPL"),
            exchange: Exchange::Nasdaq,
            datetime: Utc::now(),
            last_price: last,
            open_price: dec!(149),
            high_price: dec!(152),
            low_price: dec!(148),
            pre_close: dec!(149.5),
            volume: dec!(1000),
            turnover: dec!(150000),
            bid_price: dec!(149.99),
            ask_price: dec!(150.01),
            bid_volume: dec!(3),
            ask_volume: dec!(4),
        }
    }

    #[test]
    fn same_quote_ignores_timestamp() {
        let a = tick(dec!(150));
        let mut b = a.clone();
        b.datetime = a.datetime + Duration::seconds(3);
        assert!(a.same_quote(&b));
    }

    #[test]
    fn same_quote_detects_price_change() {
        assert!(!tick(dec!(150)).same_quote(&tick(dec!(150.01))));
    }
}
