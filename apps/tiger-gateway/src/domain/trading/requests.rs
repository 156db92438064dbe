//! Inbound requests from the platform.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{Exchange, InstrumentKey, LocalOrderId, Symbol};
use crate::domain::trading::value_objects::{Direction, Interval, OrderType};

/// Request to place an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Symbol to trade.
    pub symbol: Symbol,
    /// Listing exchange.
    pub exchange: Exchange,
    /// Buy or sell.
    pub direction: Direction,
    /// Order type.
    pub order_type: OrderType,
    /// Limit price for limit orders, trigger price for stop orders.
    pub price: Decimal,
    /// Whole-share quantity.
    pub volume: Decimal,
    /// Free-form tag supplied by the strategy.
    #[serde(default)]
    pub reference: String,
}

impl OrderRequest {
    /// Create a market order request.
    #[must_use]
    pub fn market(
        symbol: impl Into<Symbol>,
        exchange: Exchange,
        direction: Direction,
        volume: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            exchange,
            direction,
            order_type: OrderType::Market,
            price: Decimal::ZERO,
            volume,
            reference: String::new(),
        }
    }

    /// Create a limit order request.
    #[must_use]
    pub fn limit(
        symbol: impl Into<Symbol>,
        exchange: Exchange,
        direction: Direction,
        volume: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            order_type: OrderType::Limit,
            price,
            ..Self::market(symbol, exchange, direction, volume)
        }
    }

    /// Create a stop order request.
    #[must_use]
    pub fn stop(
        symbol: impl Into<Symbol>,
        exchange: Exchange,
        direction: Direction,
        volume: Decimal,
        stop_price: Decimal,
    ) -> Self {
        Self {
            order_type: OrderType::Stop,
            price: stop_price,
            ..Self::market(symbol, exchange, direction, volume)
        }
    }

    /// Attach a strategy reference.
    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    /// Instrument key.
    #[must_use]
    pub fn key(&self) -> InstrumentKey {
        InstrumentKey::new(self.symbol.clone(), self.exchange)
    }
}

/// Request to cancel an order by its local id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelRequest {
    /// Local id returned by `send_order`.
    pub order_id: LocalOrderId,
}

impl CancelRequest {
    /// Create a cancel request.
    #[must_use]
    pub fn new(order_id: impl Into<LocalOrderId>) -> Self {
        Self {
            order_id: order_id.into(),
        }
    }
}

/// Request to stream quotes for an instrument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscribeRequest {
    /// Symbol to subscribe.
    pub symbol: Symbol,
    /// Listing exchange.
    pub exchange: Exchange,
}

impl SubscribeRequest {
    /// Create a subscribe request.
    #[must_use]
    pub fn new(symbol: impl Into<Symbol>, exchange: Exchange) -> Self {
        Self {
            symbol: symbol.into(),
            exchange,
        }
    }

    /// Instrument key.
    #[must_use]
    pub fn key(&self) -> InstrumentKey {
        InstrumentKey::new(self.symbol.clone(), self.exchange)
    }
}

/// Request for historical bars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRequest {
    /// Symbol to query.
    pub symbol: Symbol,
    /// Listing exchange.
    pub exchange: Exchange,
    /// Bar interval.
    pub interval: Interval,
    /// First day of the range.
    pub start: DateTime<Utc>,
    /// Last day of the range.
    pub end: DateTime<Utc>,
}

impl HistoryRequest {
    /// Instrument key.
    #[must_use]
    pub fn key(&self) -> InstrumentKey {
        InstrumentKey::new(self.symbol.clone(), self.exchange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn limit_request_carries_price() {
        let request = OrderRequest::limit(
            "aapl",
            Exchange::Nasdaq,
            Direction::Long,
            dec!(10),
            dec!(99.5),
        );
        assert_eq!(request.order_type, OrderType::Limit);
        assert_eq!(request.price, dec!(99.5));
        assert_eq!(request.symbol.as_str(), "AAPL");
    }

    #[test]
    fn stop_request_carries_trigger() {
        let request = OrderRequest::stop(
            "00700",
            Exchange::Sehk,
            Direction::Short,
            dec!(100),
            dec!(320),
        )
        .with_reference("stop-loss");
        assert_eq!(request.order_type, OrderType::Stop);
        assert_eq!(request.price, dec!(320));
        assert_eq!(request.reference, "stop-loss");
    }

    #[test]
    fn market_request_has_zero_price() {
        let request = OrderRequest::market("AAPL", Exchange::Nasdaq, Direction::Long, dec!(1));
        assert_eq!(request.price, Decimal::ZERO);
        assert_eq!(request.key().to_string(), "AAPL.NASDAQ");
    }
}
