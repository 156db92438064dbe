//! Order record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{BrokerOrderId, Exchange, InstrumentKey, LocalOrderId, Symbol};
use crate::domain::trading::requests::OrderRequest;
use crate::domain::trading::value_objects::{Direction, OrderStatus, OrderType};

/// Latest known state of one order, keyed by its local id.
///
/// Records are superseded by newer snapshots but never removed for the
/// lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Local identifier, immutable once issued.
    pub order_id: LocalOrderId,
    /// Broker identifier, absent until the broker accepts the order.
    pub broker_order_id: Option<BrokerOrderId>,
    /// Instrument symbol.
    pub symbol: Symbol,
    /// Listing exchange.
    pub exchange: Exchange,
    /// Buy or sell.
    pub direction: Direction,
    /// Order type.
    pub order_type: OrderType,
    /// Limit or stop price; zero for market orders.
    pub price: Decimal,
    /// Requested volume.
    pub volume: Decimal,
    /// Volume filled so far.
    pub traded: Decimal,
    /// Current status.
    pub status: OrderStatus,
    /// Time of the observation that produced this snapshot.
    pub datetime: DateTime<Utc>,
}

impl OrderRecord {
    /// Build the initial record for a request the gateway is about to submit.
    #[must_use]
    pub fn from_request(order_id: LocalOrderId, request: &OrderRequest) -> Self {
        Self {
            order_id,
            broker_order_id: None,
            symbol: request.symbol.clone(),
            exchange: request.exchange,
            direction: request.direction,
            order_type: request.order_type,
            price: request.price,
            volume: request.volume,
            traded: Decimal::ZERO,
            status: OrderStatus::Submitting,
            datetime: Utc::now(),
        }
    }

    /// Instrument key of the order.
    #[must_use]
    pub fn key(&self) -> InstrumentKey {
        InstrumentKey::new(self.symbol.clone(), self.exchange)
    }

    /// Returns true while the order can still trade or be cancelled.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Copy of this record with a different status.
    #[must_use]
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn from_request_starts_submitting() {
        let request = OrderRequest::limit(
            "AAPL",
            Exchange::Nasdaq,
            Direction::Long,
            dec!(100),
            dec!(150.25),
        );
        let record = OrderRecord::from_request(LocalOrderId::new("100001"), &request);

        assert_eq!(record.status, OrderStatus::Submitting);
        assert_eq!(record.traded, Decimal::ZERO);
        assert!(record.broker_order_id.is_none());
        assert_eq!(record.price, dec!(150.25));
        assert_eq!(record.key().to_string(), "AAPL.NASDAQ");
        assert!(record.is_active());
    }

    #[test]
    fn with_status_replaces_status_only() {
        let request = OrderRequest::market("AAPL", Exchange::Nasdaq, Direction::Short, dec!(5));
        let record = OrderRecord::from_request(LocalOrderId::new("100002"), &request)
            .with_status(OrderStatus::Rejected);

        assert_eq!(record.status, OrderStatus::Rejected);
        assert_eq!(record.order_id.as_str(), "100002");
        assert!(!record.is_active());
    }
}
