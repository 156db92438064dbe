//! Order lifecycle: placement, cancellation and reconciliation.
//!
//! Order records are level-triggered: every observation from the broker,
//! polled or pushed, replaces the stored snapshot and is re-emitted in full.
//! Fills are derived from increases in traded volume.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::contracts::ContractCache;
use super::emitter::Emitter;
use super::registry::IdentifierRegistry;
use super::task::ConnectionKind;
use super::translator;
use crate::broker::{Placement, TigerOrder, TigerOrderSnapshot, TimeInForce, TradeClient};
use crate::domain::shared::{BrokerOrderId, LocalOrderId, Symbol, TradeId};
use crate::domain::trading::{
    CancelRequest, GatewayEvent, OrderRecord, OrderRequest, OrderStatus, OrderType, Product,
    TradeRecord,
};
use crate::error::TaskError;
use crate::observability;

/// Fill progress last observed for one order.
#[derive(Debug, Clone, Copy, Default)]
struct FillState {
    traded: Decimal,
    avg_price: Option<Decimal>,
    fills: u32,
}

/// Owns the identifier registry and the order book of the session.
#[derive(Debug)]
pub struct OrderManager {
    emitter: Emitter,
    account: String,
    registry: IdentifierRegistry,
    orders: HashMap<LocalOrderId, OrderRecord>,
    fills: HashMap<LocalOrderId, FillState>,
}

impl OrderManager {
    /// Create a manager placing orders for `account`.
    #[must_use]
    pub fn new(emitter: Emitter, account: impl Into<String>) -> Self {
        Self {
            emitter,
            account: account.into(),
            registry: IdentifierRegistry::new(),
            orders: HashMap::new(),
            fills: HashMap::new(),
        }
    }

    /// Submit an order.
    ///
    /// Returns the local id on acceptance. Every failure is reported as a
    /// `Rejected` order event and yields the empty id.
    pub fn send_order(
        &mut self,
        request: &OrderRequest,
        trade: Option<&dyn TradeClient>,
        contracts: &mut ContractCache,
    ) -> LocalOrderId {
        let local = self.registry.next_local_id();
        let record = OrderRecord::from_request(local.clone(), request);
        contracts.ensure(&request.key(), Product::Equity, &self.emitter);

        let order = match self.build_order(request) {
            Ok(order) => order,
            Err(reason) => return self.reject(record, &reason),
        };
        let Some(trade) = trade else {
            return self.reject(record, "trade connection unavailable");
        };

        match trade.place_order(&order) {
            Ok(Placement::Accepted { id }) => self.accept(record, BrokerOrderId::from(id)),
            Ok(Placement::Rejected { reason }) => self.reject(record, &reason),
            Err(e) => self.reject(record, &e.to_string()),
        }
    }

    /// Reject a request without contacting the broker. Emits the `Rejected`
    /// order event and yields the empty id.
    pub fn reject_request(&mut self, request: &OrderRequest, reason: &str) -> LocalOrderId {
        let record = OrderRecord::from_request(self.registry.next_local_id(), request);
        self.reject(record, reason)
    }

    fn build_order(&self, request: &OrderRequest) -> Result<TigerOrder, String> {
        let market = translator::market_for(request.exchange)
            .ok_or_else(|| format!("unsupported exchange {}", request.exchange))?;
        let quantity = request
            .volume
            .trunc()
            .to_u64()
            .filter(|q| *q > 0)
            .ok_or_else(|| format!("invalid volume {}", request.volume))?;

        let (limit_price, aux_price) = match request.order_type {
            OrderType::Limit => (Some(request.price), None),
            OrderType::Stop => (None, Some(request.price)),
            OrderType::Market => (None, None),
        };

        Ok(TigerOrder {
            account: self.account.clone(),
            symbol: request.symbol.to_string(),
            market,
            action: translator::action_for(request.direction),
            order_type: translator::tiger_order_type(request.order_type),
            quantity,
            limit_price,
            aux_price,
            time_in_force: TimeInForce::Day,
        })
    }

    fn accept(&mut self, mut record: OrderRecord, broker: BrokerOrderId) -> LocalOrderId {
        let local = record.order_id.clone();
        if let Err(e) = self.registry.bind(&local, &broker) {
            self.emitter
                .log_failure(format!("Order {local} accepted but not bound: {e}"));
        }
        record.broker_order_id = Some(broker.clone());

        tracing::info!(local_id = %local, broker_id = %broker, "Order accepted");
        observability::record_order_submission(
            self.emitter.gateway_name(),
            "accepted",
            record.order_type.as_str(),
        );

        self.orders.insert(local.clone(), record.clone());
        self.emitter.emit(GatewayEvent::Order(record));
        local
    }

    fn reject(&mut self, record: OrderRecord, reason: &str) -> LocalOrderId {
        let record = record.with_status(OrderStatus::Rejected);
        observability::record_order_submission(
            self.emitter.gateway_name(),
            "rejected",
            record.order_type.as_str(),
        );
        self.emitter.log_failure(format!(
            "Order {} for {} rejected: {reason}",
            record.order_id,
            record.key()
        ));

        self.orders.insert(record.order_id.clone(), record.clone());
        self.emitter.emit(GatewayEvent::Order(record));
        LocalOrderId::empty()
    }

    /// Request cancellation. The resulting status arrives through
    /// reconciliation.
    pub fn cancel_order(&mut self, request: &CancelRequest, trade: Option<&dyn TradeClient>) {
        let gateway = self.emitter.gateway_name().to_string();
        let local = &request.order_id;

        let Some(broker) = self.registry.lookup_broker(local) else {
            observability::record_cancel(&gateway, "unbound");
            self.emitter
                .log(format!("Cancel ignored: order {local} has no broker id"));
            return;
        };
        let Some(numeric) = broker.as_numeric() else {
            observability::record_cancel(&gateway, "failed");
            self.emitter
                .log_failure(format!("Cancel of order {local} failed: bad broker id {broker}"));
            return;
        };
        let Some(trade) = trade else {
            observability::record_cancel(&gateway, "failed");
            self.emitter.log_failure(format!(
                "Cancel of order {local} failed: trade connection unavailable"
            ));
            return;
        };

        match trade.cancel_order(numeric) {
            Ok(()) => {
                observability::record_cancel(&gateway, "requested");
                self.emitter
                    .log(format!("Cancel requested for order {local} ({broker})"));
            }
            Err(e) => {
                observability::record_cancel(&gateway, "failed");
                self.emitter
                    .log_failure(format!("Cancel of order {local} failed: {e}"));
            }
        }
    }

    /// Poll every order of the account and reconcile each.
    pub fn query_orders(
        &mut self,
        trade: Option<&dyn TradeClient>,
        contracts: &mut ContractCache,
    ) -> Result<(), TaskError> {
        let trade = trade.ok_or(TaskError::NotConnected {
            kind: ConnectionKind::Trade,
        })?;
        let snapshots = trade
            .get_orders()
            .map_err(|e| TaskError::broker("query_orders", e))?;

        for snapshot in &snapshots {
            self.reconcile(snapshot, contracts);
        }
        Ok(())
    }

    /// Merge one broker observation of an order.
    ///
    /// Orders first seen here are adopted under a fresh local id.
    pub fn reconcile(
        &mut self,
        snapshot: &TigerOrderSnapshot,
        contracts: &mut ContractCache,
    ) -> OrderRecord {
        let broker = BrokerOrderId::from(snapshot.id);
        let (local, adopted) = self.registry.adopt(&broker);
        if adopted {
            tracing::debug!(local_id = %local, broker_id = %broker, "Adopted broker order");
        }

        let previous = self.orders.get(&local);
        let exchange = translator::exchange_for(snapshot.market);
        let symbol = Symbol::new(&snapshot.symbol);
        let price = snapshot
            .limit_price
            .or(snapshot.aux_price)
            .or_else(|| previous.map(|p| p.price))
            .unwrap_or(Decimal::ZERO);
        let datetime = snapshot
            .order_time
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .or_else(|| previous.map(|p| p.datetime))
            .unwrap_or_else(Utc::now);

        let record = OrderRecord {
            order_id: local.clone(),
            broker_order_id: Some(broker),
            symbol,
            exchange,
            direction: translator::direction_for(snapshot.action),
            order_type: translator::order_type_for(snapshot.order_type),
            price,
            volume: Decimal::from(snapshot.quantity.unsigned_abs()),
            traded: Decimal::from(snapshot.filled.max(0)),
            status: translator::status_from_str(&snapshot.status),
            datetime,
        };
        contracts.ensure(&record.key(), Product::Equity, &self.emitter);

        if let Some(trade) = self.derive_trade(&record, snapshot.avg_fill_price, datetime) {
            observability::record_trade(self.emitter.gateway_name());
            self.emitter.emit(GatewayEvent::Trade(trade));
        }

        self.orders.insert(local, record.clone());
        self.emitter.emit(GatewayEvent::Order(record.clone()));
        record
    }

    /// Fill implied by a traded-volume increase, if any.
    fn derive_trade(
        &mut self,
        record: &OrderRecord,
        avg_price: Option<Decimal>,
        datetime: DateTime<Utc>,
    ) -> Option<TradeRecord> {
        let state = self.fills.entry(record.order_id.clone()).or_default();
        let delta = record.traded - state.traded;
        if delta <= Decimal::ZERO {
            return None;
        }

        let price = fill_price(state, record.traded, delta, avg_price).unwrap_or(record.price);

        state.traded = record.traded;
        state.avg_price = avg_price.or(state.avg_price);
        state.fills += 1;

        Some(TradeRecord {
            trade_id: TradeId::new(format!("{}-{}", record.order_id, state.fills)),
            order_id: record.order_id.clone(),
            symbol: record.symbol.clone(),
            exchange: record.exchange,
            direction: record.direction,
            price,
            volume: delta,
            datetime,
        })
    }

    /// Stored snapshot of an order.
    #[must_use]
    pub fn order(&self, id: &LocalOrderId) -> Option<&OrderRecord> {
        self.orders.get(id)
    }

    /// Number of known orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Returns true if no order is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Identifier registry of the session.
    #[must_use]
    pub const fn registry(&self) -> &IdentifierRegistry {
        &self.registry
    }
}

/// Price of the increment between two average-price observations.
fn fill_price(
    previous: &FillState,
    traded: Decimal,
    delta: Decimal,
    avg_price: Option<Decimal>,
) -> Option<Decimal> {
    let avg_new = avg_price?;
    let price = match previous.avg_price {
        Some(avg_old) if previous.traded > Decimal::ZERO => {
            (avg_new * traded - avg_old * previous.traded) / delta
        }
        _ => avg_new,
    };
    if price > Decimal::ZERO {
        Some(price.round_dp(4))
    } else {
        Some(avg_new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::{
        ActionType, BrokerError, Market, MockTradeClient, TigerOrderType,
    };
    use crate::domain::shared::Exchange;
    use crate::domain::trading::Direction;
    use crate::events::RecordingEventPublisher;
    use mockall::predicate::eq;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn setup() -> (OrderManager, ContractCache, Arc<RecordingEventPublisher>) {
        let recorder = Arc::new(RecordingEventPublisher::new());
        let emitter = Emitter::new("TIGER", recorder.clone());
        (
            OrderManager::new(emitter, "DU575569"),
            ContractCache::new(),
            recorder,
        )
    }

    fn snapshot(id: i64, filled: i64, avg: Option<Decimal>, status: &str) -> TigerOrderSnapshot {
        TigerOrderSnapshot {
            id,
            account: "DU575569".to_string(),
            symbol: "AAPL".to_string(),
            market: Market::Us,
            action: ActionType::Buy,
            order_type: TigerOrderType::Lmt,
            quantity: 100,
            filled,
            limit_price: Some(dec!(150)),
            aux_price: None,
            avg_fill_price: avg,
            status: status.to_string(),
            order_time: Some(1_700_000_000_000),
            reason: None,
        }
    }

    #[test]
    fn accepted_limit_order_binds_and_emits_submitting() {
        let (mut manager, mut contracts, recorder) = setup();
        let mut trade = MockTradeClient::new();
        trade
            .expect_place_order()
            .withf(|order| {
                order.symbol == "AAPL"
                    && order.market == Market::Us
                    && order.action == ActionType::Buy
                    && order.order_type == TigerOrderType::Lmt
                    && order.quantity == 100
                    && order.limit_price == Some(dec!(150.25))
                    && order.aux_price.is_none()
                    && order.time_in_force == TimeInForce::Day
                    && order.account == "DU575569"
            })
            .times(1)
            .returning(|_| Ok(Placement::Accepted { id: 5_000_001 }));

        let request = OrderRequest::limit(
            "AAPL",
            Exchange::Nasdaq,
            Direction::Long,
            dec!(100),
            dec!(150.25),
        );
        let id = manager.send_order(&request, Some(&trade), &mut contracts);

        assert_eq!(id.as_str(), "100001");
        assert_eq!(
            manager.registry().lookup_broker(&id),
            Some(&BrokerOrderId::new("5000001"))
        );
        let orders = recorder.orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, OrderStatus::Submitting);
        assert_eq!(recorder.count("contract"), 1);
    }

    #[test]
    fn stop_order_uses_aux_price() {
        let (mut manager, mut contracts, _) = setup();
        let mut trade = MockTradeClient::new();
        trade
            .expect_place_order()
            .withf(|order| {
                order.order_type == TigerOrderType::Stp
                    && order.aux_price == Some(dec!(320))
                    && order.limit_price.is_none()
                    && order.action == ActionType::Sell
                    && order.market == Market::Hk
            })
            .returning(|_| Ok(Placement::Accepted { id: 42 }));

        let request =
            OrderRequest::stop("00700", Exchange::Sehk, Direction::Short, dec!(100), dec!(320));
        let id = manager.send_order(&request, Some(&trade), &mut contracts);

        assert!(!id.is_empty());
    }

    #[test]
    fn broker_rejection_emits_rejected_and_returns_empty() {
        let (mut manager, mut contracts, recorder) = setup();
        let mut trade = MockTradeClient::new();
        trade.expect_place_order().returning(|_| {
            Ok(Placement::Rejected {
                reason: "insufficient buying power".to_string(),
            })
        });

        let request = OrderRequest::market("AAPL", Exchange::Nasdaq, Direction::Long, dec!(10));
        let id = manager.send_order(&request, Some(&trade), &mut contracts);

        assert!(id.is_empty());
        let orders = recorder.orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, OrderStatus::Rejected);
        assert!(manager.registry().is_empty());
        assert!(recorder.logs()[0].contains("insufficient buying power"));
    }

    #[test]
    fn broker_error_is_contained() {
        let (mut manager, mut contracts, recorder) = setup();
        let mut trade = MockTradeClient::new();
        trade
            .expect_place_order()
            .returning(|_| Err(BrokerError::connection("socket closed")));

        let request = OrderRequest::market("AAPL", Exchange::Nasdaq, Direction::Long, dec!(10));
        let id = manager.send_order(&request, Some(&trade), &mut contracts);

        assert!(id.is_empty());
        assert_eq!(recorder.orders()[0].status, OrderStatus::Rejected);
    }

    #[test]
    fn missing_trade_connection_rejects_without_call() {
        let (mut manager, mut contracts, recorder) = setup();

        let request = OrderRequest::market("AAPL", Exchange::Nasdaq, Direction::Long, dec!(10));
        let id = manager.send_order(&request, None, &mut contracts);

        assert!(id.is_empty());
        assert_eq!(recorder.orders()[0].status, OrderStatus::Rejected);
    }

    #[test]
    fn fractional_volume_below_one_share_rejects() {
        let (mut manager, mut contracts, recorder) = setup();
        let trade = MockTradeClient::new();

        let request = OrderRequest::market("AAPL", Exchange::Nasdaq, Direction::Long, dec!(0.5));
        let id = manager.send_order(&request, Some(&trade), &mut contracts);

        assert!(id.is_empty());
        assert_eq!(recorder.orders()[0].status, OrderStatus::Rejected);
    }

    #[test]
    fn cancel_unbound_order_logs_without_broker_call() {
        let (mut manager, _, recorder) = setup();
        let trade = MockTradeClient::new();

        manager.cancel_order(&CancelRequest::new("999999"), Some(&trade));

        assert_eq!(recorder.count("order"), 0);
        assert_eq!(recorder.count("log"), 1);
    }

    #[test]
    fn cancel_bound_order_calls_broker_with_numeric_id() {
        let (mut manager, mut contracts, recorder) = setup();
        let mut trade = MockTradeClient::new();
        trade
            .expect_place_order()
            .returning(|_| Ok(Placement::Accepted { id: 5_000_001 }));
        trade
            .expect_cancel_order()
            .with(eq(5_000_001))
            .times(1)
            .returning(|_| Ok(()));

        let request = OrderRequest::market("AAPL", Exchange::Nasdaq, Direction::Long, dec!(1));
        let id = manager.send_order(&request, Some(&trade), &mut contracts);
        manager.cancel_order(&CancelRequest::new(id), Some(&trade));

        assert_eq!(recorder.count("order"), 1);
        assert!(recorder.logs().iter().any(|m| m.starts_with("Cancel requested")));
    }

    #[test]
    fn reconcile_maps_status_and_keeps_local_id() {
        let (mut manager, mut contracts, recorder) = setup();
        let mut trade = MockTradeClient::new();
        trade
            .expect_place_order()
            .returning(|_| Ok(Placement::Accepted { id: 5_000_001 }));
        let request = OrderRequest::limit(
            "AAPL",
            Exchange::Nasdaq,
            Direction::Long,
            dec!(100),
            dec!(150),
        );
        let id = manager.send_order(&request, Some(&trade), &mut contracts);

        let record = manager.reconcile(&snapshot(5_000_001, 0, None, "Initial"), &mut contracts);

        assert_eq!(record.order_id, id);
        assert_eq!(record.status, OrderStatus::NotTraded);
        assert_eq!(recorder.count("order"), 2);
    }

    #[test]
    fn reconcile_is_level_triggered() {
        let (mut manager, mut contracts, recorder) = setup();
        let observed = snapshot(7, 0, None, "Initial");

        manager.reconcile(&observed, &mut contracts);
        manager.reconcile(&observed, &mut contracts);

        assert_eq!(recorder.count("order"), 2);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn fills_are_derived_once_per_increase() {
        let (mut manager, mut contracts, recorder) = setup();

        manager.reconcile(&snapshot(7, 40, Some(dec!(150)), "PartiallyFilled"), &mut contracts);
        manager.reconcile(&snapshot(7, 40, Some(dec!(150)), "PartiallyFilled"), &mut contracts);
        manager.reconcile(&snapshot(7, 100, Some(dec!(151.2)), "Filled"), &mut contracts);

        let trades = recorder.trades();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].volume, dec!(40));
        assert_eq!(trades[0].price, dec!(150));
        assert_eq!(trades[1].volume, dec!(60));
        // (151.2 * 100 - 150 * 40) / 60
        assert_eq!(trades[1].price, dec!(152));
        assert_ne!(trades[0].trade_id, trades[1].trade_id);
    }

    #[test]
    fn foreign_orders_are_adopted() {
        let (mut manager, mut contracts, _) = setup();

        let first = manager.reconcile(&snapshot(9001, 0, None, "Initial"), &mut contracts);
        let again = manager.reconcile(&snapshot(9001, 0, None, "Cancelled"), &mut contracts);

        assert_eq!(first.order_id, again.order_id);
        assert_eq!(again.status, OrderStatus::Cancelled);
        assert_eq!(
            manager.registry().lookup_local(&BrokerOrderId::from(9001)),
            Some(&first.order_id)
        );
    }

    #[test]
    fn query_orders_requires_trade_connection() {
        let (mut manager, mut contracts, _) = setup();
        let Err(err) = manager.query_orders(None, &mut contracts) else {
            panic!("expected NotConnected");
        };
        assert!(matches!(
            err,
            TaskError::NotConnected {
                kind: ConnectionKind::Trade
            }
        ));
    }

    #[test]
    fn query_orders_reconciles_each_snapshot() {
        let (mut manager, mut contracts, recorder) = setup();
        let mut trade = MockTradeClient::new();
        trade.expect_get_orders().times(1).returning(|| {
            Ok(vec![
                snapshot(1, 0, None, "Initial"),
                snapshot(2, 100, Some(dec!(150)), "Filled"),
            ])
        });

        manager.query_orders(Some(&trade), &mut contracts).unwrap();

        assert_eq!(recorder.count("order"), 2);
        assert_eq!(recorder.count("trade"), 1);
    }
}
