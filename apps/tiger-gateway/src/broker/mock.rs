//! Scripted in-process Tiger SDK.
//!
//! Returns canned responses without any network access. Tests script
//! placements, snapshots and failures up front, then inspect the recorded
//! calls. The captured push listener lets a test fire callbacks from its own
//! thread the way the real SDK does.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use super::api_types::{
    BarQuery, Market, Placement, TigerAsset, TigerBar, TigerOrder, TigerOrderSnapshot,
    TigerPosition, TigerQuote,
};
use super::client::{ClientConfig, PushClient, PushListener, QuoteClient, TigerSdk, TradeClient};
use super::error::BrokerError;

/// First broker id handed out for accepted orders.
const FIRST_BROKER_ID: i64 = 5_000_001;

/// A call observed by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// `TradeClient::place_order`.
    PlaceOrder(TigerOrder),
    /// `TradeClient::cancel_order`.
    CancelOrder(i64),
    /// `TradeClient::get_orders`.
    GetOrders,
    /// `TradeClient::get_assets`.
    GetAssets,
    /// `TradeClient::get_positions`.
    GetPositions,
    /// `QuoteClient::get_market_data`.
    GetMarketData(Vec<String>, Market),
    /// `QuoteClient::get_bars`.
    GetBars(BarQuery),
    /// `PushClient::connect`.
    PushConnect,
    /// `PushClient::disconnect`.
    PushDisconnect,
    /// `PushClient::subscribe_quote`.
    SubscribeQuote(Vec<String>),
    /// `PushClient::unsubscribe_quote`.
    UnsubscribeQuote(Vec<String>),
    /// `PushClient::subscribe_account_channels`.
    SubscribeAccount(String),
}

#[derive(Default)]
struct MockState {
    calls: Mutex<Vec<MockCall>>,
    placements: Mutex<VecDeque<Result<Placement, BrokerError>>>,
    accepted: Mutex<i64>,
    orders: Mutex<Vec<TigerOrderSnapshot>>,
    assets: Mutex<Vec<TigerAsset>>,
    positions: Mutex<Vec<TigerPosition>>,
    quotes: Mutex<HashMap<String, TigerQuote>>,
    bars: Mutex<Vec<TigerBar>>,
    trade_connect_error: Mutex<Option<BrokerError>>,
    quote_connect_error: Mutex<Option<BrokerError>>,
    push_connect_error: Mutex<Option<BrokerError>>,
    query_error: Mutex<Option<BrokerError>>,
    market_errors: Mutex<HashMap<Market, BrokerError>>,
    subscribe_error: Mutex<Option<BrokerError>>,
    call_delay: Mutex<Option<Duration>>,
    listener: Mutex<Option<Arc<dyn PushListener>>>,
}

impl MockState {
    fn record(&self, call: MockCall) {
        self.calls.lock().push(call);
    }

    fn pause(&self) {
        let delay = *self.call_delay.lock();
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
    }

    fn query_result(&self) -> Result<(), BrokerError> {
        self.query_error.lock().clone().map_or(Ok(()), Err)
    }
}

/// Scripted Tiger SDK.
///
/// Clones share state, so a test can keep one handle while the gateway owns
/// another.
#[derive(Clone, Default)]
pub struct MockTigerSdk {
    state: Arc<MockState>,
}

impl MockTigerSdk {
    /// Create a mock whose connections all succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome of the next `place_order`. Unscripted calls accept
    /// with sequential broker ids.
    pub fn script_placement(&self, outcome: Result<Placement, BrokerError>) {
        self.state.placements.lock().push_back(outcome);
    }

    /// Orders returned by `get_orders`.
    pub fn set_orders(&self, orders: Vec<TigerOrderSnapshot>) {
        *self.state.orders.lock() = orders;
    }

    /// Summaries returned by `get_assets`.
    pub fn set_assets(&self, assets: Vec<TigerAsset>) {
        *self.state.assets.lock() = assets;
    }

    /// Holdings returned by `get_positions`.
    pub fn set_positions(&self, positions: Vec<TigerPosition>) {
        *self.state.positions.lock() = positions;
    }

    /// Quote returned by `get_market_data` for its symbol.
    pub fn set_quote(&self, quote: TigerQuote) {
        self.state.quotes.lock().insert(quote.symbol.clone(), quote);
    }

    /// Bars returned by `get_bars`.
    pub fn set_bars(&self, bars: Vec<TigerBar>) {
        *self.state.bars.lock() = bars;
    }

    /// Make building the trade client fail.
    pub fn fail_trade_connect(&self, error: Option<BrokerError>) {
        *self.state.trade_connect_error.lock() = error;
    }

    /// Make building the quote client fail.
    pub fn fail_quote_connect(&self, error: Option<BrokerError>) {
        *self.state.quote_connect_error.lock() = error;
    }

    /// Make building or connecting the push client fail.
    pub fn fail_push_connect(&self, error: Option<BrokerError>) {
        *self.state.push_connect_error.lock() = error;
    }

    /// Report push as unsupported by this SDK build.
    pub fn disable_push(&self) {
        self.fail_push_connect(Some(BrokerError::unsupported("push client")));
    }

    /// Make every query call fail.
    pub fn fail_queries(&self, error: Option<BrokerError>) {
        *self.state.query_error.lock() = error;
    }

    /// Make `get_market_data` fail for one market only.
    pub fn fail_market(&self, market: Market, error: BrokerError) {
        self.state.market_errors.lock().insert(market, error);
    }

    /// Make `subscribe_quote` fail.
    pub fn fail_subscribe(&self, error: Option<BrokerError>) {
        *self.state.subscribe_error.lock() = error;
    }

    /// Block every trade and quote call for `delay`.
    pub fn set_call_delay(&self, delay: Option<Duration>) {
        *self.state.call_delay.lock() = delay;
    }

    /// Calls observed so far.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.calls.lock().clone()
    }

    /// Number of recorded calls matching `predicate`.
    pub fn count_calls(&self, predicate: impl Fn(&MockCall) -> bool) -> usize {
        self.state.calls.lock().iter().filter(|c| predicate(c)).count()
    }

    /// Listener registered by the last successful push connect.
    #[must_use]
    pub fn push_listener(&self) -> Option<Arc<dyn PushListener>> {
        self.state.listener.lock().clone()
    }
}

impl TigerSdk for MockTigerSdk {
    fn trade_client(&self, _config: &ClientConfig) -> Result<Box<dyn TradeClient>, BrokerError> {
        if let Some(err) = self.state.trade_connect_error.lock().clone() {
            return Err(err);
        }
        Ok(Box::new(ScriptedTradeClient {
            state: Arc::clone(&self.state),
        }))
    }

    fn quote_client(&self, _config: &ClientConfig) -> Result<Box<dyn QuoteClient>, BrokerError> {
        if let Some(err) = self.state.quote_connect_error.lock().clone() {
            return Err(err);
        }
        Ok(Box::new(ScriptedQuoteClient {
            state: Arc::clone(&self.state),
        }))
    }

    fn push_client(&self, _config: &ClientConfig) -> Result<Box<dyn PushClient>, BrokerError> {
        let error = self.state.push_connect_error.lock().clone();
        if let Some(err) = error.filter(BrokerError::is_unsupported) {
            return Err(err);
        }
        Ok(Box::new(ScriptedPushClient {
            state: Arc::clone(&self.state),
        }))
    }
}

struct ScriptedTradeClient {
    state: Arc<MockState>,
}

impl TradeClient for ScriptedTradeClient {
    fn place_order(&self, order: &TigerOrder) -> Result<Placement, BrokerError> {
        self.state.record(MockCall::PlaceOrder(order.clone()));
        self.state.pause();
        if let Some(scripted) = self.state.placements.lock().pop_front() {
            return scripted;
        }
        let mut accepted = self.state.accepted.lock();
        let id = FIRST_BROKER_ID + *accepted;
        *accepted += 1;
        Ok(Placement::Accepted { id })
    }

    fn cancel_order(&self, id: i64) -> Result<(), BrokerError> {
        self.state.record(MockCall::CancelOrder(id));
        self.state.pause();
        Ok(())
    }

    fn get_orders(&self) -> Result<Vec<TigerOrderSnapshot>, BrokerError> {
        self.state.record(MockCall::GetOrders);
        self.state.pause();
        self.state.query_result()?;
        Ok(self.state.orders.lock().clone())
    }

    fn get_assets(&self) -> Result<Vec<TigerAsset>, BrokerError> {
        self.state.record(MockCall::GetAssets);
        self.state.pause();
        self.state.query_result()?;
        Ok(self.state.assets.lock().clone())
    }

    fn get_positions(&self) -> Result<Vec<TigerPosition>, BrokerError> {
        self.state.record(MockCall::GetPositions);
        self.state.pause();
        self.state.query_result()?;
        Ok(self.state.positions.lock().clone())
    }
}

struct ScriptedQuoteClient {
    state: Arc<MockState>,
}

impl QuoteClient for ScriptedQuoteClient {
    fn get_market_data(
        &self,
        symbols: &[String],
        market: Market,
    ) -> Result<Vec<TigerQuote>, BrokerError> {
        self.state
            .record(MockCall::GetMarketData(symbols.to_vec(), market));
        self.state.pause();
        self.state.query_result()?;
        if let Some(err) = self.state.market_errors.lock().get(&market).cloned() {
            return Err(err);
        }
        let quotes = self.state.quotes.lock();
        Ok(symbols
            .iter()
            .filter_map(|symbol| quotes.get(symbol).cloned())
            .collect())
    }

    fn get_bars(&self, query: &BarQuery) -> Result<Vec<TigerBar>, BrokerError> {
        self.state.record(MockCall::GetBars(query.clone()));
        self.state.pause();
        self.state.query_result()?;
        Ok(self.state.bars.lock().clone())
    }
}

struct ScriptedPushClient {
    state: Arc<MockState>,
}

impl PushClient for ScriptedPushClient {
    fn connect(&self, listener: Arc<dyn PushListener>) -> Result<(), BrokerError> {
        self.state.record(MockCall::PushConnect);
        if let Some(err) = self.state.push_connect_error.lock().clone() {
            return Err(err);
        }
        *self.state.listener.lock() = Some(listener);
        Ok(())
    }

    fn disconnect(&self) {
        self.state.record(MockCall::PushDisconnect);
        self.state.listener.lock().take();
    }

    fn subscribe_quote(&self, symbols: &[String]) -> Result<(), BrokerError> {
        self.state.record(MockCall::SubscribeQuote(symbols.to_vec()));
        self.state.subscribe_error.lock().clone().map_or(Ok(()), Err)
    }

    fn unsubscribe_quote(&self, symbols: &[String]) -> Result<(), BrokerError> {
        self.state.record(MockCall::UnsubscribeQuote(symbols.to_vec()));
        Ok(())
    }

    fn subscribe_account_channels(&self, account: &str) -> Result<(), BrokerError> {
        self.state
            .record(MockCall::SubscribeAccount(account.to_string()));
        Ok(())
    }
}
