//! Subscriptions, quotes, accounts, positions and history.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use super::contracts::ContractCache;
use super::emitter::Emitter;
use super::task::ConnectionKind;
use super::translator;
use crate::broker::{
    BarQuery, Market, PushClient, QuoteClient, TigerAsset, TigerBar, TigerPosition, TigerQuote,
    TradeClient,
};
use crate::domain::shared::{AccountId, InstrumentKey, Symbol};
use crate::domain::trading::{
    AccountRecord, BarRecord, Direction, GatewayEvent, HistoryRequest, PositionKey,
    PositionRecord, Product, SubscribeRequest, TickSnapshot,
};
use crate::error::TaskError;
use crate::observability;

/// Timestamp format of Tiger bars.
pub const BAR_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date format of bar query bounds.
const BAR_QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Market state of the session.
#[derive(Debug)]
pub struct MarketDataReconciler {
    emitter: Emitter,
    account: AccountId,
    subscriptions: BTreeSet<InstrumentKey>,
    unstreamed: BTreeSet<InstrumentKey>,
    ticks: HashMap<InstrumentKey, TickSnapshot>,
    positions: HashMap<PositionKey, PositionRecord>,
    accounts: HashMap<AccountId, AccountRecord>,
}

impl MarketDataReconciler {
    /// Create an empty reconciler. `account` labels assets that arrive
    /// without one.
    #[must_use]
    pub fn new(emitter: Emitter, account: impl Into<AccountId>) -> Self {
        Self {
            emitter,
            account: account.into(),
            subscriptions: BTreeSet::new(),
            unstreamed: BTreeSet::new(),
            ticks: HashMap::new(),
            positions: HashMap::new(),
            accounts: HashMap::new(),
        }
    }

    // ------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------

    /// Add an instrument to the subscription set.
    ///
    /// Streams immediately when push is up; otherwise the heartbeat polls it
    /// until push connects and replays the set. A failed stream request
    /// leaves the instrument unstreamed: it is polled and retried on every
    /// heartbeat.
    pub fn subscribe(
        &mut self,
        request: &SubscribeRequest,
        push: Option<&dyn PushClient>,
        contracts: &mut ContractCache,
    ) {
        let key = request.key();
        if translator::market_for(key.exchange).is_none() {
            self.emitter
                .log_failure(format!("Subscribe ignored: unsupported exchange {}", key.exchange));
            return;
        }
        contracts.ensure(&key, Product::Equity, &self.emitter);

        if !self.subscriptions.insert(key.clone()) {
            tracing::debug!(instrument = %key, "Already subscribed");
            return;
        }

        match push {
            Some(push) => match push.subscribe_quote(&[key.symbol.to_string()]) {
                Ok(()) => self.emitter.log(format!("Subscribed {key}")),
                Err(e) => {
                    self.unstreamed.insert(key.clone());
                    self.emitter.log_failure(format!(
                        "Subscribe {key} failed: {e}; polling until it streams"
                    ));
                }
            },
            None => self
                .emitter
                .log(format!("Subscribed {key}, polling until push connects")),
        }
    }

    /// Replay the whole subscription set on a (re)connected push client.
    ///
    /// On failure every subscription counts as unstreamed until a later
    /// replay or retry succeeds.
    pub fn resubscribe_all(&mut self, push: &dyn PushClient) -> Result<(), TaskError> {
        let symbols = self.subscribed_symbols();
        if symbols.is_empty() {
            return Ok(());
        }
        if let Err(e) = push.subscribe_quote(&symbols) {
            self.unstreamed.clone_from(&self.subscriptions);
            return Err(TaskError::broker("resubscribe", e));
        }
        self.unstreamed.clear();
        self.emitter
            .log(format!("Resubscribed {} instruments", symbols.len()));
        Ok(())
    }

    /// Retry streaming the instruments whose subscribe failed.
    pub fn retry_unstreamed(&mut self, push: &dyn PushClient) -> Result<(), TaskError> {
        if self.unstreamed.is_empty() {
            return Ok(());
        }
        let unique: BTreeSet<&Symbol> = self.unstreamed.iter().map(|k| &k.symbol).collect();
        let symbols: Vec<String> = unique.into_iter().map(ToString::to_string).collect();
        push.subscribe_quote(&symbols)
            .map_err(|e| TaskError::broker("subscribe retry", e))?;
        self.unstreamed.clear();
        self.emitter
            .log(format!("Streaming {} instruments after retry", symbols.len()));
        Ok(())
    }

    /// Returns true while some subscription is not streamed over push.
    #[must_use]
    pub fn has_unstreamed(&self) -> bool {
        !self.unstreamed.is_empty()
    }

    /// Drop every streamed subscription before the push client goes away.
    pub fn unsubscribe_all(&self, push: &dyn PushClient) {
        let symbols = self.subscribed_symbols();
        if symbols.is_empty() {
            return;
        }
        if let Err(e) = push.unsubscribe_quote(&symbols) {
            tracing::warn!(error = %e, "Unsubscribe on close failed");
        }
    }

    fn subscribed_symbols(&self) -> Vec<String> {
        let unique: BTreeSet<&Symbol> = self.subscriptions.iter().map(|k| &k.symbol).collect();
        unique.into_iter().map(ToString::to_string).collect()
    }

    /// Subscribed instruments.
    pub fn subscriptions(&self) -> impl Iterator<Item = &InstrumentKey> {
        self.subscriptions.iter()
    }

    // ------------------------------------------------------------------
    // Quotes
    // ------------------------------------------------------------------

    /// Poll quotes for every subscription, one request per market.
    ///
    /// Each result overwrites the cached tick and is emitted. A failing
    /// market does not stop the others; the first failure is returned.
    pub fn poll_quotes(&mut self, quote: Option<&dyn QuoteClient>) -> Result<(), TaskError> {
        let keys: Vec<InstrumentKey> = self.subscriptions.iter().cloned().collect();
        self.poll_keys(&keys, quote)
    }

    /// Poll quotes only for subscriptions push is not streaming.
    pub fn poll_unstreamed(&mut self, quote: Option<&dyn QuoteClient>) -> Result<(), TaskError> {
        let keys: Vec<InstrumentKey> = self.unstreamed.iter().cloned().collect();
        self.poll_keys(&keys, quote)
    }

    fn poll_keys(
        &mut self,
        keys: &[InstrumentKey],
        quote: Option<&dyn QuoteClient>,
    ) -> Result<(), TaskError> {
        if keys.is_empty() {
            return Ok(());
        }
        let quote = quote.ok_or(TaskError::NotConnected {
            kind: ConnectionKind::Quote,
        })?;

        let mut by_market: BTreeMap<Market, Vec<&InstrumentKey>> = BTreeMap::new();
        for key in keys {
            if let Some(market) = translator::market_for(key.exchange) {
                by_market.entry(market).or_default().push(key);
            }
        }

        let mut first_error = None;
        for (market, keys) in by_market {
            let symbols: Vec<String> = keys.iter().map(|k| k.symbol.to_string()).collect();
            let quotes = match quote.get_market_data(&symbols, market) {
                Ok(quotes) => quotes,
                Err(e) => {
                    tracing::warn!(market = %market, error = %e, "Quote poll failed");
                    if first_error.is_none() {
                        first_error = Some(TaskError::broker("poll_quotes", e));
                    }
                    continue;
                }
            };

            for tiger_quote in &quotes {
                let symbol = Symbol::new(&tiger_quote.symbol);
                for key in keys.iter().filter(|k| k.symbol == symbol) {
                    let tick = merge_quote(key, tiger_quote, self.ticks.get(*key));
                    observability::record_quote(self.emitter.gateway_name(), "poll", true);
                    self.ticks.insert((*key).clone(), tick.clone());
                    self.emitter.emit(GatewayEvent::Tick(tick));
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Merge a pushed quote. Quotes for unsubscribed symbols are ignored and
    /// quotes identical to the cached tick are dropped.
    pub fn on_quote(&mut self, pushed: &TigerQuote) {
        let symbol = Symbol::new(&pushed.symbol);
        let Some(key) = self
            .subscriptions
            .iter()
            .find(|k| k.symbol == symbol)
            .cloned()
        else {
            tracing::trace!(symbol = %symbol, "Quote for unsubscribed symbol");
            return;
        };

        let previous = self.ticks.get(&key);
        let tick = merge_quote(&key, pushed, previous);
        let redundant = previous.is_some_and(|p| p.same_quote(&tick));
        observability::record_quote(self.emitter.gateway_name(), "push", !redundant);
        if redundant {
            return;
        }

        self.ticks.insert(key, tick.clone());
        self.emitter.emit(GatewayEvent::Tick(tick));
    }

    /// Cached tick of an instrument.
    #[must_use]
    pub fn tick(&self, key: &InstrumentKey) -> Option<&TickSnapshot> {
        self.ticks.get(key)
    }

    // ------------------------------------------------------------------
    // Accounts and positions
    // ------------------------------------------------------------------

    /// Poll account summaries.
    pub fn query_account(&mut self, trade: Option<&dyn TradeClient>) -> Result<(), TaskError> {
        let trade = trade.ok_or(TaskError::NotConnected {
            kind: ConnectionKind::Trade,
        })?;
        let assets = trade
            .get_assets()
            .map_err(|e| TaskError::broker("query_account", e))?;
        for asset in &assets {
            self.apply_asset(asset);
        }
        Ok(())
    }

    /// Overwrite and emit one account summary.
    pub fn apply_asset(&mut self, asset: &TigerAsset) -> AccountRecord {
        let account_id = if asset.account.is_empty() {
            self.account.clone()
        } else {
            AccountId::new(&asset.account)
        };
        let record = AccountRecord {
            account_id: account_id.clone(),
            balance: asset.net_liquidation.unwrap_or_default(),
            frozen: asset.init_margin_req.unwrap_or_default(),
            datetime: Utc::now(),
        };
        self.accounts.insert(account_id, record.clone());
        self.emitter.emit(GatewayEvent::Account(record.clone()));
        record
    }

    /// Poll holdings. The reported set replaces the cached one; holdings the
    /// broker no longer reports are emitted once with zero volume.
    pub fn query_positions(
        &mut self,
        trade: Option<&dyn TradeClient>,
        contracts: &mut ContractCache,
    ) -> Result<(), TaskError> {
        let trade = trade.ok_or(TaskError::NotConnected {
            kind: ConnectionKind::Trade,
        })?;
        let positions = trade
            .get_positions()
            .map_err(|e| TaskError::broker("query_positions", e))?;

        let mut reported = HashSet::new();
        for position in &positions {
            let record = self.apply_position(position, contracts);
            if position.quantity != 0 {
                reported.insert(record.key());
            }
        }
        let gone: Vec<PositionKey> = self
            .positions
            .keys()
            .filter(|key| !reported.contains(*key))
            .cloned()
            .collect();
        for key in &gone {
            self.close_position(key);
        }
        Ok(())
    }

    /// Overwrite and emit one holding.
    ///
    /// A flat or sign-flipped quantity closes the cached holding of the other
    /// direction: it is dropped from the cache and emitted with zero volume.
    pub fn apply_position(
        &mut self,
        position: &TigerPosition,
        contracts: &mut ContractCache,
    ) -> PositionRecord {
        let exchange = translator::exchange_for(position.market);
        let key = InstrumentKey::new(position.symbol.as_str(), exchange);
        contracts.ensure(
            &key,
            translator::product_for(&position.sec_type),
            &self.emitter,
        );

        let account_id = if position.account.is_empty() {
            self.account.clone()
        } else {
            AccountId::new(&position.account)
        };
        let record = PositionRecord {
            account_id,
            symbol: key.symbol,
            exchange,
            direction: Direction::from_signed_quantity(position.quantity),
            volume: Decimal::from(position.quantity.unsigned_abs()),
            frozen: Decimal::ZERO,
            price: position.average_cost.unwrap_or_default(),
            pnl: position.unrealized_pnl.unwrap_or_default(),
            datetime: Utc::now(),
        };

        let flat = position.quantity == 0;
        let stale: Vec<PositionKey> = [Direction::Long, Direction::Short]
            .into_iter()
            .filter(|direction| flat || *direction != record.direction)
            .map(|direction| (record.symbol.clone(), exchange, direction))
            .collect();
        let closed: Vec<PositionRecord> = stale
            .iter()
            .filter_map(|key| self.close_position(key))
            .collect();

        if flat {
            if let Some(first) = closed.into_iter().next() {
                return first;
            }
            self.emitter.emit(GatewayEvent::Position(record.clone()));
            return record;
        }

        self.positions.insert(record.key(), record.clone());
        self.emitter.emit(GatewayEvent::Position(record.clone()));
        record
    }

    /// Drop a cached holding and emit it with zero volume.
    fn close_position(&mut self, key: &PositionKey) -> Option<PositionRecord> {
        let mut record = self.positions.remove(key)?;
        record.volume = Decimal::ZERO;
        record.frozen = Decimal::ZERO;
        record.pnl = Decimal::ZERO;
        record.datetime = Utc::now();
        tracing::debug!(symbol = %record.symbol, direction = %record.direction, "Position closed");
        self.emitter.emit(GatewayEvent::Position(record.clone()));
        Some(record)
    }

    /// Cached holding.
    #[must_use]
    pub fn position(&self, key: &PositionKey) -> Option<&PositionRecord> {
        self.positions.get(key)
    }

    /// Cached account summary.
    #[must_use]
    pub fn account(&self, id: &AccountId) -> Option<&AccountRecord> {
        self.accounts.get(id)
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Fetch historical bars. Bars with unparseable timestamps are skipped.
    pub fn query_history(
        &self,
        request: &HistoryRequest,
        quote: Option<&dyn QuoteClient>,
    ) -> Result<Vec<BarRecord>, TaskError> {
        let quote = quote.ok_or(TaskError::NotConnected {
            kind: ConnectionKind::Quote,
        })?;
        let Some(market) = translator::market_for(request.exchange) else {
            self.emitter.log_failure(format!(
                "History ignored: unsupported exchange {}",
                request.exchange
            ));
            return Ok(Vec::new());
        };

        let query = BarQuery {
            symbols: vec![request.symbol.to_string()],
            market,
            period: translator::bar_period(request.interval).to_string(),
            begin_time: request.start.format(BAR_QUERY_DATE_FORMAT).to_string(),
            end_time: request.end.format(BAR_QUERY_DATE_FORMAT).to_string(),
        };
        let bars = quote
            .get_bars(&query)
            .map_err(|e| TaskError::broker("query_history", e))?;

        let total = bars.len();
        let history: Vec<BarRecord> = bars
            .iter()
            .filter_map(|bar| bar_record(request, bar))
            .collect();
        if history.len() < total {
            tracing::warn!(
                instrument = %request.key(),
                skipped = total - history.len(),
                "Skipped malformed bars"
            );
        }

        self.emitter.log(format!(
            "History for {}: {} bars",
            request.key(),
            history.len()
        ));
        Ok(history)
    }
}

/// Tick for `key` from a Tiger quote. Fields the quote leaves unset keep
/// their previous value, or zero.
fn merge_quote(
    key: &InstrumentKey,
    quote: &TigerQuote,
    previous: Option<&TickSnapshot>,
) -> TickSnapshot {
    let keep = |value: Option<Decimal>, old: fn(&TickSnapshot) -> Decimal| {
        value
            .or_else(|| previous.map(old))
            .unwrap_or_default()
    };
    TickSnapshot {
        symbol: key.symbol.clone(),
        exchange: key.exchange,
        datetime: quote
            .timestamp
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .unwrap_or_else(Utc::now),
        last_price: keep(quote.latest_price, |t| t.last_price),
        open_price: keep(quote.open, |t| t.open_price),
        high_price: keep(quote.high, |t| t.high_price),
        low_price: keep(quote.low, |t| t.low_price),
        pre_close: keep(quote.prev_close, |t| t.pre_close),
        volume: keep(quote.volume, |t| t.volume),
        turnover: keep(quote.amount, |t| t.turnover),
        bid_price: keep(quote.bid_price, |t| t.bid_price),
        ask_price: keep(quote.ask_price, |t| t.ask_price),
        bid_volume: keep(quote.bid_size, |t| t.bid_volume),
        ask_volume: keep(quote.ask_size, |t| t.ask_volume),
    }
}

fn bar_record(request: &HistoryRequest, bar: &TigerBar) -> Option<BarRecord> {
    let datetime: DateTime<Utc> = NaiveDateTime::parse_from_str(&bar.time, BAR_TIME_FORMAT)
        .ok()?
        .and_utc();
    Some(BarRecord {
        symbol: request.symbol.clone(),
        exchange: request.exchange,
        interval: request.interval,
        datetime,
        open_price: bar.open.unwrap_or_default(),
        high_price: bar.high.unwrap_or_default(),
        low_price: bar.low.unwrap_or_default(),
        close_price: bar.close.unwrap_or_default(),
        volume: bar.volume.unwrap_or_default(),
        turnover: bar.amount.unwrap_or_default(),
    })
}
