//! Worker-owned gateway state and task dispatch.
//!
//! Everything here runs on the worker thread. [`GatewayCore::handle`] can be
//! driven directly with synthetic tasks, which is how the unit tests below
//! exercise the supervisor logic without a thread.

use std::sync::Arc;
use std::time::Instant;

use super::contracts::ContractCache;
use super::emitter::Emitter;
use super::market_data::MarketDataReconciler;
use super::orders::OrderManager;
use super::reconnect::ReconnectConfig;
use super::session::{ConnectionStatus, SessionState, SharedStatus, SubConnection};
use super::task::{ConnectionKind, Task, TaskSender};
use crate::broker::{
    BrokerError, ClientConfig, PushClient, PushListener, QuoteClient, TigerAsset,
    TigerOrderSnapshot, TigerPosition, TigerQuote, TigerSdk, TradeClient,
};
use crate::config::SupervisorSettings;
use crate::error::TaskError;
use crate::observability;

/// All mutable state of one gateway session.
pub struct GatewayCore {
    emitter: Emitter,
    sdk: Arc<dyn TigerSdk>,
    client_config: ClientConfig,
    trade: SubConnection<dyn TradeClient>,
    quote: SubConnection<dyn QuoteClient>,
    push: SubConnection<dyn PushClient>,
    contracts: ContractCache,
    orders: OrderManager,
    market: MarketDataReconciler,
    shared: SharedStatus,
    tasks: TaskSender,
    initial_connects: usize,
}

impl GatewayCore {
    /// Create the core for a session that is about to connect.
    #[must_use]
    pub fn new(
        emitter: Emitter,
        sdk: Arc<dyn TigerSdk>,
        client_config: ClientConfig,
        settings: &SupervisorSettings,
        shared: SharedStatus,
        tasks: TaskSender,
    ) -> Self {
        let reconnect = ReconnectConfig::from_settings(&settings.reconnect);
        let account = client_config.account.clone();
        Self {
            orders: OrderManager::new(emitter.clone(), account.as_str()),
            market: MarketDataReconciler::new(emitter.clone(), account.as_str()),
            emitter,
            sdk,
            client_config,
            trade: SubConnection::new(ConnectionKind::Trade, reconnect.clone()),
            quote: SubConnection::new(ConnectionKind::Quote, reconnect.clone()),
            push: SubConnection::new(ConnectionKind::Push, reconnect),
            contracts: ContractCache::new(),
            shared,
            tasks,
            initial_connects: ConnectionKind::ALL.len(),
        }
    }

    /// Execute one task.
    ///
    /// Failures the task can report itself (order rejections, cancel
    /// outcomes, connect failures) are published inside; the returned error
    /// is for the worker to log.
    pub fn handle(&mut self, task: Task) -> Result<(), TaskError> {
        match task {
            Task::Connect(kind) => {
                self.connect(kind);
                Ok(())
            }
            Task::Heartbeat => {
                self.heartbeat();
                Ok(())
            }
            Task::SendOrder {
                request,
                reply,
                deadline,
            } => {
                let id = if deadline.is_some_and(|at| Instant::now() >= at) {
                    self.orders
                        .reject_request(&request, "request expired before submission")
                } else {
                    self.orders
                        .send_order(&request, self.trade.client(), &mut self.contracts)
                };
                if let Some(reply) = reply {
                    // Caller may have timed out.
                    let _ = reply.send(id);
                }
                Ok(())
            }
            Task::CancelOrder(request) => {
                self.orders.cancel_order(&request, self.trade.client());
                Ok(())
            }
            Task::Subscribe(request) => {
                self.market
                    .subscribe(&request, self.push.client(), &mut self.contracts);
                Ok(())
            }
            Task::QueryHistory { request, reply } => {
                let (bars, outcome) = match self.market.query_history(&request, self.quote.client())
                {
                    Ok(bars) => (bars, Ok(())),
                    Err(e) => (Vec::new(), Err(e)),
                };
                if let Some(reply) = reply {
                    let _ = reply.send(bars);
                }
                outcome
            }
            Task::QueryAccount => self.market.query_account(self.trade.client()),
            Task::QueryPositions => self
                .market
                .query_positions(self.trade.client(), &mut self.contracts),
            Task::QueryOrders => self
                .orders
                .query_orders(self.trade.client(), &mut self.contracts),
            Task::PollQuotes => self.market.poll_quotes(self.quote.client()),
            Task::PushQuote(quote) => {
                self.market.on_quote(&quote);
                Ok(())
            }
            Task::PushAsset(asset) => {
                self.market.apply_asset(&asset);
                Ok(())
            }
            Task::PushPosition(position) => {
                self.market.apply_position(&position, &mut self.contracts);
                Ok(())
            }
            Task::PushOrder(order) => {
                self.orders.reconcile(&order, &mut self.contracts);
                Ok(())
            }
            Task::PushConnectionChanged(connected) => self.on_push_connection(connected),
        }
    }

    // ------------------------------------------------------------------
    // Connections
    // ------------------------------------------------------------------

    fn connect(&mut self, kind: ConnectionKind) {
        let now = Instant::now();
        let result = match kind {
            ConnectionKind::Trade => self
                .sdk
                .trade_client(&self.client_config)
                .map(|client| self.trade.mark_connected(client)),
            ConnectionKind::Quote => self
                .sdk
                .quote_client(&self.client_config)
                .map(|client| self.quote.mark_connected(client)),
            ConnectionKind::Push => self.connect_push(),
        };

        match result {
            Ok(()) => {
                tracing::info!(kind = %kind, "Sub-connection established");
                self.emitter.log(format!("{kind} connection established"));
                self.queue_refresh(kind);
            }
            Err(e) if kind == ConnectionKind::Push && e.is_unsupported() => {
                self.push.mark_unsupported(e.to_string());
                self.emitter.log(format!(
                    "Push not supported by this SDK build ({e}); quotes will be polled"
                ));
            }
            Err(e) => {
                let retry_at = match kind {
                    ConnectionKind::Trade => self.trade.mark_failed(e.to_string(), now),
                    ConnectionKind::Quote => self.quote.mark_failed(e.to_string(), now),
                    ConnectionKind::Push => self.push.mark_failed(e.to_string(), now),
                };
                tracing::warn!(
                    kind = %kind,
                    error = %e,
                    retry_in = ?retry_at.map(|at| at.saturating_duration_since(now)),
                    "Sub-connection failed"
                );
                self.emitter
                    .log_failure(format!("{kind} connection failed: {e}"));
            }
        }

        self.publish_status();
        self.initial_connects = self.initial_connects.saturating_sub(1);
        self.update_session();
    }

    /// Queue the first snapshot a fresh connection can serve.
    fn queue_refresh(&self, kind: ConnectionKind) {
        let refresh = match kind {
            ConnectionKind::Trade => {
                vec![Task::QueryAccount, Task::QueryPositions, Task::QueryOrders]
            }
            ConnectionKind::Quote => vec![Task::PollQuotes],
            ConnectionKind::Push => Vec::new(),
        };
        for task in refresh {
            if let Err(task) = self.tasks.send(task) {
                tracing::debug!(task = task.name(), "Queue closed; refresh skipped");
            }
        }
    }

    fn connect_push(&mut self) -> Result<(), BrokerError> {
        if self.push.staged().is_none() {
            let client = self.sdk.push_client(&self.client_config)?;
            self.push.stage(client);
        }
        let client = self
            .push
            .staged()
            .ok_or_else(|| BrokerError::connection("push client missing"))?;

        let listener: Arc<dyn PushListener> = Arc::new(PushBridge::new(self.tasks.clone()));
        client.connect(listener)?;
        client.subscribe_account_channels(&self.client_config.account)?;

        self.push.set_connected(true, Instant::now());
        self.resubscribe();
        Ok(())
    }

    fn on_push_connection(&mut self, connected: bool) -> Result<(), TaskError> {
        if self.push.is_unsupported() || self.push.staged().is_none() {
            return Ok(());
        }
        let was_connected = self.push.is_connected();
        self.push.set_connected(connected, Instant::now());
        self.publish_status();

        if connected {
            if !was_connected {
                self.emitter.log("Push connection restored");
            }
            self.resubscribe();
        } else if was_connected {
            self.emitter
                .log_failure("Push connection lost; polling quotes until it returns");
        }
        Ok(())
    }

    fn resubscribe(&mut self) {
        if let Some(push) = self.push.client() {
            if let Err(e) = self.market.resubscribe_all(push) {
                self.emitter.log_failure(e.to_string());
            }
        }
    }

    fn publish_status(&self) {
        let mut status = ConnectionStatus {
            push_supported: !self.push.is_unsupported(),
            ..ConnectionStatus::default()
        };
        for (kind, connected) in [
            (ConnectionKind::Trade, self.trade.is_connected()),
            (ConnectionKind::Quote, self.quote.is_connected()),
            (ConnectionKind::Push, self.push.is_connected()),
        ] {
            status.set(kind, connected);
            observability::set_connection_state(
                self.emitter.gateway_name(),
                kind.as_str(),
                connected,
            );
        }
        self.shared.set_connections(status);
    }

    fn update_session(&self) {
        if self.trade.is_connected() || self.quote.is_connected() {
            if self.shared.transition(SessionState::Connecting, SessionState::Connected)
                || self
                    .shared
                    .transition(SessionState::Disconnected, SessionState::Connected)
            {
                self.emitter.log("Gateway connected");
            }
            return;
        }

        let nothing_up = !self.push.is_connected();
        if self.initial_connects == 0
            && nothing_up
            && self
                .shared
                .transition(SessionState::Connecting, SessionState::Disconnected)
        {
            self.emitter
                .log_failure("Every connection failed; retrying in the background");
        }
    }

    // ------------------------------------------------------------------
    // Heartbeat
    // ------------------------------------------------------------------

    fn heartbeat(&mut self) {
        observability::record_heartbeat(self.emitter.gateway_name());
        let now = Instant::now();

        for kind in ConnectionKind::ALL {
            let due = match kind {
                ConnectionKind::Trade => self.trade.retry_due(now),
                ConnectionKind::Quote => self.quote.retry_due(now),
                ConnectionKind::Push => self.push.retry_due(now),
            };
            if due {
                tracing::info!(kind = %kind, "Retrying sub-connection");
                self.connect(kind);
            }
        }

        if self.trade.is_connected() {
            let account = self.market.query_account(self.trade.client());
            let positions = self
                .market
                .query_positions(self.trade.client(), &mut self.contracts);
            let orders = self
                .orders
                .query_orders(self.trade.client(), &mut self.contracts);
            for result in [account, positions, orders] {
                self.report(result);
            }
        }

        if let Some(push) = self.push.client() {
            let retried = self.market.retry_unstreamed(push);
            self.report(retried);
        }

        if self.quote.is_connected() {
            let quotes = if self.push.is_connected() {
                self.market.poll_unstreamed(self.quote.client())
            } else {
                self.market.poll_quotes(self.quote.client())
            };
            self.report(quotes);
        }
    }

    fn report(&self, result: Result<(), TaskError>) {
        if let Err(e) = result {
            self.emitter.log_failure(e.to_string());
        }
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Release every broker handle: unsubscribe, disconnect push, then drop
    /// the clients.
    pub fn teardown(&mut self) {
        if let Some(push) = self.push.client() {
            self.market.unsubscribe_all(push);
        }
        if let Some(push) = self.push.staged() {
            push.disconnect();
        }
        drop(self.push.take());
        drop(self.quote.take());
        drop(self.trade.take());
        self.publish_status();
        tracing::info!("Broker handles released");
    }

    /// Emitter of this session.
    #[must_use]
    pub const fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    /// Order state, for inspection.
    #[must_use]
    pub const fn orders(&self) -> &OrderManager {
        &self.orders
    }

    /// Market state, for inspection.
    #[must_use]
    pub const fn market(&self) -> &MarketDataReconciler {
        &self.market
    }

    /// Contract cache, for inspection.
    #[must_use]
    pub const fn contracts(&self) -> &ContractCache {
        &self.contracts
    }
}

impl std::fmt::Debug for GatewayCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayCore")
            .field("gateway", &self.emitter.gateway_name())
            .field("trade", &self.trade)
            .field("quote", &self.quote)
            .field("push", &self.push)
            .finish_non_exhaustive()
    }
}

/// Push listener that turns SDK callbacks into worker tasks.
///
/// Runs on the SDK's thread and never touches gateway state.
#[derive(Debug, Clone)]
pub struct PushBridge {
    tasks: TaskSender,
}

impl PushBridge {
    /// Bridge into the given queue.
    #[must_use]
    pub const fn new(tasks: TaskSender) -> Self {
        Self { tasks }
    }

    fn forward(&self, task: Task) {
        if let Err(task) = self.tasks.send(task) {
            tracing::debug!(task = task.name(), "Push callback after worker exit");
        }
    }
}

impl PushListener for PushBridge {
    fn on_quote_change(&self, quote: TigerQuote) {
        self.forward(Task::PushQuote(quote));
    }

    fn on_asset_change(&self, asset: TigerAsset) {
        self.forward(Task::PushAsset(asset));
    }

    fn on_position_change(&self, position: TigerPosition) {
        self.forward(Task::PushPosition(position));
    }

    fn on_order_change(&self, order: TigerOrderSnapshot) {
        self.forward(Task::PushOrder(order));
    }

    fn on_connection_change(&self, connected: bool) {
        self.forward(Task::PushConnectionChanged(connected));
    }
}
