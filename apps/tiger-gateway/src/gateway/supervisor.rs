//! Host-facing gateway.
//!
//! [`TigerGateway`] is what the platform drives. Every call is a thin
//! enqueue onto the worker; calls that return a value wait for the worker's
//! reply with a bounded timeout.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel::bounded;
use parking_lot::Mutex;

use super::core::GatewayCore;
use super::emitter::Emitter;
use super::session::{ConnectionStatus, SessionState, SharedStatus};
use super::task::{ConnectionKind, Task, TaskSender, task_queue};
use super::worker::{WorkerHandle, WorkerTiming, spawn_worker};
use crate::broker::{ClientConfig, SdkAvailability, TigerSdk};
use crate::config::{SupervisorSettings, TigerSettings, validate_startup};
use crate::domain::shared::LocalOrderId;
use crate::domain::trading::{
    BarRecord, CancelRequest, GatewayEvent, HistoryRequest, OrderRecord, OrderRequest,
    OrderStatus, SubscribeRequest,
};
use crate::error::ConnectError;
use crate::events::EventPublisher;
use crate::observability;

struct Running {
    tasks: TaskSender,
    worker: WorkerHandle,
}

/// Tiger gateway instance.
///
/// # Example
///
/// ```ignore
/// let gateway = TigerGateway::new(
///     TigerGateway::DEFAULT_NAME,
///     Arc::new(NoOpEventPublisher),
///     SdkAvailability::available(MockTigerSdk::new()),
/// );
/// gateway.connect(&config.tiger)?;
/// gateway.subscribe(SubscribeRequest::new("AAPL", Exchange::Nasdaq));
/// let id = gateway.send_order(OrderRequest::market("AAPL", Exchange::Nasdaq, Direction::Long, dec!(1)));
/// gateway.close();
/// ```
pub struct TigerGateway {
    emitter: Emitter,
    sdk: SdkAvailability,
    settings: SupervisorSettings,
    shared: SharedStatus,
    running: Mutex<Option<Running>>,
}

impl TigerGateway {
    /// Default gateway instance name.
    pub const DEFAULT_NAME: &'static str = "TIGER";

    /// Create a disconnected gateway with default supervisor settings.
    #[must_use]
    pub fn new(
        name: impl Into<Arc<str>>,
        publisher: Arc<dyn EventPublisher>,
        sdk: SdkAvailability,
    ) -> Self {
        Self {
            emitter: Emitter::new(name, publisher),
            sdk,
            settings: SupervisorSettings::default(),
            shared: SharedStatus::default(),
            running: Mutex::new(None),
        }
    }

    /// Replace the supervisor settings. Applies to the next `connect`.
    #[must_use]
    pub fn with_settings(mut self, settings: SupervisorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Gateway instance name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.emitter.gateway_name()
    }

    /// Current session state.
    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.shared.session()
    }

    /// Current sub-connection status.
    #[must_use]
    pub fn connection_status(&self) -> ConnectionStatus {
        self.shared.connections()
    }

    /// Start a session.
    ///
    /// Validates settings, starts the worker and queues the trade, quote and
    /// push connects. Returns once the worker is running; sub-connection
    /// outcomes arrive as log events and in [`Self::connection_status`].
    pub fn connect(&self, settings: &TigerSettings) -> Result<(), ConnectError> {
        let mut running = self.running.lock();

        let state = self.shared.session();
        if state.is_live() {
            self.emitter
                .log_failure(format!("Connect ignored: session is {state}"));
            return Err(ConnectError::AlreadyConnected { state });
        }
        if let Some(stale) = running.take() {
            tracing::info!("Stopping worker of the failed session");
            if !stale.worker.shutdown(self.settings.shutdown_timeout()) {
                tracing::warn!("Previous worker did not stop in time");
            }
        }

        let (sdk, client_config) = match self.prepare(settings) {
            Ok(prepared) => prepared,
            Err(e) => {
                self.emitter.log_failure(format!("Connect failed: {e}"));
                self.shared.set_session(SessionState::Disconnected);
                return Err(e);
            }
        };

        self.shared.set_session(SessionState::Connecting);
        let (tasks, queue) = task_queue();
        for kind in ConnectionKind::ALL {
            // The receiver is alive until spawn_worker takes it.
            let _ = tasks.send(Task::Connect(kind));
        }

        let environment = client_config.environment;
        let core = GatewayCore::new(
            self.emitter.clone(),
            sdk,
            client_config,
            &self.settings,
            self.shared.clone(),
            tasks.clone(),
        );
        let timing = WorkerTiming {
            heartbeat_interval: self.settings.heartbeat_interval(),
            idle_poll: self.settings.idle_poll(),
        };
        let worker = match spawn_worker(self.name(), core, queue, tasks.clone(), timing) {
            Ok(worker) => worker,
            Err(e) => {
                self.shared.set_session(SessionState::Disconnected);
                self.emitter
                    .log_failure(format!("Connect failed: cannot start worker: {e}"));
                return Err(ConnectError::WorkerSpawn(e));
            }
        };

        *running = Some(Running { tasks, worker });
        self.emitter.log(format!("Connecting to Tiger ({environment})"));
        Ok(())
    }

    /// Validate settings, then resolve the SDK and load key material.
    fn prepare(
        &self,
        settings: &TigerSettings,
    ) -> Result<(Arc<dyn TigerSdk>, ClientConfig), ConnectError> {
        let validation = validate_startup(settings)?;
        let sdk = self
            .sdk
            .sdk()
            .map_err(|reason| ConnectError::SdkUnavailable { reason })?;
        let client_config = settings.client_config()?;
        for warning in validation.warnings {
            tracing::warn!("{warning}");
        }
        Ok((sdk, client_config))
    }

    /// Append a task to the worker queue. Returns false, with a log, if no
    /// worker is running.
    pub fn enqueue(&self, task: Task) -> bool {
        let running = self.running.lock();
        let Some(running) = running.as_ref() else {
            self.emitter
                .log_failure(format!("Gateway not connected; {} dropped", task.name()));
            return false;
        };
        match running.tasks.send(task) {
            Ok(()) => true,
            Err(task) => {
                self.emitter
                    .log_failure(format!("Gateway worker stopped; {} dropped", task.name()));
                false
            }
        }
    }

    /// Subscribe to quotes of an instrument.
    pub fn subscribe(&self, request: SubscribeRequest) {
        self.enqueue(Task::Subscribe(request));
    }

    /// Submit an order. Returns the local id, or the empty id if the order
    /// was not accepted.
    ///
    /// Every empty id comes with a `Rejected` order event, except when the
    /// reply times out while the worker is placing the order: the outcome is
    /// then unknown and the order events are authoritative. An order still
    /// queued when the reply times out is rejected unsent.
    pub fn send_order(&self, request: OrderRequest) -> LocalOrderId {
        let timeout = self.settings.request_timeout();
        let (reply, response) = bounded(1);
        let task = Task::SendOrder {
            request,
            reply: Some(reply),
            deadline: Some(Instant::now() + timeout),
        };

        let sent = match self.running.lock().as_ref() {
            Some(running) => running.tasks.send(task),
            None => Err(task),
        };
        if let Err(task) = sent {
            if let Task::SendOrder { request, .. } = task {
                self.reject_unsent(&request);
            }
            return LocalOrderId::empty();
        }

        response.recv_timeout(timeout).unwrap_or_else(|_| {
            self.emitter.log_failure(format!(
                "No send_order reply within {}; outcome unknown, follow order events",
                format_duration(timeout)
            ));
            LocalOrderId::empty()
        })
    }

    /// Report an order that never reached the worker.
    fn reject_unsent(&self, request: &OrderRequest) {
        let state = self.shared.session();
        let record = OrderRecord::from_request(LocalOrderId::empty(), request)
            .with_status(OrderStatus::Rejected);
        observability::record_order_submission(
            self.name(),
            "rejected",
            record.order_type.as_str(),
        );
        self.emitter.log_failure(format!(
            "Order for {} rejected: session is {state}",
            record.key()
        ));
        self.emitter.emit(GatewayEvent::Order(record));
    }

    /// Request cancellation of an order.
    pub fn cancel_order(&self, request: CancelRequest) {
        self.enqueue(Task::CancelOrder(request));
    }

    /// Fetch historical bars. Empty on any failure.
    pub fn query_history(&self, request: HistoryRequest) -> Vec<BarRecord> {
        let (reply, response) = bounded(1);
        if !self.enqueue(Task::QueryHistory {
            request,
            reply: Some(reply),
        }) {
            return Vec::new();
        }
        let timeout = self.settings.request_timeout();
        response.recv_timeout(timeout).unwrap_or_else(|_| {
            self.emitter.log_failure(format!(
                "No query_history reply within {}",
                format_duration(timeout)
            ));
            Vec::new()
        })
    }

    /// Stop the session: drain queued work, release broker handles and join
    /// the worker, waiting at most the configured shutdown timeout.
    pub fn close(&self) {
        let Some(running) = self.running.lock().take() else {
            return;
        };

        self.shared.set_session(SessionState::Closing);
        let timeout = self.settings.shutdown_timeout();
        if !running.worker.shutdown(timeout) {
            self.emitter.log_failure(format!(
                "Gateway worker did not stop within {}",
                format_duration(timeout)
            ));
        }
        self.shared.set_session(SessionState::Closed);
        self.emitter.log("Gateway closed");
    }
}

impl Drop for TigerGateway {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for TigerGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TigerGateway")
            .field("name", &self.name())
            .field("sdk", &self.sdk)
            .field("session", &self.shared.session())
            .finish_non_exhaustive()
    }
}

fn format_duration(duration: Duration) -> String {
    format!("{}ms", duration.as_millis())
}
