//! Work items for the gateway worker.

use std::fmt;
use std::time::Instant;

use crossbeam::channel::{Receiver, Sender, TrySendError, unbounded};

use crate::broker::{TigerAsset, TigerOrderSnapshot, TigerPosition, TigerQuote};
use crate::domain::shared::LocalOrderId;
use crate::domain::trading::{
    BarRecord, CancelRequest, HistoryRequest, OrderRequest, SubscribeRequest,
};

/// One of the three broker sub-connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionKind {
    /// Order and account operations.
    Trade,
    /// Polled quotes and bars.
    Quote,
    /// Streaming callbacks.
    Push,
}

impl ConnectionKind {
    /// All kinds, in connect order.
    pub const ALL: [Self; 3] = [Self::Trade, Self::Quote, Self::Push];

    /// Lowercase name used in logs and metric labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trade => "trade",
            Self::Quote => "quote",
            Self::Push => "push",
        }
    }
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of broker-facing work, executed in FIFO order by the worker.
///
/// Tasks that answer a host call carry a reply channel. The host may have
/// stopped waiting by the time the reply is sent; a failed send is ignored.
#[derive(Debug)]
pub enum Task {
    /// Open one sub-connection.
    Connect(ConnectionKind),
    /// Periodic refresh and reconnect check.
    Heartbeat,
    /// Submit an order.
    SendOrder {
        /// The order.
        request: OrderRequest,
        /// Receives the local id, or the empty id on rejection.
        reply: Option<Sender<LocalOrderId>>,
        /// Past this instant the order is rejected unsent; the caller has
        /// already been told it was not accepted.
        deadline: Option<Instant>,
    },
    /// Cancel an order.
    CancelOrder(CancelRequest),
    /// Add an instrument to the subscription set.
    Subscribe(SubscribeRequest),
    /// Fetch historical bars.
    QueryHistory {
        /// Range and interval.
        request: HistoryRequest,
        /// Receives the bars, empty on failure.
        reply: Option<Sender<Vec<BarRecord>>>,
    },
    /// Poll account summaries.
    QueryAccount,
    /// Poll holdings.
    QueryPositions,
    /// Poll orders.
    QueryOrders,
    /// Poll quotes for the subscription set.
    PollQuotes,
    /// Pushed quote.
    PushQuote(TigerQuote),
    /// Pushed account summary.
    PushAsset(TigerAsset),
    /// Pushed holding.
    PushPosition(TigerPosition),
    /// Pushed order update.
    PushOrder(TigerOrderSnapshot),
    /// Push session went up or down.
    PushConnectionChanged(bool),
}

impl Task {
    /// Short name for logs and metric labels.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Connect(_) => "connect",
            Self::Heartbeat => "heartbeat",
            Self::SendOrder { .. } => "send_order",
            Self::CancelOrder(_) => "cancel_order",
            Self::Subscribe(_) => "subscribe",
            Self::QueryHistory { .. } => "query_history",
            Self::QueryAccount => "query_account",
            Self::QueryPositions => "query_positions",
            Self::QueryOrders => "query_orders",
            Self::PollQuotes => "poll_quotes",
            Self::PushQuote(_) => "push_quote",
            Self::PushAsset(_) => "push_asset",
            Self::PushPosition(_) => "push_position",
            Self::PushOrder(_) => "push_order",
            Self::PushConnectionChanged(_) => "push_connection_changed",
        }
    }

    /// Returns true for the self-scheduled heartbeat.
    #[must_use]
    pub const fn is_heartbeat(&self) -> bool {
        matches!(self, Self::Heartbeat)
    }
}

/// Producer side of the task queue.
///
/// Cheap to clone. Every host call and every push callback goes through one.
#[derive(Debug, Clone)]
pub struct TaskSender {
    tx: Sender<Task>,
}

impl TaskSender {
    /// Append a task. Returns the task back if the worker is gone.
    pub fn send(&self, task: Task) -> Result<(), Task> {
        self.tx.try_send(task).map_err(|e| match e {
            TrySendError::Full(task) | TrySendError::Disconnected(task) => task,
        })
    }

    /// Tasks waiting in the queue.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tx.len()
    }
}

/// Create an unbounded FIFO task queue.
#[must_use]
pub fn task_queue() -> (TaskSender, Receiver<Task>) {
    let (tx, rx) = unbounded();
    (TaskSender { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_is_fifo() {
        let (tx, rx) = task_queue();
        tx.send(Task::QueryAccount).unwrap();
        tx.send(Task::QueryPositions).unwrap();
        tx.send(Task::Heartbeat).unwrap();

        assert_eq!(tx.pending(), 3);
        let names: Vec<_> = rx.try_iter().map(|t| t.name()).collect();
        assert_eq!(names, ["query_account", "query_positions", "heartbeat"]);
    }

    #[test]
    fn send_after_receiver_dropped_returns_task() {
        let (tx, rx) = task_queue();
        drop(rx);

        let Err(task) = tx.send(Task::Connect(ConnectionKind::Push)) else {
            panic!("expected send failure");
        };
        assert!(matches!(task, Task::Connect(ConnectionKind::Push)));
    }

    #[test]
    fn connection_kind_names() {
        let names: Vec<_> = ConnectionKind::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["trade", "quote", "push"]);
    }
}
