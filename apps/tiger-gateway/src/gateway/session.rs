//! Session lifecycle and per-kind sub-connection state.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::reconnect::{ReconnectConfig, ReconnectPolicy};
use super::task::ConnectionKind;

/// Lifecycle of a gateway session.
///
/// ```text
/// Disconnected -> Connecting -> Connected -> Closing -> Closed
///                     |
///                     +-> Disconnected (every sub-connection failed)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// No session.
    #[default]
    Disconnected,
    /// Worker running, sub-connections being opened.
    Connecting,
    /// At least one of trade or quote is up.
    Connected,
    /// Close requested, worker draining.
    Closing,
    /// Worker gone, handles released.
    Closed,
}

impl SessionState {
    /// Returns true while a worker owns the session.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Connecting | Self::Connected)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "DISCONNECTED",
            Self::Connecting => "CONNECTING",
            Self::Connected => "CONNECTED",
            Self::Closing => "CLOSING",
            Self::Closed => "CLOSED",
        };
        f.write_str(name)
    }
}

/// Host-visible view of the three sub-connections.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConnectionStatus {
    /// Trade connection up.
    pub trade: bool,
    /// Quote connection up.
    pub quote: bool,
    /// Push connection up.
    pub push: bool,
    /// False once the SDK reported push as unsupported.
    pub push_supported: bool,
}

impl ConnectionStatus {
    /// Connected flag of one kind.
    #[must_use]
    pub const fn is_connected(&self, kind: ConnectionKind) -> bool {
        match kind {
            ConnectionKind::Trade => self.trade,
            ConnectionKind::Quote => self.quote,
            ConnectionKind::Push => self.push,
        }
    }

    pub(crate) const fn set(&mut self, kind: ConnectionKind, connected: bool) {
        match kind {
            ConnectionKind::Trade => self.trade = connected,
            ConnectionKind::Quote => self.quote = connected,
            ConnectionKind::Push => self.push = connected,
        }
    }
}

/// Session state and connection status shared between the worker, which
/// writes them, and the host, which reads snapshots.
#[derive(Debug, Clone, Default)]
pub struct SharedStatus {
    session: Arc<RwLock<SessionState>>,
    connections: Arc<RwLock<ConnectionStatus>>,
}

impl SharedStatus {
    /// Current session state.
    #[must_use]
    pub fn session(&self) -> SessionState {
        *self.session.read()
    }

    /// Replace the session state, returning the previous one.
    pub fn set_session(&self, state: SessionState) -> SessionState {
        std::mem::replace(&mut *self.session.write(), state)
    }

    /// Move from `from` to `to` only if the state is still `from`.
    pub fn transition(&self, from: SessionState, to: SessionState) -> bool {
        let mut session = self.session.write();
        if *session == from {
            *session = to;
            true
        } else {
            false
        }
    }

    /// Snapshot of the sub-connections.
    #[must_use]
    pub fn connections(&self) -> ConnectionStatus {
        self.connections.read().clone()
    }

    /// Replace the sub-connection snapshot.
    pub fn set_connections(&self, status: ConnectionStatus) {
        *self.connections.write() = status;
    }
}

/// One sub-connection owned by the worker.
///
/// `C` is the client trait object for the kind, e.g. `dyn TradeClient`.
pub struct SubConnection<C: ?Sized> {
    kind: ConnectionKind,
    handle: Option<Box<C>>,
    connected: bool,
    last_error: Option<String>,
    unsupported: bool,
    backoff: ReconnectPolicy,
}

impl<C: ?Sized> SubConnection<C> {
    /// A sub-connection with no handle.
    #[must_use]
    pub const fn new(kind: ConnectionKind, reconnect: ReconnectConfig) -> Self {
        Self {
            kind,
            handle: None,
            connected: false,
            last_error: None,
            unsupported: false,
            backoff: ReconnectPolicy::new(reconnect),
        }
    }

    /// Which connection this is.
    #[must_use]
    pub const fn kind(&self) -> ConnectionKind {
        self.kind
    }

    /// The client, if connected.
    #[must_use]
    pub fn client(&self) -> Option<&C> {
        if self.connected {
            self.handle.as_deref()
        } else {
            None
        }
    }

    /// Returns true if the connection is up.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connected
    }

    /// Error of the last failed attempt.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Returns true once the SDK reported this kind as unsupported.
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        self.unsupported
    }

    /// Install a live handle.
    pub fn mark_connected(&mut self, handle: Box<C>) {
        self.handle = Some(handle);
        self.connected = true;
        self.last_error = None;
        self.backoff.reset();
    }

    /// Record a failed attempt and schedule a retry.
    ///
    /// A handle that was built but failed to connect is kept, so push can
    /// reconnect through the same client.
    pub fn mark_failed(&mut self, error: impl Into<String>, now: Instant) -> Option<Instant> {
        self.connected = false;
        self.last_error = Some(error.into());
        self.backoff.schedule_after_failure(now)
    }

    /// Park a built handle that is not yet connected.
    pub fn stage(&mut self, handle: Box<C>) {
        self.handle = Some(handle);
        self.connected = false;
    }

    /// The handle regardless of connected state.
    #[must_use]
    pub fn staged(&self) -> Option<&C> {
        self.handle.as_deref()
    }

    /// Flip the connected flag of an existing handle.
    pub fn set_connected(&mut self, connected: bool, now: Instant) {
        if connected && self.handle.is_some() {
            self.connected = true;
            self.last_error = None;
            self.backoff.reset();
        } else if !connected && self.connected {
            self.connected = false;
            self.backoff.schedule_after_failure(now);
        }
    }

    /// Disable retries for the session.
    pub fn mark_unsupported(&mut self, reason: impl Into<String>) {
        self.unsupported = true;
        self.connected = false;
        self.handle = None;
        self.last_error = Some(reason.into());
    }

    /// Returns true if a retry is scheduled and due.
    #[must_use]
    pub fn retry_due(&self, now: Instant) -> bool {
        !self.connected && !self.unsupported && self.backoff.is_due(now)
    }

    /// Release the handle.
    pub fn take(&mut self) -> Option<Box<C>> {
        self.connected = false;
        self.handle.take()
    }
}

impl<C: ?Sized> fmt::Debug for SubConnection<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubConnection")
            .field("kind", &self.kind)
            .field("has_handle", &self.handle.is_some())
            .field("connected", &self.connected)
            .field("last_error", &self.last_error)
            .field("unsupported", &self.unsupported)
            .finish_non_exhaustive()
    }
}
