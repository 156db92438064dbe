//! Events the gateway publishes to the platform bus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::trading::records::{
    AccountRecord, ContractDescriptor, OrderRecord, PositionRecord, TickSnapshot, TradeRecord,
};

/// A gateway message for the platform log panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Gateway instance that produced the message.
    pub gateway_name: String,
    /// Message text.
    pub message: String,
    /// When the message was produced.
    pub datetime: DateTime<Utc>,
}

impl LogRecord {
    /// Create a log record stamped with the current time.
    #[must_use]
    pub fn new(gateway_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            gateway_name: gateway_name.into(),
            message: message.into(),
            datetime: Utc::now(),
        }
    }
}

/// Outbound gateway event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum GatewayEvent {
    /// Order snapshot.
    Order(OrderRecord),
    /// Fill increment.
    Trade(TradeRecord),
    /// Account snapshot.
    Account(AccountRecord),
    /// Position snapshot.
    Position(PositionRecord),
    /// Quote snapshot.
    Tick(TickSnapshot),
    /// Newly known contract.
    Contract(ContractDescriptor),
    /// Human-readable message.
    Log(LogRecord),
}

impl GatewayEvent {
    /// Short event name for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Order(_) => "order",
            Self::Trade(_) => "trade",
            Self::Account(_) => "account",
            Self::Position(_) => "position",
            Self::Tick(_) => "tick",
            Self::Contract(_) => "contract",
            Self::Log(_) => "log",
        }
    }
}
