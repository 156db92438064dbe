//! Shared Value Objects
//!
//! Identifiers and instrument identity used by every gateway component.

mod identifiers;
mod instrument;

pub use identifiers::{AccountId, BrokerOrderId, LocalOrderId, TradeId};
pub use instrument::{Exchange, InstrumentKey, Symbol};
