//! Shared Domain Types

pub mod value_objects;

pub use value_objects::{
    AccountId, BrokerOrderId, Exchange, InstrumentKey, LocalOrderId, Symbol, TradeId,
};
