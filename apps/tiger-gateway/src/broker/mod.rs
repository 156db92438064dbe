//! Tiger SDK boundary.
//!
//! The opaque client contract the gateway drives, Tiger's native vocabulary,
//! and a scripted SDK for tests and demos.

pub mod api_types;
mod client;
mod error;
pub mod mock;

pub use api_types::{
    ActionType, BarQuery, Environment, Language, Market, Placement, TigerAsset, TigerBar,
    TigerOrder, TigerOrderSnapshot, TigerOrderStatus, TigerOrderType, TigerPosition, TigerQuote,
    TimeInForce,
};
#[cfg(test)]
pub use client::MockTradeClient;
pub use client::{
    ClientConfig, PushClient, PushListener, QuoteClient, SdkAvailability, TigerSdk, TradeClient,
};
pub use error::BrokerError;
pub use mock::{MockCall, MockTigerSdk};
