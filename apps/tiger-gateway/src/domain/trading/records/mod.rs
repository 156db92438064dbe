//! Snapshot records emitted to the platform.

mod account;
mod bar;
mod contract;
mod order;
mod position;
mod tick;
mod trade;

pub use account::AccountRecord;
pub use bar::BarRecord;
pub use contract::ContractDescriptor;
pub use order::OrderRecord;
pub use position::{PositionKey, PositionRecord};
pub use tick::TickSnapshot;
pub use trade::TradeRecord;
