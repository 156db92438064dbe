//! Trading Context
//!
//! Platform-side vocabulary: requests the host sends in, records and events
//! the gateway sends out.

pub mod events;
pub mod records;
pub mod requests;
pub mod value_objects;

pub use events::{GatewayEvent, LogRecord};
pub use records::{
    AccountRecord, BarRecord, ContractDescriptor, OrderRecord, PositionKey, PositionRecord,
    TickSnapshot, TradeRecord,
};
pub use requests::{CancelRequest, HistoryRequest, OrderRequest, SubscribeRequest};
pub use value_objects::{Direction, Interval, OrderStatus, OrderType, Product};
