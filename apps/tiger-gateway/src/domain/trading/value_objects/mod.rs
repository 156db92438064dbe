//! Trading Value Objects
//!
//! Platform-side enumerations. Their broker counterparts live in
//! [`crate::broker::api_types`] and are bridged by the translator.

mod direction;
mod interval;
mod order_status;
mod order_type;
mod product;

pub use direction::Direction;
pub use interval::Interval;
pub use order_status::OrderStatus;
pub use order_type::OrderType;
pub use product::Product;
