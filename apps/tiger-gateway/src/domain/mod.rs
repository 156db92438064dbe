//! Domain Layer
//!
//! Platform-side types with no broker or infrastructure dependencies.
//!
//! - [`shared`]: identifiers and instrument identity
//! - [`trading`]: requests, records, events and trading enumerations

pub mod shared;
pub mod trading;
