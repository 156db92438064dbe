//! Instrument contract descriptor.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{Exchange, InstrumentKey, Symbol};
use crate::domain::trading::value_objects::Product;

/// Static description of a tradeable instrument.
///
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractDescriptor {
    /// Instrument symbol.
    pub symbol: Symbol,
    /// Listing exchange.
    pub exchange: Exchange,
    /// Display name.
    pub name: String,
    /// Product class.
    pub product: Product,
    /// Lot size.
    pub size: Decimal,
    /// Minimum price increment.
    pub price_tick: Decimal,
    /// Whether bars can be requested for the instrument.
    pub history_data: bool,
}

impl ContractDescriptor {
    /// Default lot size for synthesized contracts.
    pub const DEFAULT_SIZE: Decimal = dec!(1);

    /// Default price increment for synthesized contracts.
    pub const DEFAULT_PRICE_TICK: Decimal = dec!(0.01);

    /// Synthesize a descriptor with default trading parameters.
    #[must_use]
    pub fn synthesize(key: &InstrumentKey, product: Product) -> Self {
        Self {
            symbol: key.symbol.clone(),
            exchange: key.exchange,
            name: key.symbol.to_string(),
            product,
            size: Self::DEFAULT_SIZE,
            price_tick: Self::DEFAULT_PRICE_TICK,
            history_data: true,
        }
    }

    /// Cache key.
    #[must_use]
    pub fn key(&self) -> InstrumentKey {
        InstrumentKey::new(self.symbol.clone(), self.exchange)
    }
}
