//! Session-lifetime contract cache.

use std::collections::HashMap;

use super::emitter::Emitter;
use crate::domain::shared::InstrumentKey;
use crate::domain::trading::{ContractDescriptor, GatewayEvent, Product};

/// Memoized contract descriptors keyed by (symbol, exchange).
///
/// Tiger does not publish a contract catalog the gateway can rely on, so
/// descriptors are synthesized the first time an instrument is referenced.
#[derive(Debug, Default)]
pub struct ContractCache {
    contracts: HashMap<InstrumentKey, ContractDescriptor>,
}

impl ContractCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptor for `key`, synthesizing an equity contract on first use.
    ///
    /// The flag is true only for the call that created the entry.
    pub fn get_or_create(&mut self, key: &InstrumentKey) -> (ContractDescriptor, bool) {
        self.get_or_create_as(key, Product::Equity)
    }

    /// Like [`Self::get_or_create`], with the product class to use if the
    /// entry is created. An existing entry is returned unchanged.
    pub fn get_or_create_as(
        &mut self,
        key: &InstrumentKey,
        product: Product,
    ) -> (ContractDescriptor, bool) {
        if let Some(existing) = self.contracts.get(key) {
            return (existing.clone(), false);
        }
        let contract = ContractDescriptor::synthesize(key, product);
        self.contracts.insert(key.clone(), contract.clone());
        (contract, true)
    }

    /// Descriptor for `key`, publishing a contract event the first time it
    /// is seen.
    pub fn ensure(
        &mut self,
        key: &InstrumentKey,
        product: Product,
        emitter: &Emitter,
    ) -> ContractDescriptor {
        let (contract, created) = self.get_or_create_as(key, product);
        if created {
            tracing::debug!(instrument = %key, product = %contract.product, "Contract created");
            emitter.emit(GatewayEvent::Contract(contract.clone()));
        }
        contract
    }

    /// Descriptor for `key` if already known.
    #[must_use]
    pub fn get(&self, key: &InstrumentKey) -> Option<&ContractDescriptor> {
        self.contracts.get(key)
    }

    /// Number of known contracts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// Returns true if no contract is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::Exchange;
    use crate::events::RecordingEventPublisher;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    #[test]
    fn first_call_creates_with_defaults() {
        let mut cache = ContractCache::new();
        let key = InstrumentKey::new("AAPL", Exchange::Nasdaq);

        let (contract, created) = cache.get_or_create(&key);

        assert!(created);
        assert_eq!(contract.product, Product::Equity);
        assert_eq!(contract.size, dec!(1));
        assert_eq!(contract.price_tick, dec!(0.01));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn repeated_calls_return_same_descriptor() {
        let mut cache = ContractCache::new();
        let key = InstrumentKey::new("AAPL", Exchange::Nasdaq);

        let (first, _) = cache.get_or_create(&key);
        let (second, created) = cache.get_or_create(&key);

        assert!(!created);
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn existing_entry_ignores_product_hint() {
        let mut cache = ContractCache::new();
        let key = InstrumentKey::new("00700", Exchange::Sehk);

        cache.get_or_create(&key);
        let (contract, created) = cache.get_or_create_as(&key, Product::Warrant);

        assert!(!created);
        assert_eq!(contract.product, Product::Equity);
    }

    #[test]
    fn exchange_is_part_of_the_key() {
        let mut cache = ContractCache::new();
        cache.get_or_create(&InstrumentKey::new("ABC", Exchange::Nasdaq));
        let (_, created) = cache.get_or_create(&InstrumentKey::new("ABC", Exchange::Nyse));

        assert!(created);
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&InstrumentKey::new("ABC", Exchange::Sse)).is_none());
    }

    #[test]
    fn ensure_publishes_one_event_per_instrument() {
        let recorder = Arc::new(RecordingEventPublisher::new());
        let emitter = Emitter::new("TIGER", recorder.clone());
        let mut cache = ContractCache::new();
        let key = InstrumentKey::new("AAPL", Exchange::Nasdaq);

        cache.ensure(&key, Product::Equity, &emitter);
        cache.ensure(&key, Product::Equity, &emitter);
        cache.ensure(&key, Product::Option, &emitter);

        assert_eq!(recorder.count("contract"), 1);
    }
}
