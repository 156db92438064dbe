//! Local <-> broker order id registry.
//!
//! Issues local ids and keeps a bijection between local and broker ids.
//! A binding, once made, never changes.

use std::collections::HashMap;

use thiserror::Error;

use crate::domain::shared::{BrokerOrderId, LocalOrderId};

/// Local ids are issued above this base, starting at `LOCAL_ID_BASE + 1`.
pub const LOCAL_ID_BASE: u64 = 100_000;

/// Registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The local id is already bound to another broker id.
    #[error("Local order {local} is already bound to broker order {existing}")]
    AlreadyBound {
        /// Local id.
        local: LocalOrderId,
        /// Broker id it is bound to.
        existing: BrokerOrderId,
    },

    /// The broker id is already bound to another local id.
    #[error("Broker order {broker} is already bound to local order {existing}")]
    BrokerIdInUse {
        /// Broker id.
        broker: BrokerOrderId,
        /// Local id it is bound to.
        existing: LocalOrderId,
    },
}

/// Id generator and local <-> broker bijection.
#[derive(Debug)]
pub struct IdentifierRegistry {
    last_issued: u64,
    local_to_broker: HashMap<LocalOrderId, BrokerOrderId>,
    broker_to_local: HashMap<BrokerOrderId, LocalOrderId>,
}

impl Default for IdentifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_issued: LOCAL_ID_BASE,
            local_to_broker: HashMap::new(),
            broker_to_local: HashMap::new(),
        }
    }

    /// Issue the next local id. Strictly increasing, never reused.
    pub fn next_local_id(&mut self) -> LocalOrderId {
        self.last_issued += 1;
        LocalOrderId::new(self.last_issued.to_string())
    }

    /// Bind a local id to a broker id.
    ///
    /// Repeating an identical binding succeeds. Any binding that would change
    /// an existing one fails and leaves the registry untouched.
    pub fn bind(
        &mut self,
        local: &LocalOrderId,
        broker: &BrokerOrderId,
    ) -> Result<(), RegistryError> {
        if let Some(existing) = self.local_to_broker.get(local) {
            if existing == broker {
                return Ok(());
            }
            return Err(RegistryError::AlreadyBound {
                local: local.clone(),
                existing: existing.clone(),
            });
        }
        if let Some(existing) = self.broker_to_local.get(broker) {
            return Err(RegistryError::BrokerIdInUse {
                broker: broker.clone(),
                existing: existing.clone(),
            });
        }

        self.local_to_broker.insert(local.clone(), broker.clone());
        self.broker_to_local.insert(broker.clone(), local.clone());
        Ok(())
    }

    /// Broker id bound to a local id.
    #[must_use]
    pub fn lookup_broker(&self, local: &LocalOrderId) -> Option<&BrokerOrderId> {
        self.local_to_broker.get(local)
    }

    /// Local id bound to a broker id.
    #[must_use]
    pub fn lookup_local(&self, broker: &BrokerOrderId) -> Option<&LocalOrderId> {
        self.broker_to_local.get(broker)
    }

    /// Local id for a broker order, issuing and binding a fresh one if the
    /// order was placed outside this session.
    ///
    /// Returns the id and whether it was newly issued.
    pub fn adopt(&mut self, broker: &BrokerOrderId) -> (LocalOrderId, bool) {
        if let Some(local) = self.broker_to_local.get(broker) {
            return (local.clone(), false);
        }
        let local = self.next_local_id();
        self.local_to_broker.insert(local.clone(), broker.clone());
        self.broker_to_local.insert(broker.clone(), local.clone());
        (local, true)
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.local_to_broker.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.local_to_broker.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_id_follows_base() {
        let mut registry = IdentifierRegistry::new();
        assert_eq!(registry.next_local_id().as_str(), "100001");
        assert_eq!(registry.next_local_id().as_str(), "100002");
    }

    #[test]
    fn bind_and_lookup_are_inverse() {
        let mut registry = IdentifierRegistry::new();
        let local = registry.next_local_id();
        let broker = BrokerOrderId::new("5000001");

        registry.bind(&local, &broker).unwrap();

        assert_eq!(registry.lookup_broker(&local), Some(&broker));
        assert_eq!(registry.lookup_local(&broker), Some(&local));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn identical_rebind_is_noop() {
        let mut registry = IdentifierRegistry::new();
        let local = registry.next_local_id();
        let broker = BrokerOrderId::new("5000001");

        registry.bind(&local, &broker).unwrap();
        registry.bind(&local, &broker).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn conflicting_rebind_keeps_first() {
        let mut registry = IdentifierRegistry::new();
        let local = registry.next_local_id();
        let first = BrokerOrderId::new("5000001");
        let second = BrokerOrderId::new("5000002");

        registry.bind(&local, &first).unwrap();
        let Err(err) = registry.bind(&local, &second) else {
            panic!("expected AlreadyBound");
        };
        assert!(matches!(err, RegistryError::AlreadyBound { .. }));
        assert_eq!(registry.lookup_broker(&local), Some(&first));
        assert_eq!(registry.lookup_local(&second), None);
    }

    #[test]
    fn broker_id_cannot_serve_two_orders() {
        let mut registry = IdentifierRegistry::new();
        let a = registry.next_local_id();
        let b = registry.next_local_id();
        let broker = BrokerOrderId::new("5000001");

        registry.bind(&a, &broker).unwrap();
        let Err(err) = registry.bind(&b, &broker) else {
            panic!("expected BrokerIdInUse");
        };
        assert!(matches!(err, RegistryError::BrokerIdInUse { .. }));
        assert_eq!(registry.lookup_broker(&b), None);
    }

    #[test]
    fn lookups_on_unknown_ids_are_none() {
        let registry = IdentifierRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.lookup_broker(&LocalOrderId::new("999")), None);
        assert_eq!(registry.lookup_local(&BrokerOrderId::new("999")), None);
    }

    #[test]
    fn adopt_issues_once() {
        let mut registry = IdentifierRegistry::new();
        let broker = BrokerOrderId::new("7777");

        let (first, created) = registry.adopt(&broker);
        assert!(created);
        let (second, created) = registry.adopt(&broker);
        assert!(!created);
        assert_eq!(first, second);
        assert_eq!(registry.lookup_local(&broker), Some(&first));
    }

    proptest! {
        #[test]
        fn issued_ids_strictly_increase(count in 1usize..500) {
            let mut registry = IdentifierRegistry::new();
            let mut previous = LOCAL_ID_BASE;
            for _ in 0..count {
                let id: u64 = registry.next_local_id().as_str().parse().unwrap();
                prop_assert!(id > previous);
                previous = id;
            }
        }

        #[test]
        fn adopted_and_issued_ids_never_collide(
            adopts in proptest::collection::vec(0i64..50, 1..40)
        ) {
            let mut registry = IdentifierRegistry::new();
            let mut seen = std::collections::HashSet::new();
            for broker in adopts {
                let issued = registry.next_local_id();
                prop_assert!(seen.insert(issued));
                let (local, created) = registry.adopt(&BrokerOrderId::from(broker));
                if created {
                    prop_assert!(seen.insert(local));
                }
            }
        }
    }
}
