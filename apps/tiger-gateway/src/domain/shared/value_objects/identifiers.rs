//! Strongly-typed identifiers for gateway entities.
//!
//! The platform and the broker number orders independently; keeping the two
//! id spaces in distinct types stops one from being passed where the other
//! is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Whether the identifier holds no characters.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(
    LocalOrderId,
    "Platform-side order identifier issued by the gateway."
);
define_id!(BrokerOrderId, "Tiger's identifier for an order.");
define_id!(AccountId, "Tiger trading account identifier.");
define_id!(TradeId, "Identifier for a single fill derived from an order.");

impl LocalOrderId {
    /// The sentinel returned to callers when an order was not accepted.
    #[must_use]
    pub const fn empty() -> Self {
        Self(String::new())
    }
}

impl From<i64> for BrokerOrderId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl BrokerOrderId {
    /// Numeric form used by the Tiger trade API.
    #[must_use]
    pub fn as_numeric(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_order_id_new_and_display() {
        let id = LocalOrderId::new("100001");
        assert_eq!(id.as_str(), "100001");
        assert_eq!(format!("{id}"), "100001");
    }

    #[test]
    fn empty_sentinel() {
        let id = LocalOrderId::empty();
        assert!(id.is_empty());
        assert_eq!(id, LocalOrderId::new(""));
        assert!(!LocalOrderId::new("100001").is_empty());
    }

    #[test]
    fn broker_order_id_from_numeric() {
        let id = BrokerOrderId::from(26_731_241_631_105_024_i64);
        assert_eq!(id.as_str(), "26731241631105024");
        assert_eq!(id.as_numeric(), Some(26_731_241_631_105_024));
    }

    #[test]
    fn broker_order_id_non_numeric() {
        assert_eq!(BrokerOrderId::new("abc").as_numeric(), None);
    }

    #[test]
    fn account_id_from_string() {
        let id: AccountId = "DU575569".into();
        assert_eq!(id.as_str(), "DU575569");

        let id: AccountId = String::from("20190101").into();
        assert_eq!(id.into_inner(), "20190101");
    }

    #[test]
    fn serde_transparent() {
        let id = BrokerOrderId::new("42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"42\"");
    }

    #[test]
    fn hash_works_for_collections() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(LocalOrderId::new("100001"));
        set.insert(LocalOrderId::new("100002"));
        set.insert(LocalOrderId::new("100001"));

        assert_eq!(set.len(), 2);
    }
}
