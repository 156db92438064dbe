//! Platform order status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status in the platform's vocabulary.
///
/// Every order starts in `Submitting` and only moves through broker
/// reconciliation afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Sent to the broker, not yet acknowledged.
    Submitting,
    /// Working at the broker with no fills.
    NotTraded,
    /// Working with some volume filled.
    PartTraded,
    /// Completely filled.
    AllTraded,
    /// Cancel requested, awaiting confirmation.
    Cancelling,
    /// Cancelled (also covers broker-side expiry).
    Cancelled,
    /// Refused by the broker or by the gateway before submission.
    Rejected,
}

impl OrderStatus {
    /// Returns true if the order can no longer change.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::AllTraded | Self::Cancelled | Self::Rejected)
    }

    /// Returns true if the order is still working at the broker.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitting => write!(f, "SUBMITTING"),
            Self::NotTraded => write!(f, "NOT_TRADED"),
            Self::PartTraded => write!(f, "PART_TRADED"),
            Self::AllTraded => write!(f, "ALL_TRADED"),
            Self::Cancelling => write!(f, "CANCELLING"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Rejected => write!(f, "REJECTED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_is_terminal() {
        assert!(!OrderStatus::Submitting.is_terminal());
        assert!(!OrderStatus::NotTraded.is_terminal());
        assert!(!OrderStatus::PartTraded.is_terminal());
        assert!(!OrderStatus::Cancelling.is_terminal());
        assert!(OrderStatus::AllTraded.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Rejected.is_terminal());
    }

    #[test]
    fn order_status_is_active() {
        assert!(OrderStatus::Submitting.is_active());
        assert!(OrderStatus::Cancelling.is_active());
        assert!(!OrderStatus::Rejected.is_active());
    }

    #[test]
    fn order_status_display_matches_serde() {
        for status in [
            OrderStatus::Submitting,
            OrderStatus::NotTraded,
            OrderStatus::PartTraded,
            OrderStatus::AllTraded,
            OrderStatus::Cancelling,
            OrderStatus::Cancelled,
            OrderStatus::Rejected,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }
}
