//! Account record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::AccountId;

/// Latest balance snapshot for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Account identifier.
    pub account_id: AccountId,
    /// Net liquidation value.
    pub balance: Decimal,
    /// Initial margin requirement held against open positions.
    pub frozen: Decimal,
    /// Time of the observation.
    pub datetime: DateTime<Utc>,
}

impl AccountRecord {
    /// Balance not tied up as margin.
    #[must_use]
    pub fn available(&self) -> Decimal {
        self.balance - self.frozen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn available_subtracts_frozen() {
        let account = AccountRecord {
            account_id: AccountId::new("DU575569"),
            balance: dec!(100000),
            frozen: dec!(25000.50),
            datetime: Utc::now(),
        };
        assert_eq!(account.available(), dec!(74999.50));
    }
}
