// crates/stakex-core/src/events.rs
//
// Notifications emitted by the staking engine and the reserves.
//
// Every mutating operation that commits returns exactly one of these.
// Operations that fail return an error instead and emit nothing.

use serde::{Deserialize, Serialize};

use crate::identity::AccountId;
use crate::traits::Amount;

/// An observable side effect of a committed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StakingEvent {
    /// A package was created or disabled. Carries the full package record.
    PackageInfo {
        id: u64,
        rate: u128,
        rate_decimal: u8,
        min_staking: Amount,
        lock_duration: u64,
        is_offline: bool,
    },
    /// A stake or top-up was recorded.
    StakeUpdate {
        account: AccountId,
        package_id: u64,
        /// Principal after the deposit.
        new_amount: Amount,
        /// Profit banked on the position at this moment.
        banked_profit: Amount,
    },
    /// A position was released back to its owner.
    StakeReleased {
        account: AccountId,
        package_id: u64,
        principal_released: Amount,
        final_profit: Amount,
    },
    /// Someone moved funds into the staking reserve.
    ReserveFunded { from: AccountId, amount: Amount },
    /// The time-locked fee reserve paid out to a recipient.
    ReserveWithdrawn { to: AccountId, amount: Amount },
}

impl StakingEvent {
    /// Short event name for logs and tables.
    pub fn name(&self) -> &'static str {
        match self {
            StakingEvent::PackageInfo { .. } => "PackageInfo",
            StakingEvent::StakeUpdate { .. } => "StakeUpdate",
            StakingEvent::StakeReleased { .. } => "StakeReleased",
            StakingEvent::ReserveFunded { .. } => "ReserveFunded",
            StakingEvent::ReserveWithdrawn { .. } => "ReserveWithdrawn",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_is_tagged() {
        let event = StakingEvent::StakeReleased {
            account: AccountId::derive("alice"),
            package_id: 1,
            principal_released: 200,
            final_profit: 25,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "stake_released");
        assert_eq!(value["package_id"], 1);
        assert_eq!(event.name(), "StakeReleased");
    }
}
