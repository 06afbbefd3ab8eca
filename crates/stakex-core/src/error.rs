// crates/stakex-core/src/error.rs

use thiserror::Error;

use crate::identity::AccountId;
use crate::traits::{Amount, Timestamp};

/// Failures reported by the asset ledger collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The debited account holds less than the requested amount.
    #[error("insufficient balance on {account}: needed {needed}, available {available}")]
    InsufficientBalance {
        account: AccountId,
        needed: Amount,
        available: Amount,
    },

    /// The spender has not been approved for the requested amount.
    #[error("insufficient allowance from {owner} to {spender}: needed {needed}, approved {approved}")]
    InsufficientAllowance {
        owner: AccountId,
        spender: AccountId,
        needed: Amount,
        approved: Amount,
    },

    /// Crediting the recipient would exceed the representable balance.
    #[error("balance overflow on {0}")]
    BalanceOverflow(AccountId),
}

/// Error type for every staking, reserve, and catalog operation.
///
/// Each error aborts the whole operation; no partial state is ever
/// committed before one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StakingError {
    /// Role or capability check failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Package (or other record) was never created.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The account has no active position in the package.
    #[error("No active position for {account} in package {package_id}")]
    NoPosition { account: AccountId, package_id: u64 },

    /// The package has been disabled and accepts no new stakes.
    #[error("Package {0} is offline")]
    PackageOffline(u64),

    /// Stake amount is under the package minimum.
    #[error("Stake amount {amount} is below the package minimum of {minimum}")]
    BelowMinimum { amount: Amount, minimum: Amount },

    /// Funds cannot be released before the unlock time.
    #[error("Still locked: unlocks at {unlock_at}, now {now}")]
    StillLocked { now: Timestamp, unlock_at: Timestamp },

    /// The pooled balance cannot cover the requested payout.
    #[error("Insufficient reserve: requested {requested} but only {available} available")]
    InsufficientReserve { requested: Amount, available: Amount },

    /// The asset ledger refused the transfer.
    #[error("Transfer failed: {0}")]
    TransferFailed(#[from] LedgerError),

    /// Rate is zero, not below 100%, or its decimal precision is out of range.
    #[error("Invalid rate: {rate} at decimal precision {decimal}")]
    InvalidRate { rate: u128, decimal: u8 },

    /// Payout recipient is the zero account.
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(AccountId),

    /// Malformed or zero amount input.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Malformed account address.
    #[error("Invalid account: {0}")]
    InvalidAccount(String),

    /// Checked arithmetic exceeded the `u128` range.
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_error_converts_to_transfer_failed() {
        let account = AccountId::derive("alice");
        let ledger_err = LedgerError::InsufficientBalance {
            account,
            needed: 10,
            available: 3,
        };
        let err: StakingError = ledger_err.clone().into();
        assert_eq!(err, StakingError::TransferFailed(ledger_err));
    }

    #[test]
    fn test_display_messages() {
        let err = StakingError::BelowMinimum {
            amount: 99,
            minimum: 100,
        };
        assert_eq!(
            err.to_string(),
            "Stake amount 99 is below the package minimum of 100"
        );
        assert_eq!(StakingError::PackageOffline(3).to_string(), "Package 3 is offline");
    }
}
