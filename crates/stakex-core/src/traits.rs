// crates/stakex-core/src/traits.rs

use crate::error::LedgerError;
use crate::identity::AccountId;

/// Amount in the asset's smallest unit.
pub type Amount = u128;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Fungible asset ledger used by the staking engine as a transfer capability.
///
/// Implementations must be all-or-nothing: a failed transfer leaves every
/// balance and allowance untouched.
pub trait Ledger: Send + Sync {
    /// Current balance of `account`. Unknown accounts hold zero.
    fn balance_of(&self, account: &AccountId) -> Amount;

    /// Remaining amount `spender` may move out of `owner`.
    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount;

    /// Set the amount `spender` may move out of `owner`.
    fn approve(&mut self, owner: &AccountId, spender: &AccountId, amount: Amount);

    /// Move `amount` from `from` to `to` on `from`'s own authority.
    fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: Amount)
        -> Result<(), LedgerError>;

    /// Move `amount` from `from` to `to` using `spender`'s allowance.
    fn transfer_from(
        &mut self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError>;
}

/// Source of the current time, in seconds.
///
/// Wall-clock in production, manually advanced in tests and simulations.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}
