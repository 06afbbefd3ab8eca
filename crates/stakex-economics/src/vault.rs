// crates/stakex-economics/src/vault.rs
//
// Time-locked fee reserve.
//
// Collects fee income (marketplace and token-sale fees are paid straight
// into its ledger account) and keeps it locked for a fixed period after
// creation. Afterwards only the owner may withdraw, and never to the zero
// account.

use serde::{Deserialize, Serialize};

use stakex_core::{AccountId, Amount, Ledger, StakingError, StakingEvent, Timestamp};

/// Default lock: 24 weeks.
pub const DEFAULT_VAULT_LOCK_SECS: u64 = 24 * 7 * 86_400;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeLockedReserve {
    account: AccountId,
    owner: AccountId,
    unlock_at: Timestamp,
}

impl TimeLockedReserve {
    /// Create a reserve that unlocks `lock_secs` after `created_at`.
    pub fn new(account: AccountId, owner: AccountId, created_at: Timestamp, lock_secs: u64) -> Self {
        Self {
            account,
            owner,
            unlock_at: created_at.saturating_add(lock_secs),
        }
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn unlock_at(&self) -> Timestamp {
        self.unlock_at
    }

    pub fn balance(&self, ledger: &dyn Ledger) -> Amount {
        ledger.balance_of(&self.account)
    }

    /// Withdraw `amount` to `recipient`.
    ///
    /// Checks run in order: owner, unlock time, recipient, balance.
    ///
    /// # Errors
    /// - `StakingError::Unauthorized` if `caller` is not the owner.
    /// - `StakingError::StillLocked` if `now` is before the unlock time.
    /// - `StakingError::InvalidRecipient` if `recipient` is the zero account.
    /// - `StakingError::InsufficientReserve` if the balance is below `amount`.
    pub fn withdraw_to(
        &self,
        ledger: &mut dyn Ledger,
        caller: &AccountId,
        recipient: &AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<StakingEvent, StakingError> {
        if *caller != self.owner {
            return Err(StakingError::Unauthorized(format!(
                "{} does not own fee reserve {}",
                caller, self.account
            )));
        }
        if now < self.unlock_at {
            return Err(StakingError::StillLocked {
                now,
                unlock_at: self.unlock_at,
            });
        }
        if recipient.is_zero() {
            return Err(StakingError::InvalidRecipient(*recipient));
        }
        let available = self.balance(ledger);
        if amount > available {
            return Err(StakingError::InsufficientReserve {
                requested: amount,
                available,
            });
        }

        ledger.transfer(&self.account, recipient, amount)?;
        Ok(StakingEvent::ReserveWithdrawn {
            to: *recipient,
            amount,
        })
    }
}
