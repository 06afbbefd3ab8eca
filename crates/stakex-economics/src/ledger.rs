// crates/stakex-economics/src/ledger.rs
//
// In-memory fungible asset ledger with allowances.
//
// Stands in for the external token contract in simulations and tests.
// Every transfer validates first and mutates second, so a failed call
// leaves balances and allowances exactly as they were.

use std::collections::HashMap;

use stakex_core::{AccountId, Amount, Ledger, LedgerError};

#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    balances: HashMap<AccountId, Amount>,
    allowances: HashMap<(AccountId, AccountId), Amount>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `amount` new units on `account`. Saturates at `u128::MAX`.
    pub fn mint(&mut self, account: &AccountId, amount: Amount) {
        let balance = self.balances.entry(*account).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Sum of all balances.
    pub fn total_supply(&self) -> Amount {
        self.balances
            .values()
            .fold(0u128, |acc, b| acc.saturating_add(*b))
    }

    fn check_move(&self, from: &AccountId, to: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account: *from,
                needed: amount,
                available,
            });
        }
        if from != to && self.balance_of(to).checked_add(amount).is_none() {
            return Err(LedgerError::BalanceOverflow(*to));
        }
        Ok(())
    }

    fn apply_move(&mut self, from: &AccountId, to: &AccountId, amount: Amount) {
        if from == to {
            return;
        }
        *self.balances.entry(*from).or_insert(0) -= amount;
        *self.balances.entry(*to).or_insert(0) += amount;
    }
}

impl Ledger for InMemoryLedger {
    fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    fn approve(&mut self, owner: &AccountId, spender: &AccountId, amount: Amount) {
        self.allowances.insert((*owner, *spender), amount);
    }

    fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        self.check_move(from, to, amount)?;
        self.apply_move(from, to, amount);
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let approved = self.allowance(from, spender);
        if approved < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: *from,
                spender: *spender,
                needed: amount,
                approved,
            });
        }
        self.check_move(from, to, amount)?;
        self.apply_move(from, to, amount);
        self.allowances.insert((*from, *spender), approved - amount);
        Ok(())
    }
}
