// crates/stakex-economics/src/reserve.rs
//
// Staking reserve: the custodial pool that receives staked principal and
// funds every payout of principal plus profit.
//
// The pooled balance is the reserve account's balance on the asset ledger,
// so the ledger stays the single source of truth. Anyone may fund the pool.
// Only the holder of the current `PayoutCapability` (the bound staking
// engine) may pay out of it.

use uuid::Uuid;

use stakex_core::{AccountId, Amount, Ledger, StakingError, StakingEvent};

/// Proof that the holder is the engine currently bound to a reserve.
///
/// Issued by `StakingReserve::set_stake_address` and checked on every
/// payout. Rebinding the reserve revokes every previously issued token.
#[derive(Debug)]
pub struct PayoutCapability {
    id: Uuid,
    engine: AccountId,
}

impl PayoutCapability {
    /// The engine account this capability was issued to.
    pub fn engine(&self) -> &AccountId {
        &self.engine
    }
}

/// Custodian of the pooled staking balance.
#[derive(Debug, Clone)]
pub struct StakingReserve {
    /// Ledger account holding the pooled balance.
    account: AccountId,
    /// Administrator allowed to bind the paying engine.
    owner: AccountId,
    /// Currently bound engine and the id of the capability it holds.
    binding: Option<(Uuid, AccountId)>,
}

impl StakingReserve {
    /// Create a reserve with no bound engine.
    pub fn new(account: AccountId, owner: AccountId) -> Self {
        Self {
            account,
            owner,
            binding: None,
        }
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    /// Current pooled balance.
    pub fn balance(&self, ledger: &dyn Ledger) -> Amount {
        ledger.balance_of(&self.account)
    }

    /// Engine currently allowed to request payouts, if any.
    pub fn stake_address(&self) -> Option<&AccountId> {
        self.binding.as_ref().map(|(_, engine)| engine)
    }

    /// Move `amount` from `from` into the pool.
    ///
    /// # Errors
    /// Returns `StakingError::InvalidAmount` for a zero amount and
    /// `StakingError::TransferFailed` if `from` cannot cover it.
    pub fn fund(
        &self,
        ledger: &mut dyn Ledger,
        from: &AccountId,
        amount: Amount,
    ) -> Result<StakingEvent, StakingError> {
        if amount == 0 {
            return Err(StakingError::InvalidAmount(
                "reserve funding must be non-zero".to_string(),
            ));
        }
        ledger.transfer(from, &self.account, amount)?;
        Ok(StakingEvent::ReserveFunded {
            from: *from,
            amount,
        })
    }

    /// Bind `engine` as the only account allowed to request payouts.
    ///
    /// Rebinding is allowed and revokes the capability issued by the
    /// previous call.
    ///
    /// # Errors
    /// Returns `StakingError::Unauthorized` if `caller` is not the owner.
    pub fn set_stake_address(
        &mut self,
        caller: &AccountId,
        engine: AccountId,
    ) -> Result<PayoutCapability, StakingError> {
        if *caller != self.owner {
            return Err(StakingError::Unauthorized(format!(
                "{} does not own reserve {}",
                caller, self.account
            )));
        }
        let id = Uuid::now_v7();
        self.binding = Some((id, engine));
        Ok(PayoutCapability { id, engine })
    }

    /// Pay `amount` out of the pool to `to`.
    ///
    /// Either the full amount moves or nothing does.
    ///
    /// # Errors
    /// - `StakingError::Unauthorized` if `capability` is not the current one.
    /// - `StakingError::InsufficientReserve` if the pool holds less than `amount`.
    /// - `StakingError::TransferFailed` if the ledger refuses the transfer.
    pub fn payout(
        &self,
        ledger: &mut dyn Ledger,
        capability: &PayoutCapability,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), StakingError> {
        match &self.binding {
            Some((id, engine)) if *id == capability.id && *engine == capability.engine => {}
            _ => {
                return Err(StakingError::Unauthorized(format!(
                    "{} is not the staking engine bound to reserve {}",
                    capability.engine, self.account
                )))
            }
        }

        let available = self.balance(ledger);
        if amount > available {
            return Err(StakingError::InsufficientReserve {
                requested: amount,
                available,
            });
        }

        ledger.transfer(&self.account, to, amount)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::InMemoryLedger;
    use crate::token::UNITS_PER_TOKEN;
    use stakex_core::LedgerError;

    fn setup() -> (StakingReserve, InMemoryLedger, AccountId) {
        let owner = AccountId::derive("admin");
        let reserve = StakingReserve::new(AccountId::derive("reserve"), owner);
        let mut ledger = InMemoryLedger::new();
        ledger.mint(&owner, 1_000 * UNITS_PER_TOKEN);
        (reserve, ledger, owner)
    }

    #[test]
    fn test_new_reserve_is_empty_and_unbound() {
        let (reserve, ledger, _) = setup();
        assert_eq!(reserve.balance(&ledger), 0);
        assert!(reserve.stake_address().is_none());
    }

    #[test]
    fn test_fund() {
        let (reserve, mut ledger, owner) = setup();
        let event = reserve.fund(&mut ledger, &owner, 400 * UNITS_PER_TOKEN).unwrap();
        assert_eq!(reserve.balance(&ledger), 400 * UNITS_PER_TOKEN);
        assert_eq!(
            event,
            StakingEvent::ReserveFunded {
                from: owner,
                amount: 400 * UNITS_PER_TOKEN
            }
        );
    }

    #[test]
    fn test_fund_zero_and_overdrawn() {
        let (reserve, mut ledger, owner) = setup();
        assert!(matches!(
            reserve.fund(&mut ledger, &owner, 0),
            Err(StakingError::InvalidAmount(_))
        ));
        assert!(matches!(
            reserve.fund(&mut ledger, &owner, 1_001 * UNITS_PER_TOKEN),
            Err(StakingError::TransferFailed(_))
        ));
        assert_eq!(reserve.balance(&ledger), 0);
    }

    #[test]
    fn test_only_owner_binds_engine() {
        let (mut reserve, _, _) = setup();
        let mallory = AccountId::derive("mallory");
        assert!(matches!(
            reserve.set_stake_address(&mallory, mallory),
            Err(StakingError::Unauthorized(_))
        ));
        assert!(reserve.stake_address().is_none());
    }

    #[test]
    fn test_payout_success() {
        let (mut reserve, mut ledger, owner) = setup();
        let engine = AccountId::derive("engine");
        let staker = AccountId::derive("staker");
        let cap = reserve.set_stake_address(&owner, engine).unwrap();
        assert_eq!(cap.engine(), &engine);
        reserve.fund(&mut ledger, &owner, 100).unwrap();

        reserve.payout(&mut ledger, &cap, &staker, 60).unwrap();
        assert_eq!(reserve.balance(&ledger), 40);
        assert_eq!(ledger.balance_of(&staker), 60);
    }

    #[test]
    fn test_payout_exact_balance() {
        let (mut reserve, mut ledger, owner) = setup();
        let cap = reserve
            .set_stake_address(&owner, AccountId::derive("engine"))
            .unwrap();
        reserve.fund(&mut ledger, &owner, 100).unwrap();
        reserve
            .payout(&mut ledger, &cap, &AccountId::derive("staker"), 100)
            .unwrap();
        assert_eq!(reserve.balance(&ledger), 0);
    }

    #[test]
    fn test_payout_insufficient_reserve_is_atomic() {
        let (mut reserve, mut ledger, owner) = setup();
        let staker = AccountId::derive("staker");
        let cap = reserve
            .set_stake_address(&owner, AccountId::derive("engine"))
            .unwrap();
        reserve.fund(&mut ledger, &owner, 50).unwrap();

        let err = reserve.payout(&mut ledger, &cap, &staker, 51).unwrap_err();
        assert_eq!(
            err,
            StakingError::InsufficientReserve {
                requested: 51,
                available: 50
            }
        );
        assert_eq!(reserve.balance(&ledger), 50);
        assert_eq!(ledger.balance_of(&staker), 0);
    }

    #[test]
    fn test_payout_refused_by_ledger_keeps_balances() {
        let (mut reserve, mut ledger, owner) = setup();
        let holder = AccountId::derive("holder");
        let cap = reserve
            .set_stake_address(&owner, AccountId::derive("engine"))
            .unwrap();
        reserve.fund(&mut ledger, &owner, 100).unwrap();
        ledger.mint(&holder, u128::MAX);

        let err = reserve.payout(&mut ledger, &cap, &holder, 100).unwrap_err();
        assert_eq!(
            err,
            StakingError::TransferFailed(LedgerError::BalanceOverflow(holder))
        );
        assert_eq!(reserve.balance(&ledger), 100);
        assert_eq!(ledger.balance_of(&holder), u128::MAX);
    }

    #[test]
    fn test_rebinding_revokes_old_capability() {
        let (mut reserve, mut ledger, owner) = setup();
        let staker = AccountId::derive("staker");
        let old = reserve
            .set_stake_address(&owner, AccountId::derive("engine-v1"))
            .unwrap();
        let new = reserve
            .set_stake_address(&owner, AccountId::derive("engine-v2"))
            .unwrap();
        reserve.fund(&mut ledger, &owner, 100).unwrap();

        assert!(matches!(
            reserve.payout(&mut ledger, &old, &staker, 10),
            Err(StakingError::Unauthorized(_))
        ));
        reserve.payout(&mut ledger, &new, &staker, 10).unwrap();
        assert_eq!(reserve.stake_address(), Some(&AccountId::derive("engine-v2")));
    }

    #[test]
    fn test_capability_from_other_reserve_rejected() {
        let (mut reserve, mut ledger, owner) = setup();
        let mut other = StakingReserve::new(AccountId::derive("other-reserve"), owner);
        let engine = AccountId::derive("engine");
        let _cap = reserve.set_stake_address(&owner, engine).unwrap();
        let foreign = other.set_stake_address(&owner, engine).unwrap();
        reserve.fund(&mut ledger, &owner, 100).unwrap();

        assert!(matches!(
            reserve.payout(&mut ledger, &foreign, &owner, 10),
            Err(StakingError::Unauthorized(_))
        ));
    }
}
