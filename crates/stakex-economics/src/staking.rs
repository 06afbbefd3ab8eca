// crates/stakex-economics/src/staking.rs
//
// Staking engine: packages, positions, profit accrual, and release.
//
// Each (account, package) pair holds at most one position:
//
//   Empty --stake--> Active --stake (top-up)--> Active --unstake--> Empty
//
// A top-up banks the profit accrued so far into `total_profit`, adds the
// new principal, and restarts the accrual window and lock. Unstaking is
// allowed once the lock has run out; it banks the final period and has the
// staking reserve pay principal plus all banked profit back to the owner.
//
// Every operation validates and stages its new state, performs the single
// ledger call it needs, and only then commits. A failing ledger call or
// reserve payout therefore leaves positions, reserve, and balances as they
// were.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use stakex_core::{AccountId, Amount, Clock, Ledger, StakingError, StakingEvent, Timestamp};

use crate::catalog::{PackageCatalog, StakePackage};
use crate::policy::AdminPolicy;
use crate::reserve::{PayoutCapability, StakingReserve};

/// One account's stake in one package.
///
/// A released position and one that never existed are the same value: all
/// amounts zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePosition {
    /// Current principal in base units.
    pub amount: Amount,
    /// Profit banked from earlier accrual periods, not yet paid.
    pub total_profit: Amount,
    /// Start of the current accrual period.
    pub start_time: Timestamp,
    /// Earliest time the position may be unstaked.
    pub time_point: Timestamp,
}

impl StakePosition {
    pub fn is_active(&self) -> bool {
        self.amount > 0
    }

    pub fn is_empty(&self) -> bool {
        self.amount == 0 && self.total_profit == 0
    }
}

/// The staking accounting engine.
///
/// Owns the package catalog, every position, and the staking reserve, and
/// reaches the asset ledger and the clock through the collaborator traits.
/// All mutating calls take the acting account explicitly.
pub struct StakingEngine<L: Ledger, C: Clock> {
    /// The engine's own ledger identity; stakers approve it as spender.
    account: AccountId,
    policy: AdminPolicy,
    catalog: PackageCatalog,
    positions: HashMap<(AccountId, u64), StakePosition>,
    reserve: StakingReserve,
    capability: PayoutCapability,
    ledger: L,
    clock: C,
}

impl<L: Ledger, C: Clock> StakingEngine<L, C> {
    /// Create an engine and bind it to `reserve` as its paying engine.
    ///
    /// # Errors
    /// Returns `StakingError::Unauthorized` if `admin` does not own the reserve.
    pub fn new(
        account: AccountId,
        admin: AccountId,
        mut reserve: StakingReserve,
        ledger: L,
        clock: C,
    ) -> Result<Self, StakingError> {
        let capability = reserve.set_stake_address(&admin, account)?;
        Ok(Self {
            account,
            policy: AdminPolicy::new(admin),
            catalog: PackageCatalog::new(),
            positions: HashMap::new(),
            reserve,
            capability,
            ledger,
            clock,
        })
    }

    // -----------------------------------------------------------------
    // Administration
    // -----------------------------------------------------------------

    /// Create a staking package. Administrator only.
    ///
    /// # Errors
    /// `Unauthorized` for non-administrators, `InvalidRate` unless
    /// `0 < rate < 10^(rate_decimal + 2)`.
    pub fn add_package(
        &mut self,
        caller: &AccountId,
        rate: u128,
        rate_decimal: u8,
        min_staking: Amount,
        lock_duration: u64,
    ) -> Result<StakingEvent, StakingError> {
        self.policy.ensure_admin(caller)?;
        let package = self
            .catalog
            .add(rate, rate_decimal, min_staking, lock_duration)?;
        Ok(package.info_event())
    }

    /// Switch a package offline. Existing positions are unaffected.
    ///
    /// # Errors
    /// `Unauthorized`, `NotFound` for unknown ids, `PackageOffline` if the
    /// package is already offline.
    pub fn disable_package(
        &mut self,
        caller: &AccountId,
        package_id: u64,
    ) -> Result<StakingEvent, StakingError> {
        self.policy.ensure_admin(caller)?;
        let package = self.catalog.disable(package_id)?;
        Ok(package.info_event())
    }

    pub fn grant_admin(&mut self, caller: &AccountId, account: AccountId) -> Result<(), StakingError> {
        self.policy.grant(caller, account)
    }

    pub fn revoke_admin(&mut self, caller: &AccountId, account: &AccountId) -> Result<(), StakingError> {
        self.policy.revoke(caller, account)
    }

    /// Re-issue this engine's payout capability, revoking the old one.
    ///
    /// # Errors
    /// `Unauthorized` unless `caller` owns the reserve.
    pub fn rebind_reserve(&mut self, caller: &AccountId) -> Result<(), StakingError> {
        self.capability = self.reserve.set_stake_address(caller, self.account)?;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Staking
    // -----------------------------------------------------------------

    /// Deposit `amount` into `package_id` on behalf of `account`.
    ///
    /// Pulls the funds into the staking reserve through the engine's
    /// allowance, so `account` must have approved the engine beforehand.
    /// If the account already has an active position, the profit accrued
    /// since its last reset is banked first. In both cases the accrual
    /// window and the lock restart now.
    ///
    /// # Errors
    /// - `InvalidAmount` for a zero deposit.
    /// - `NotFound` if the package does not exist.
    /// - `PackageOffline` if the package was disabled.
    /// - `BelowMinimum` if `amount` is below the package minimum.
    /// - `TransferFailed` if the ledger refuses the deposit.
    /// - `Overflow` if an amount would exceed `u128`.
    pub fn stake(
        &mut self,
        account: &AccountId,
        amount: Amount,
        package_id: u64,
    ) -> Result<StakingEvent, StakingError> {
        if amount == 0 {
            return Err(StakingError::InvalidAmount(
                "stake amount must be non-zero".to_string(),
            ));
        }
        let package = self.catalog.get(package_id)?.clone();
        if package.is_offline {
            return Err(StakingError::PackageOffline(package_id));
        }
        if amount < package.min_staking {
            return Err(StakingError::BelowMinimum {
                amount,
                minimum: package.min_staking,
            });
        }

        let now = self.clock.now();
        let mut position = self.position(account, package_id);
        if position.is_active() {
            let profit = accrued(&package, &position, now)?;
            position.total_profit = position
                .total_profit
                .checked_add(profit)
                .ok_or_else(|| StakingError::Overflow("banked profit".to_string()))?;
            position.amount = position
                .amount
                .checked_add(amount)
                .ok_or_else(|| StakingError::Overflow("stake principal".to_string()))?;
        } else {
            position.amount = amount;
        }
        position.start_time = now;
        position.time_point = now.saturating_add(package.lock_duration);

        self.ledger
            .transfer_from(&self.account, account, self.reserve.account(), amount)?;
        self.positions.insert((*account, package_id), position);

        Ok(StakingEvent::StakeUpdate {
            account: *account,
            package_id,
            new_amount: position.amount,
            banked_profit: position.total_profit,
        })
    }

    /// Release `account`'s position in `package_id`: principal plus all
    /// profit, paid by the staking reserve.
    ///
    /// # Errors
    /// - `NotFound` if the package does not exist.
    /// - `NoPosition` if the account has no active position in it.
    /// - `StillLocked` before the position's unlock time.
    /// - `InsufficientReserve` if the reserve cannot cover the payout; the
    ///   position, the reserve, and the account balance stay unchanged.
    /// - `TransferFailed` if the ledger refuses the payout.
    pub fn unstake(
        &mut self,
        account: &AccountId,
        package_id: u64,
    ) -> Result<StakingEvent, StakingError> {
        let package = self.catalog.get(package_id)?.clone();
        let position = self.position(account, package_id);
        if !position.is_active() {
            return Err(StakingError::NoPosition {
                account: *account,
                package_id,
            });
        }

        let now = self.clock.now();
        if now < position.time_point {
            return Err(StakingError::StillLocked {
                now,
                unlock_at: position.time_point,
            });
        }

        let final_profit = accrued(&package, &position, now)?
            .checked_add(position.total_profit)
            .ok_or_else(|| StakingError::Overflow("final profit".to_string()))?;
        let payout = position
            .amount
            .checked_add(final_profit)
            .ok_or_else(|| StakingError::Overflow("payout".to_string()))?;

        self.reserve
            .payout(&mut self.ledger, &self.capability, account, payout)?;
        self.positions.insert(
            (*account, package_id),
            StakePosition {
                amount: 0,
                total_profit: 0,
                ..position
            },
        );

        Ok(StakingEvent::StakeReleased {
            account: *account,
            package_id,
            principal_released: position.amount,
            final_profit,
        })
    }

    // -----------------------------------------------------------------
    // Reserve and ledger access
    // -----------------------------------------------------------------

    /// Move `amount` from `from` into the staking reserve.
    pub fn fund_reserve(&mut self, from: &AccountId, amount: Amount) -> Result<StakingEvent, StakingError> {
        self.reserve.fund(&mut self.ledger, from, amount)
    }

    /// Let the engine pull up to `amount` from `owner` for future stakes.
    pub fn approve(&mut self, owner: &AccountId, amount: Amount) {
        self.ledger.approve(owner, &self.account, amount);
    }

    pub fn reserve_balance(&self) -> Amount {
        self.reserve.balance(&self.ledger)
    }

    pub fn reserve(&self) -> &StakingReserve {
        &self.reserve
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn policy(&self) -> &AdminPolicy {
        &self.policy
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    pub fn package(&self, package_id: u64) -> Result<&StakePackage, StakingError> {
        self.catalog.get(package_id)
    }

    pub fn packages(&self) -> impl Iterator<Item = &StakePackage> {
        self.catalog.iter()
    }

    /// Position of `account` in `package_id`; zeroed if none was ever opened.
    pub fn position(&self, account: &AccountId, package_id: u64) -> StakePosition {
        self.positions
            .get(&(*account, package_id))
            .copied()
            .unwrap_or_default()
    }

    /// All non-empty positions, in no particular order.
    pub fn positions(&self) -> impl Iterator<Item = (&AccountId, u64, &StakePosition)> {
        self.positions
            .iter()
            .filter(|(_, p)| !p.is_empty())
            .map(|((account, id), p)| (account, *id, p))
    }

    /// Profit accrued in the current period, not yet banked.
    ///
    /// # Errors
    /// `NotFound` if the package does not exist.
    pub fn pending_profit(&self, account: &AccountId, package_id: u64) -> Result<Amount, StakingError> {
        let package = self.catalog.get(package_id)?;
        let position = self.position(account, package_id);
        if !position.is_active() {
            return Ok(0);
        }
        accrued(package, &position, self.clock.now())
    }
}

/// Profit for the period from `position.start_time` to `now`, capped at the
/// package's lock duration.
fn accrued(package: &StakePackage, position: &StakePosition, now: Timestamp) -> Result<Amount, StakingError> {
    let elapsed = now.saturating_sub(position.start_time);
    package
        .rate
        .accrue(position.amount, elapsed, package.lock_duration)
}
