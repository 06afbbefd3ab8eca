// crates/stakex-sim/src/shared.rs
//
// SharedStaking: the staking engine behind a single-writer lock.
//
// Every logical operation takes the engine mutex for its full duration, so
// operations on the same position, and payouts against the shared reserve,
// never interleave. Committed notifications are published on a broadcast
// channel after the operation returns successfully.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};

use stakex_core::{AccountId, Amount, Clock, Ledger, StakingError, StakingEvent};
use stakex_economics::StakingEngine;

use crate::events::EventRecord;

/// Cloneable, task-safe handle to one staking engine.
pub struct SharedStaking<L: Ledger, C: Clock> {
    engine: Arc<Mutex<StakingEngine<L, C>>>,
    events: broadcast::Sender<EventRecord>,
    seq: Arc<AtomicU64>,
}

impl<L: Ledger, C: Clock> Clone for SharedStaking<L, C> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            events: self.events.clone(),
            seq: self.seq.clone(),
        }
    }
}

impl<L: Ledger, C: Clock> SharedStaking<L, C> {
    /// Wrap `engine`, buffering up to `capacity` unread notifications per
    /// subscriber.
    pub fn new(engine: StakingEngine<L, C>, capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        Self {
            engine: Arc::new(Mutex::new(engine)),
            events,
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.events.subscribe()
    }

    /// Run one operation under the engine lock and publish its notification
    /// if it commits.
    pub async fn transact<F>(&self, op: F) -> Result<StakingEvent, StakingError>
    where
        F: FnOnce(&mut StakingEngine<L, C>) -> Result<StakingEvent, StakingError>,
    {
        let mut engine = self.engine.lock().await;
        let event = op(&mut engine)?;
        let record = EventRecord {
            seq: self.seq.fetch_add(1, Ordering::SeqCst) + 1,
            at: engine.clock().now(),
            event: event.clone(),
        };
        // No subscribers is fine; the caller still gets the event.
        let _ = self.events.send(record);
        Ok(event)
    }

    /// Read engine state under the lock.
    pub async fn read<R>(&self, f: impl FnOnce(&StakingEngine<L, C>) -> R) -> R {
        let engine = self.engine.lock().await;
        f(&engine)
    }

    /// Mutate engine state under the lock without publishing anything.
    pub async fn write<R>(&self, f: impl FnOnce(&mut StakingEngine<L, C>) -> R) -> R {
        let mut engine = self.engine.lock().await;
        f(&mut engine)
    }

    pub async fn add_package(
        &self,
        caller: AccountId,
        rate: u128,
        rate_decimal: u8,
        min_staking: Amount,
        lock_duration: u64,
    ) -> Result<StakingEvent, StakingError> {
        self.transact(|e| e.add_package(&caller, rate, rate_decimal, min_staking, lock_duration))
            .await
    }

    pub async fn disable_package(
        &self,
        caller: AccountId,
        package_id: u64,
    ) -> Result<StakingEvent, StakingError> {
        self.transact(|e| e.disable_package(&caller, package_id)).await
    }

    pub async fn stake(
        &self,
        account: AccountId,
        amount: Amount,
        package_id: u64,
    ) -> Result<StakingEvent, StakingError> {
        self.transact(|e| e.stake(&account, amount, package_id)).await
    }

    pub async fn unstake(&self, account: AccountId, package_id: u64) -> Result<StakingEvent, StakingError> {
        self.transact(|e| e.unstake(&account, package_id)).await
    }

    pub async fn fund_reserve(&self, from: AccountId, amount: Amount) -> Result<StakingEvent, StakingError> {
        self.transact(|e| e.fund_reserve(&from, amount)).await
    }

    pub async fn approve(&self, owner: AccountId, amount: Amount) {
        self.write(|e| e.approve(&owner, amount)).await
    }

    pub async fn reserve_balance(&self) -> Amount {
        self.read(|e| e.reserve_balance()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakex_economics::{InMemoryLedger, ManualClock, StakingReserve, UNITS_PER_TOKEN};

    const TOKEN: Amount = UNITS_PER_TOKEN;
    const DAY: u64 = 86_400;

    fn setup(reserve_funding: Amount, stakers: &[AccountId]) -> (SharedStaking<InMemoryLedger, ManualClock>, ManualClock, AccountId) {
        let admin = AccountId::derive("admin");
        let clock = ManualClock::new(1_700_000_000);
        let mut ledger = InMemoryLedger::new();
        ledger.mint(&admin, 1_000_000 * TOKEN);
        for staker in stakers {
            ledger.mint(staker, 100 * TOKEN);
        }
        let reserve = StakingReserve::new(AccountId::derive("staking-reserve"), admin);
        let mut engine = StakingEngine::new(
            AccountId::derive("stakingx"),
            admin,
            reserve,
            ledger,
            clock.clone(),
        )
        .unwrap();
        engine.add_package(&admin, 10, 0, 100 * TOKEN, 360 * DAY).unwrap();
        if reserve_funding > 0 {
            engine.fund_reserve(&admin, reserve_funding).unwrap();
        }
        for staker in stakers {
            engine.approve(staker, 100 * TOKEN);
        }
        (SharedStaking::new(engine, 64), clock, admin)
    }

    #[tokio::test]
    async fn test_committed_operations_are_broadcast_in_order() {
        let alice = AccountId::derive("alice");
        let (shared, clock, _) = setup(1_000 * TOKEN, &[alice]);
        let mut rx = shared.subscribe();

        shared.stake(alice, 100 * TOKEN, 1).await.unwrap();
        clock.advance(360 * DAY);
        shared.unstake(alice, 1).await.unwrap();

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.seq, 1);
        assert_eq!(first.event.name(), "StakeUpdate");
        assert_eq!(second.seq, 2);
        assert_eq!(second.event.name(), "StakeReleased");
        assert_eq!(second.at, 1_700_000_000 + 360 * DAY);
    }

    #[tokio::test]
    async fn test_failed_operations_are_not_broadcast() {
        let alice = AccountId::derive("alice");
        let (shared, _, _) = setup(1_000 * TOKEN, &[alice]);
        let mut rx = shared.subscribe();

        assert!(shared.unstake(alice, 1).await.is_err());
        assert!(shared.stake(alice, 100 * TOKEN, 7).await.is_err());
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_unstakes_never_overdraw_reserve() {
        let stakers: Vec<AccountId> = (0..8)
            .map(|i| AccountId::derive(&format!("staker-{}", i)))
            .collect();
        // After deposits the reserve holds 825; each release pays 110.
        let (shared, clock, _) = setup(25 * TOKEN, &stakers);
        for staker in &stakers {
            shared.stake(*staker, 100 * TOKEN, 1).await.unwrap();
        }
        clock.advance(360 * DAY);

        let mut handles = Vec::new();
        for staker in stakers.clone() {
            let shared = shared.clone();
            handles.push(tokio::spawn(async move { shared.unstake(staker, 1).await }));
        }

        let mut released = 0;
        let mut refused = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => released += 1,
                Err(StakingError::InsufficientReserve { .. }) => refused += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        // 825 / 110 = 7 releases fit
        assert_eq!(released, 7);
        assert_eq!(refused, 1);
        assert_eq!(shared.reserve_balance().await, 825 * TOKEN - 7 * 110 * TOKEN);
    }

    #[tokio::test]
    async fn test_admin_operations_through_handle() {
        let (shared, _, admin) = setup(0, &[]);
        let event = shared
            .add_package(admin, 20, 0, TOKEN, 30 * DAY)
            .await
            .unwrap();
        assert!(matches!(event, StakingEvent::PackageInfo { id: 2, .. }));
        shared.disable_package(admin, 2).await.unwrap();
        assert!(shared.read(|e| e.package(2).map(|p| p.is_offline)).await.unwrap());
        assert!(shared.fund_reserve(admin, TOKEN).await.is_ok());
        assert_eq!(shared.reserve_balance().await, TOKEN);
    }
}
