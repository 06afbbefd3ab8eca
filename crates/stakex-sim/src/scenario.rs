// crates/stakex-sim/src/scenario.rs
//
// Scenario runner: builds the ledger, reserves, and engine from a
// `ScenarioConfig`, then replays its steps against the shared engine.
//
// A step that fails is recorded as reverted with its error message and the
// run continues, so a scenario can demonstrate refusals (locked stakes,
// under-funded reserve) alongside successful flows.

use std::collections::BTreeMap;

use serde::Serialize;

use stakex_core::{AccountId, Amount, Clock, Ledger, StakingError, StakingEvent, Timestamp};
use stakex_economics::{
    InMemoryLedger, ManualClock, StakePosition, StakingEngine, StakingReserve, TimeLockedReserve,
    TokenAmount,
};

use crate::config::{span_secs, ScenarioConfig, Step};
use crate::shared::SharedStaking;

/// Broadcast buffer per subscriber.
const EVENT_CAPACITY: usize = 256;

/// Label-to-address resolution for scenario accounts.
#[derive(Debug, Clone)]
pub struct AccountBook {
    labels: BTreeMap<AccountId, String>,
    reserve: AccountId,
    vault: AccountId,
    engine: AccountId,
}

impl AccountBook {
    fn new() -> Self {
        let mut book = Self {
            labels: BTreeMap::new(),
            reserve: AccountId::derive("stakex/staking-reserve"),
            vault: AccountId::derive("stakex/fee-reserve"),
            engine: AccountId::derive("stakex/engine"),
        };
        book.labels.insert(book.reserve, "reserve".to_string());
        book.labels.insert(book.vault, "vault".to_string());
        book.labels.insert(book.engine, "engine".to_string());
        book
    }

    /// Resolve a label or hex address, remembering labels for reports.
    pub fn resolve(&mut self, label: &str) -> Result<AccountId, StakingError> {
        let id = match label {
            "reserve" => self.reserve,
            "vault" => self.vault,
            "engine" => self.engine,
            hex if hex.starts_with("0x") => hex.parse()?,
            name => AccountId::derive(name),
        };
        self.labels.entry(id).or_insert_with(|| label.to_string());
        Ok(id)
    }

    /// True for the staking reserve, the fee reserve, and the engine. Their
    /// balances only move through the guarded component operations.
    pub fn is_component(&self, id: &AccountId) -> bool {
        *id == self.reserve || *id == self.vault || *id == self.engine
    }

    /// Report name for an address: its label if known, otherwise hex.
    pub fn name(&self, id: &AccountId) -> String {
        self.labels
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    /// Every known account other than the component accounts.
    pub fn holders(&self) -> impl Iterator<Item = (&AccountId, &String)> {
        self.labels
            .iter()
            .filter(|(id, _)| **id != self.engine)
    }
}

/// Result of replaying one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub action: String,
    /// Simulated time when the step ran.
    pub at: Timestamp,
    pub applied: bool,
    /// Event summary on success, error message on revert.
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<StakingEvent>,
}

/// Final balance of one account.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceSnapshot {
    pub account: String,
    pub balance: String,
}

/// Final state of one non-empty position.
#[derive(Debug, Clone, Serialize)]
pub struct PositionSnapshot {
    pub account: String,
    pub package_id: u64,
    pub amount: String,
    pub total_profit: String,
    pub pending_profit: String,
    pub start_time: Timestamp,
    pub time_point: Timestamp,
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub token_symbol: String,
    pub outcomes: Vec<StepOutcome>,
    pub balances: Vec<BalanceSnapshot>,
    pub positions: Vec<PositionSnapshot>,
    pub reserve_balance: String,
    pub vault_balance: String,
}

impl ScenarioReport {
    pub fn reverted(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.applied).count()
    }
}

/// A live simulation built from a scenario.
pub struct Simulation {
    shared: SharedStaking<InMemoryLedger, ManualClock>,
    clock: ManualClock,
    vault: TimeLockedReserve,
    accounts: AccountBook,
    admin: AccountId,
    token_symbol: String,
}

impl Simulation {
    /// Mint initial balances and wire the engine to its reserve.
    pub fn from_config(config: &ScenarioConfig) -> Result<Self, StakingError> {
        let mut accounts = AccountBook::new();
        let admin = accounts.resolve(&config.admin)?;
        let clock = ManualClock::new(config.start_time);

        let mut ledger = InMemoryLedger::new();
        for entry in &config.balances {
            let account = accounts.resolve(&entry.account)?;
            let amount: TokenAmount = entry.amount.parse()?;
            ledger.mint(&account, amount.units);
        }

        let reserve = StakingReserve::new(accounts.reserve, admin);
        let engine = StakingEngine::new(accounts.engine, admin, reserve, ledger, clock.clone())?;
        let vault = TimeLockedReserve::new(
            accounts.vault,
            admin,
            config.start_time,
            config.vault_lock_secs,
        );

        Ok(Self {
            shared: SharedStaking::new(engine, EVENT_CAPACITY),
            clock,
            vault,
            accounts,
            admin,
            token_symbol: config.token_symbol.clone(),
        })
    }

    pub fn shared(&self) -> &SharedStaking<InMemoryLedger, ManualClock> {
        &self.shared
    }

    /// Replay `steps` in order and collect the final report.
    pub async fn run(&mut self, steps: &[Step]) -> ScenarioReport {
        let mut outcomes = Vec::with_capacity(steps.len());
        for (i, step) in steps.iter().enumerate() {
            let index = i + 1;
            let at = self.clock.now();
            let outcome = match self.apply(step).await {
                Ok((detail, event)) => {
                    tracing::info!("Step {} {}: {}", index, step.name(), detail);
                    StepOutcome {
                        index,
                        action: step.name().to_string(),
                        at,
                        applied: true,
                        detail,
                        event,
                    }
                }
                Err(e) => {
                    tracing::warn!("Step {} {} reverted: {}", index, step.name(), e);
                    StepOutcome {
                        index,
                        action: step.name().to_string(),
                        at,
                        applied: false,
                        detail: e.to_string(),
                        event: None,
                    }
                }
            };
            outcomes.push(outcome);
        }
        self.report(outcomes).await
    }

    async fn apply(&mut self, step: &Step) -> Result<(String, Option<StakingEvent>), StakingError> {
        match step {
            Step::AddPackage {
                caller,
                rate,
                rate_decimal,
                min_staking,
                lock_days,
                lock_secs,
            } => {
                let caller = self.caller(caller.as_deref())?;
                let min: TokenAmount = min_staking.parse()?;
                let event = self
                    .shared
                    .add_package(caller, *rate as u128, *rate_decimal, min.units, span_secs(*lock_days, *lock_secs))
                    .await?;
                Ok((self.describe(&event), Some(event)))
            }
            Step::DisablePackage { caller, package } => {
                let caller = self.caller(caller.as_deref())?;
                let event = self.shared.disable_package(caller, *package).await?;
                Ok((self.describe(&event), Some(event)))
            }
            Step::Fund { from, amount } => {
                let from = self.accounts.resolve(from)?;
                let amount: TokenAmount = amount.parse()?;
                let event = self.shared.fund_reserve(from, amount.units).await?;
                Ok((self.describe(&event), Some(event)))
            }
            Step::Approve { account, amount } => {
                let owner = self.accounts.resolve(account)?;
                let amount: TokenAmount = amount.parse()?;
                self.shared.approve(owner, amount.units).await;
                Ok((
                    format!("{} approved {} {}", account, amount, self.token_symbol),
                    None,
                ))
            }
            Step::Stake {
                account,
                package,
                amount,
            } => {
                let account = self.accounts.resolve(account)?;
                let amount: TokenAmount = amount.parse()?;
                let event = self.shared.stake(account, amount.units, *package).await?;
                Ok((self.describe(&event), Some(event)))
            }
            Step::Unstake { account, package } => {
                let account = self.accounts.resolve(account)?;
                let event = self.shared.unstake(account, *package).await?;
                Ok((self.describe(&event), Some(event)))
            }
            Step::Transfer { from, to, amount } => {
                let from_id = self.accounts.resolve(from)?;
                let to_id = self.accounts.resolve(to)?;
                if self.accounts.is_component(&from_id) {
                    return Err(StakingError::Unauthorized(format!(
                        "plain transfers out of {} are not allowed",
                        from
                    )));
                }
                let amount: TokenAmount = amount.parse()?;
                self.shared
                    .write(|e| e.ledger_mut().transfer(&from_id, &to_id, amount.units))
                    .await?;
                Ok((
                    format!("{} -> {}: {} {}", from, to, amount, self.token_symbol),
                    None,
                ))
            }
            Step::VaultWithdraw { caller, to, amount } => {
                let caller = self.caller(caller.as_deref())?;
                let recipient = self.accounts.resolve(to)?;
                let amount: TokenAmount = amount.parse()?;
                let vault = self.vault.clone();
                let event = self
                    .shared
                    .transact(|e| {
                        let now = e.clock().now();
                        vault.withdraw_to(e.ledger_mut(), &caller, &recipient, amount.units, now)
                    })
                    .await?;
                Ok((self.describe(&event), Some(event)))
            }
            Step::Advance { days, secs } => {
                let span = span_secs(*days, *secs);
                self.clock.advance(span);
                Ok((format!("clock +{}s -> {}", span, self.clock.now()), None))
            }
        }
    }

    fn caller(&mut self, label: Option<&str>) -> Result<AccountId, StakingError> {
        match label {
            Some(label) => self.accounts.resolve(label),
            None => Ok(self.admin),
        }
    }

    fn tokens(&self, units: Amount) -> String {
        format!("{} {}", TokenAmount::from_units(units), self.token_symbol)
    }

    /// One-line, human-readable summary of a notification.
    pub fn describe(&self, event: &StakingEvent) -> String {
        match event {
            StakingEvent::PackageInfo {
                id,
                rate,
                rate_decimal,
                min_staking,
                lock_duration,
                is_offline,
            } => format!(
                "package {}: rate {}/10^{}, min {}, lock {}s{}",
                id,
                rate,
                *rate_decimal as u32 + 2,
                self.tokens(*min_staking),
                lock_duration,
                if *is_offline { ", offline" } else { "" }
            ),
            StakingEvent::StakeUpdate {
                account,
                package_id,
                new_amount,
                banked_profit,
            } => format!(
                "{} staked in package {}: amount {}, banked profit {}",
                self.accounts.name(account),
                package_id,
                self.tokens(*new_amount),
                self.tokens(*banked_profit)
            ),
            StakingEvent::StakeReleased {
                account,
                package_id,
                principal_released,
                final_profit,
            } => format!(
                "{} released package {}: principal {}, profit {}",
                self.accounts.name(account),
                package_id,
                self.tokens(*principal_released),
                self.tokens(*final_profit)
            ),
            StakingEvent::ReserveFunded { from, amount } => format!(
                "{} funded the reserve with {}",
                self.accounts.name(from),
                self.tokens(*amount)
            ),
            StakingEvent::ReserveWithdrawn { to, amount } => format!(
                "fee reserve paid {} to {}",
                self.tokens(*amount),
                self.accounts.name(to)
            ),
        }
    }

    async fn report(&self, outcomes: Vec<StepOutcome>) -> ScenarioReport {
        let accounts = &self.accounts;
        let vault = &self.vault;
        let (balances, positions, reserve_balance, vault_balance) = self
            .shared
            .read(|engine| {
                let balances = accounts
                    .holders()
                    .map(|(id, label)| BalanceSnapshot {
                        account: label.clone(),
                        balance: TokenAmount::from_units(engine.ledger().balance_of(id)).to_string(),
                    })
                    .collect::<Vec<_>>();

                let mut positions = engine
                    .positions()
                    .map(|(id, package_id, p)| position_snapshot(accounts, engine, id, package_id, p))
                    .collect::<Vec<_>>();
                positions.sort_by(|a, b| (&a.account, a.package_id).cmp(&(&b.account, b.package_id)));

                (
                    balances,
                    positions,
                    engine.reserve_balance(),
                    vault.balance(engine.ledger()),
                )
            })
            .await;

        ScenarioReport {
            token_symbol: self.token_symbol.clone(),
            outcomes,
            balances,
            positions,
            reserve_balance: TokenAmount::from_units(reserve_balance).to_string(),
            vault_balance: TokenAmount::from_units(vault_balance).to_string(),
        }
    }
}

fn position_snapshot(
    accounts: &AccountBook,
    engine: &StakingEngine<InMemoryLedger, ManualClock>,
    id: &AccountId,
    package_id: u64,
    position: &StakePosition,
) -> PositionSnapshot {
    let pending = engine.pending_profit(id, package_id).unwrap_or(0);
    PositionSnapshot {
        account: accounts.name(id),
        package_id,
        amount: TokenAmount::from_units(position.amount).to_string(),
        total_profit: TokenAmount::from_units(position.total_profit).to_string(),
        pending_profit: TokenAmount::from_units(pending).to_string(),
        start_time: position.start_time,
        time_point: position.time_point,
    }
}
