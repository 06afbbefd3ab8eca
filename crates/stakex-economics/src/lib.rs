// crates/stakex-economics/src/lib.rs
//
// stakex-economics: staking packages, profit accrual, the staking reserve,
// the time-locked fee reserve, and the staking engine.
//
// All monetary values are tracked in base units of the staked asset.
// 1 token = 10^18 units.

pub mod catalog;
pub mod clock;
pub mod ledger;
pub mod policy;
pub mod rate;
pub mod reserve;
pub mod staking;
pub mod token;
pub mod vault;

// Re-export key types for ergonomic access from downstream crates.
pub use catalog::{PackageCatalog, StakePackage};
pub use clock::{ManualClock, SystemClock};
pub use ledger::InMemoryLedger;
pub use policy::AdminPolicy;
pub use rate::{Rate, MAX_RATE_DECIMAL};
pub use reserve::{PayoutCapability, StakingReserve};
pub use staking::{StakePosition, StakingEngine};
pub use token::{TokenAmount, TOKEN_DECIMALS, UNITS_PER_TOKEN};
pub use vault::{TimeLockedReserve, DEFAULT_VAULT_LOCK_SECS};
