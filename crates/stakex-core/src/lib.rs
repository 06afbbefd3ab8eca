// crates/stakex-core/src/lib.rs
//
// stakex-core: Core types, errors, and collaborator traits for the Stakex
// staking ledger.
//
// This is the leaf crate that the rest of the workspace depends on. It
// defines account identity, the protocol-wide error type, the external
// collaborator interfaces (asset ledger, clock), and the notifications the
// staking engine emits.

pub mod error;
pub mod events;
pub mod identity;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use stakex_core::AccountId;`

pub use error::{LedgerError, StakingError};
pub use events::StakingEvent;
pub use identity::AccountId;
pub use traits::{Amount, Clock, Ledger, Timestamp};
