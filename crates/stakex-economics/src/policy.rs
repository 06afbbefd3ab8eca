// crates/stakex-economics/src/policy.rs
//
// Administrator role checks.
//
// The engine holds an `AdminPolicy` and asks it before every privileged
// operation (package creation, package disabling, reserve binding).

use std::collections::BTreeSet;

use stakex_core::{AccountId, StakingError};

/// Set of accounts holding the administrator role.
#[derive(Debug, Clone)]
pub struct AdminPolicy {
    admins: BTreeSet<AccountId>,
}

impl AdminPolicy {
    /// Policy with a single initial administrator.
    pub fn new(admin: AccountId) -> Self {
        let mut admins = BTreeSet::new();
        admins.insert(admin);
        Self { admins }
    }

    pub fn is_admin(&self, account: &AccountId) -> bool {
        self.admins.contains(account)
    }

    /// # Errors
    /// Returns `StakingError::Unauthorized` if `caller` is not an administrator.
    pub fn ensure_admin(&self, caller: &AccountId) -> Result<(), StakingError> {
        if self.is_admin(caller) {
            Ok(())
        } else {
            Err(StakingError::Unauthorized(format!(
                "{} is not an administrator",
                caller
            )))
        }
    }

    /// Grant the administrator role. Only existing administrators may grant.
    pub fn grant(&mut self, caller: &AccountId, account: AccountId) -> Result<(), StakingError> {
        self.ensure_admin(caller)?;
        self.admins.insert(account);
        Ok(())
    }

    /// Revoke the administrator role.
    ///
    /// # Errors
    /// Returns `StakingError::Unauthorized` if `caller` is not an administrator
    /// or if `account` is the last remaining administrator.
    pub fn revoke(&mut self, caller: &AccountId, account: &AccountId) -> Result<(), StakingError> {
        self.ensure_admin(caller)?;
        if self.admins.len() == 1 && self.admins.contains(account) {
            return Err(StakingError::Unauthorized(
                "cannot revoke the last administrator".to_string(),
            ));
        }
        self.admins.remove(account);
        Ok(())
    }

    pub fn admins(&self) -> impl Iterator<Item = &AccountId> {
        self.admins.iter()
    }
}
