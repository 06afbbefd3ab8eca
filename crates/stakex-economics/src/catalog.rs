// crates/stakex-economics/src/catalog.rs
//
// Package catalog: an append-only registry of staking packages.
//
// Packages get sequential ids starting at 1. Terms never change after
// creation; the only mutation is switching a package offline, after which it
// takes no new stakes while existing positions keep using its terms.

use serde::{Deserialize, Serialize};

use stakex_core::{Amount, StakingError, StakingEvent};

use crate::rate::Rate;

/// Interest terms for one staking package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePackage {
    /// Sequential id, starting at 1.
    pub id: u64,
    /// Rate for one full lock window.
    pub rate: Rate,
    /// Minimum principal per stake call, in base units.
    pub min_staking: Amount,
    /// Seconds a deposit stays locked; also the accrual window.
    pub lock_duration: u64,
    /// Once true, the package accepts no new stakes.
    pub is_offline: bool,
}

impl StakePackage {
    /// The `PackageInfo` notification for this package's current state.
    pub fn info_event(&self) -> StakingEvent {
        StakingEvent::PackageInfo {
            id: self.id,
            rate: self.rate.rate,
            rate_decimal: self.rate.decimal,
            min_staking: self.min_staking,
            lock_duration: self.lock_duration,
            is_offline: self.is_offline,
        }
    }
}

/// Registry of all packages ever created, indexed by `id - 1`.
#[derive(Debug, Clone, Default)]
pub struct PackageCatalog {
    packages: Vec<StakePackage>,
}

impl PackageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a package and return its new id.
    ///
    /// # Errors
    /// Returns `StakingError::InvalidRate` unless `0 < rate < 10^(rate_decimal + 2)`.
    pub fn add(
        &mut self,
        rate: u128,
        rate_decimal: u8,
        min_staking: Amount,
        lock_duration: u64,
    ) -> Result<&StakePackage, StakingError> {
        let rate = Rate::new(rate, rate_decimal)?;
        let id = self.packages.len() as u64 + 1;
        self.packages.push(StakePackage {
            id,
            rate,
            min_staking,
            lock_duration,
            is_offline: false,
        });
        Ok(&self.packages[self.packages.len() - 1])
    }

    /// Switch a package offline.
    ///
    /// # Errors
    /// Returns `StakingError::NotFound` for an unassigned id and
    /// `StakingError::PackageOffline` if the package is already offline.
    pub fn disable(&mut self, id: u64) -> Result<&StakePackage, StakingError> {
        let package = self.get_mut(id)?;
        if package.is_offline {
            return Err(StakingError::PackageOffline(id));
        }
        package.is_offline = true;
        Ok(package)
    }

    /// Look up a package by id.
    ///
    /// # Errors
    /// Returns `StakingError::NotFound` if the id was never assigned.
    pub fn get(&self, id: u64) -> Result<&StakePackage, StakingError> {
        id.checked_sub(1)
            .and_then(|index| self.packages.get(index as usize))
            .ok_or_else(|| StakingError::NotFound(format!("package {} does not exist", id)))
    }

    fn get_mut(&mut self, id: u64) -> Result<&mut StakePackage, StakingError> {
        id.checked_sub(1)
            .and_then(|index| self.packages.get_mut(index as usize))
            .ok_or_else(|| StakingError::NotFound(format!("package {} does not exist", id)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &StakePackage> {
        self.packages.iter()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = 86_400;

    #[test]
    fn test_ids_are_sequential_from_one() {
        let mut catalog = PackageCatalog::new();
        assert_eq!(catalog.add(10, 0, 100, 180 * DAY).unwrap().id, 1);
        assert_eq!(catalog.add(20, 0, 100, 360 * DAY).unwrap().id, 2);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_add_rejects_bad_rate() {
        let mut catalog = PackageCatalog::new();
        assert!(matches!(
            catalog.add(0, 0, 100, DAY),
            Err(StakingError::InvalidRate { .. })
        ));
        assert!(matches!(
            catalog.add(101, 0, 100, DAY),
            Err(StakingError::InvalidRate { .. })
        ));
        // Failed adds do not consume ids
        assert!(catalog.is_empty());
        assert_eq!(catalog.add(10, 0, 100, DAY).unwrap().id, 1);
    }

    #[test]
    fn test_info_event_carries_all_fields() {
        let mut catalog = PackageCatalog::new();
        let event = catalog.add(10, 0, 100, 180 * DAY).unwrap().info_event();
        assert_eq!(
            event,
            StakingEvent::PackageInfo {
                id: 1,
                rate: 10,
                rate_decimal: 0,
                min_staking: 100,
                lock_duration: 180 * DAY,
                is_offline: false,
            }
        );
    }

    #[test]
    fn test_disable() {
        let mut catalog = PackageCatalog::new();
        catalog.add(10, 0, 100, 180 * DAY).unwrap();
        let package = catalog.disable(1).unwrap();
        assert!(package.is_offline);
        assert!(catalog.get(1).unwrap().is_offline);
    }

    #[test]
    fn test_disable_unknown_package() {
        let mut catalog = PackageCatalog::new();
        catalog.add(10, 0, 100, 180 * DAY).unwrap();
        assert!(matches!(catalog.disable(2), Err(StakingError::NotFound(_))));
        assert!(matches!(catalog.disable(0), Err(StakingError::NotFound(_))));
    }

    #[test]
    fn test_package_serializes_with_rate() {
        let mut catalog = PackageCatalog::new();
        let package = catalog.add(1234, 2, 100, DAY).unwrap();
        let json = serde_json::to_string(package).unwrap();
        assert!(json.contains("\"rate\":{\"rate\":1234,\"decimal\":2}"));
        let back: StakePackage = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, package);
    }

    #[test]
    fn test_disable_twice_is_error() {
        let mut catalog = PackageCatalog::new();
        catalog.add(10, 0, 100, 180 * DAY).unwrap();
        catalog.disable(1).unwrap();
        assert_eq!(catalog.disable(1), Err(StakingError::PackageOffline(1)));
    }
}
