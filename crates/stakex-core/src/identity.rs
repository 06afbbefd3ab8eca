// crates/stakex-core/src/identity.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::StakingError;

/// Identity of an account on the asset ledger.
///
/// A 20-byte address rendered as `0x`-prefixed lowercase hex. Every engine
/// operation takes the acting account explicitly; there is no ambient
/// "current sender".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(pub [u8; 20]);

impl AccountId {
    /// The zero address. Never a valid payout recipient.
    pub const ZERO: AccountId = AccountId([0u8; 20]);

    /// Derive a deterministic address from a human-readable label.
    ///
    /// Takes the first 20 bytes of SHA-256(label). Used by scenarios and
    /// tests to name accounts ("alice", "reserve") without managing keys.
    pub fn derive(label: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(label.as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[..20]);
        Self(bytes)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for AccountId {
    type Err = StakingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let raw = hex::decode(digits)
            .map_err(|e| StakingError::InvalidAccount(format!("bad account hex '{}': {}", s, e)))?;
        let bytes: [u8; 20] = raw.try_into().map_err(|_| {
            StakingError::InvalidAccount(format!("'{}' must be exactly 20 bytes", s))
        })?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for AccountId {
    type Error = StakingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_deterministic() {
        let a = AccountId::derive("alice");
        assert_eq!(a, AccountId::derive("alice"));
        assert_ne!(a, AccountId::derive("bob"));
        assert!(!a.is_zero());
    }

    #[test]
    fn test_display_parse() {
        let a = AccountId::derive("staker");
        let text = a.to_string();
        assert!(text.starts_with("0x"));
        assert_eq!(text.len(), 42);
        assert_eq!(text.parse::<AccountId>().unwrap(), a);
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(matches!(
            "0xdeadbeef".parse::<AccountId>(),
            Err(StakingError::InvalidAccount(_))
        ));
        assert!(matches!(
            "not-hex".parse::<AccountId>(),
            Err(StakingError::InvalidAccount(_))
        ));
    }

    #[test]
    fn test_serde_as_hex_string() {
        let a = AccountId::derive("reserve");
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, format!("\"{}\"", a));
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }
}
