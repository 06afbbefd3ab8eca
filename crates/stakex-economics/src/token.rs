// crates/stakex-economics/src/token.rs
//
// Token amount type and unit constants.
//
// The staked asset uses 18 decimals: 1 token = 10^18 base units. All
// internal accounting uses base units (u128) so that no floating point ever
// enters an economic calculation. Decimal strings ("100", "0.5") are parsed
// exactly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use stakex_core::{Amount, StakingError};

/// Number of decimal places of the staked asset.
pub const TOKEN_DECIMALS: u32 = 18;

/// Number of base units in one whole token.
pub const UNITS_PER_TOKEN: Amount = 1_000_000_000_000_000_000;

/// An amount of the staked asset.
///
/// Wraps a value in base units. Parsing and display go through exact
/// decimal conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenAmount {
    /// Amount in base units (1 token = 10^18 units).
    pub units: Amount,
}

impl TokenAmount {
    /// Create an amount from a whole number of tokens.
    ///
    /// # Example
    /// ```
    /// use stakex_economics::token::{TokenAmount, UNITS_PER_TOKEN};
    /// assert_eq!(TokenAmount::from_tokens(3).units, 3 * UNITS_PER_TOKEN);
    /// ```
    pub fn from_tokens(tokens: u64) -> Self {
        Self {
            units: tokens as Amount * UNITS_PER_TOKEN,
        }
    }

    pub fn from_units(units: Amount) -> Self {
        Self { units }
    }

    pub fn zero() -> Self {
        Self { units: 0 }
    }
}

impl Add for TokenAmount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            units: self.units.saturating_add(rhs.units),
        }
    }
}

impl Sub for TokenAmount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            units: self.units.saturating_sub(rhs.units),
        }
    }
}

impl FromStr for TokenAmount {
    type Err = StakingError;

    /// Parse a non-negative decimal token string with at most 18 fractional
    /// digits, e.g. `"100"`, `"0.5"`, `"1_000"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = s.trim().chars().filter(|c| *c != '_').collect();
        let invalid = || StakingError::InvalidAmount(format!("'{}' is not a token amount", s));

        let (whole, frac) = match cleaned.split_once('.') {
            Some((w, f)) => (w, f),
            None => (cleaned.as_str(), ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac.len() > TOKEN_DECIMALS as usize {
            return Err(StakingError::InvalidAmount(format!(
                "'{}' has more than {} decimal places",
                s, TOKEN_DECIMALS
            )));
        }

        let overflow = || StakingError::Overflow(format!("token amount '{}'", s));
        let whole_units = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<Amount>()
                .map_err(|_| overflow())?
                .checked_mul(UNITS_PER_TOKEN)
                .ok_or_else(overflow)?
        };
        let frac_units = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac, width = TOKEN_DECIMALS as usize);
            padded.parse::<Amount>().map_err(|_| invalid())?
        };

        Ok(Self {
            units: whole_units.checked_add(frac_units).ok_or_else(overflow)?,
        })
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.units / UNITS_PER_TOKEN;
        let frac = self.units % UNITS_PER_TOKEN;
        if frac == 0 {
            write!(f, "{}", whole)
        } else {
            // Up to 18 decimal places, trailing zeros trimmed
            let frac_str = format!("{:018}", frac);
            let trimmed = frac_str.trim_end_matches('0');
            write!(f, "{}.{}", whole, trimmed)
        }
    }
}
