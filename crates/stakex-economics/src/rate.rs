// crates/stakex-economics/src/rate.rs
//
// Percentage rates with configurable decimal precision, and the integer
// arithmetic built on them: fees and linear profit accrual.
//
// A rate is the pair (rate, decimal) and encodes the fraction
//
//     rate / 10^(decimal + 2)
//
// so (10, 0) is 10%, (1234, 2) is 12.34%, (5, 1) is 0.5%. Valid rates are
// strictly between 0% and 100%.
//
// Every result is floor-truncated exactly once. No floating point.
// Intermediate products are taken in 512 bits: principal, rate, and elapsed
// seconds together can exceed 256 bits, while every result is bounded by the
// principal and so fits back in u128.

use serde::{Deserialize, Serialize};
use uint::construct_uint;

use stakex_core::{Amount, StakingError};

construct_uint! {
    /// 512-bit unsigned integer for accrual intermediates.
    struct U512(8);
}

/// Largest decimal precision whose denominator 10^(decimal + 2) fits in u128.
pub const MAX_RATE_DECIMAL: u8 = 36;

/// A validated percentage rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    pub rate: u128,
    pub decimal: u8,
}

impl Rate {
    /// Build a rate, checking `0 < rate < 10^(decimal + 2)`.
    ///
    /// # Errors
    /// Returns `StakingError::InvalidRate` when the rate is zero, at or above
    /// 100%, or `decimal` exceeds `MAX_RATE_DECIMAL`.
    pub fn new(rate: u128, decimal: u8) -> Result<Self, StakingError> {
        let invalid = StakingError::InvalidRate { rate, decimal };
        let denominator = denominator(decimal).ok_or_else(|| invalid.clone())?;
        if rate == 0 || rate >= denominator {
            return Err(invalid);
        }
        Ok(Self { rate, decimal })
    }

    /// 10^(decimal + 2). Always representable for a validated rate.
    pub fn denominator(&self) -> Amount {
        10u128.pow(self.decimal as u32 + 2)
    }

    /// `floor(amount * rate / 10^(decimal + 2))`.
    pub fn fee_of(&self, amount: Amount) -> Result<Amount, StakingError> {
        mul_div(amount, self.rate, self.denominator())
    }

    /// Split `amount` into `(net, fee)` where `net + fee == amount`.
    pub fn split(&self, amount: Amount) -> Result<(Amount, Amount), StakingError> {
        let fee = self.fee_of(amount)?;
        Ok((amount - fee, fee))
    }

    /// Simple, non-compounding profit on `principal` after `elapsed` seconds
    /// of a `lock` second window:
    ///
    /// ```text
    /// floor(principal * rate * min(elapsed, lock) / (10^(decimal + 2) * lock))
    /// ```
    ///
    /// Elapsed time is capped at the window, so profit stops growing once
    /// the lock has run out. A zero-length window counts as fully elapsed.
    pub fn accrue(&self, principal: Amount, elapsed: u64, lock: u64) -> Result<Amount, StakingError> {
        if lock == 0 || elapsed >= lock {
            return self.fee_of(principal);
        }
        let numerator = U512::from(principal) * U512::from(self.rate) * U512::from(elapsed);
        let divisor = U512::from(self.denominator()) * U512::from(lock);
        narrow(numerator / divisor, || {
            format!(
                "accrual of {} at {}/{} over {}/{}s",
                principal,
                self.rate,
                self.denominator(),
                elapsed,
                lock
            )
        })
    }
}

/// 10^(decimal + 2), or `None` when it does not fit in u128.
pub fn denominator(decimal: u8) -> Option<Amount> {
    10u128.checked_pow(decimal as u32 + 2)
}

fn mul_div(a: Amount, b: Amount, div: Amount) -> Result<Amount, StakingError> {
    if div == 0 {
        return Err(StakingError::Overflow(format!("{} * {} / 0", a, b)));
    }
    let quotient = U512::from(a) * U512::from(b) / U512::from(div);
    narrow(quotient, || format!("{} * {} / {}", a, b, div))
}

fn narrow(value: U512, context: impl FnOnce() -> String) -> Result<Amount, StakingError> {
    if value > U512::from(u128::MAX) {
        return Err(StakingError::Overflow(context()));
    }
    Ok(value.low_u128())
}
