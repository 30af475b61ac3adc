//! # Money — Integer Minor-Unit Amounts
//!
//! Booking totals, add-on prices, and platform fees are amounts in minor
//! units (sen). Floating-point money is excluded by construction: there is
//! no `f64` anywhere in this type, and parsing rejects fractional noise
//! beyond two decimal places.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A monetary amount in minor units (sen). 100 sen = RM 1.
///
/// Amounts are signed internally so that refund arithmetic is expressible,
/// but constructors for booking pricing require non-negative values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero amount.
    pub const ZERO: Money = Money(0);

    /// Create an amount from minor units (sen).
    pub const fn from_sen(sen: i64) -> Self {
        Self(sen)
    }

    /// Create a non-negative price from minor units.
    ///
    /// # Errors
    ///
    /// Returns an error if `sen` is negative.
    pub fn price(sen: i64) -> Result<Self, CoreError> {
        if sen < 0 {
            return Err(CoreError::Validation(format!(
                "price must be non-negative, got {sen} sen"
            )));
        }
        Ok(Self(sen))
    }

    /// The amount in minor units.
    pub const fn sen(&self) -> i64 {
        self.0
    }

    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns an error on i64 overflow.
    pub fn checked_add(&self, other: Money) -> Result<Money, CoreError> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or_else(|| CoreError::Validation("money addition overflow".to_string()))
    }

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns an error on i64 overflow.
    pub fn checked_sub(&self, other: Money) -> Result<Money, CoreError> {
        self.0
            .checked_sub(other.0)
            .map(Money)
            .ok_or_else(|| CoreError::Validation("money subtraction overflow".to_string()))
    }

    /// Sum an iterator of amounts with overflow checking.
    ///
    /// # Errors
    ///
    /// Returns an error on i64 overflow.
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Result<Money, CoreError> {
        let mut total = Money::ZERO;
        for amount in amounts {
            total = total.checked_add(amount)?;
        }
        Ok(total)
    }

    /// Whether the amount is strictly positive.
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}RM {}.{:02}", abs / 100, abs % 100)
    }
}
