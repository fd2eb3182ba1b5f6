//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  In floating point:  0.1 + 0.2 = 0.30000000000000004                    │
//! │                                                                         │
//! │  A sale total is the sum of price × quantity over every line.           │
//! │  With integer cents that sum is exact, and reports add up to the        │
//! │  same number the cashier saw.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use medistock_core::money::Money;
//!
//! let unit = Money::from_cents(499);
//! let line = unit.checked_multiply_quantity(2).unwrap();
//! let total = line.checked_add(Money::from_cents(150)).unwrap();
//! assert_eq!(total.cents(), 1148);
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A monetary value in the smallest currency unit (cents).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Multiplies a unit price by a line quantity, `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use medistock_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.checked_multiply_quantity(3), Some(Money::from_cents(897)));
    /// ```
    #[inline]
    pub fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(Money::default(), Money::zero());
    }

    #[test]
    fn test_line_totals_sum_exactly() {
        let total = [(333, 3), (1, 1)]
            .into_iter()
            .map(|(cents, qty)| Money::from_cents(cents).checked_multiply_quantity(qty).unwrap())
            .try_fold(Money::zero(), |acc, line| acc.checked_add(line))
            .unwrap();
        assert_eq!(total.cents(), 1000);
    }

    #[test]
    fn test_checked_multiply_overflow() {
        assert!(Money::from_cents(i64::MAX).checked_multiply_quantity(2).is_none());
        assert_eq!(
            Money::from_cents(250).checked_multiply_quantity(4),
            Some(Money::from_cents(1000))
        );
    }

    #[test]
    fn test_checked_add_overflow() {
        assert!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)).is_none());
        assert_eq!(
            Money::from_cents(-50).checked_add(Money::from_cents(150)),
            Some(Money::from_cents(100))
        );
    }
}
