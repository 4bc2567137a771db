//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Prices, subtotals and revenue are whole numbers of the minor currency  │
//! │  unit. There is no floating point anywhere in the ledger:               │
//! │                                                                         │
//! │    unit price 1500 × qty 2 = subtotal 3000                              │
//! │    Σ subtotals            = transaction total_amount                    │
//! │    Σ total_amount         = report total_revenue                        │
//! │                                                                         │
//! │  Every step is checked so an absurd quantity cannot wrap a total.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kasir_core::money::Money;
//!
//! let price = Money::from_minor(1500);
//! let line = price.checked_mul_quantity(2).unwrap();
//! let total: Money = [line, Money::from_minor(500)].into_iter().sum();
//! assert_eq!(total.minor(), 3500);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// Serializes as a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Line subtotal: unit price × quantity, `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(299);
    /// assert_eq!(unit_price.checked_mul_quantity(3).unwrap().minor(), 897);
    /// assert!(Money::from_minor(i64::MAX).checked_mul_quantity(2).is_none());
    /// ```
    #[inline]
    pub const fn checked_mul_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Addition that reports overflow instead of wrapping.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Human-readable form with `.` thousands separators, e.g. `Rp 1.250.000`.
///
/// ## Note
/// For logs and receipts only. Transport layers serialize the raw integer.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}Rp {}", sign, grouped)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl From<i64> for Money {
    fn from(minor: i64) -> Self {
        Money(minor)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor() {
        let money = Money::from_minor(1500);
        assert_eq!(money.minor(), 1500);
        assert!(!money.is_zero());
        assert!(!money.is_negative());
        assert!(Money::zero().is_zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(0).to_string(), "Rp 0");
        assert_eq!(Money::from_minor(999).to_string(), "Rp 999");
        assert_eq!(Money::from_minor(3000).to_string(), "Rp 3.000");
        assert_eq!(Money::from_minor(1_250_000).to_string(), "Rp 1.250.000");
        assert_eq!(Money::from_minor(-45_500).to_string(), "-Rp 45.500");
    }

    #[test]
    fn test_checked_arithmetic() {
        let price = Money::from_minor(1500);
        assert_eq!(price.checked_mul_quantity(2), Some(Money::from_minor(3000)));
        assert_eq!(price.checked_add(Money::from_minor(500)), Some(Money::from_minor(2000)));

        assert!(Money::from_minor(i64::MAX / 2 + 1).checked_mul_quantity(2).is_none());
        assert!(Money::from_minor(i64::MAX).checked_add(Money::from_minor(1)).is_none());
    }

    #[test]
    fn test_sum_and_add_assign() {
        let lines = vec![Money::from_minor(3000), Money::from_minor(1200), Money::from_minor(800)];
        let total: Money = lines.into_iter().sum();
        assert_eq!(total.minor(), 5000);

        let mut running = Money::zero();
        running += Money::from_minor(250);
        running += Money::from_minor(250);
        assert_eq!(running, Money::from_minor(500));
    }

    #[test]
    fn test_serializes_as_integer() {
        let json = serde_json::to_string(&Money::from_minor(3000)).unwrap();
        assert_eq!(json, "3000");
        let back: Money = serde_json::from_str("42").unwrap();
        assert_eq!(back.minor(), 42);
    }
}
