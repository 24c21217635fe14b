//! # Money Module
//!
//! Provides the `Money` type for rupiah amounts.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RUPIAH HAS NO MINOR UNIT IN PRACTICE                                   │
//! │                                                                         │
//! │  Every price, expense and debt in the ledger is a whole number of      │
//! │  rupiah. Storing i64 keeps sums exact:                                 │
//! │                                                                         │
//! │    3 × Rp 5.000 = Rp 15.000   (never 14999.999…)                       │
//! │                                                                         │
//! │  Floats only appear for display ratios (profit margin %).              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pembukuan_core::money::Money;
//!
//! let price = Money::from_rupiah(5000);
//! let total = price.multiply_quantity(3);
//! assert_eq!(total.rupiah(), 15000);
//! assert_eq!(total.to_string(), "Rp 15.000");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole rupiah.
///
/// ## Design Decisions
/// - **i64 (signed)**: Net profit can go negative even though every stored
///   amount is non-negative
/// - **Transparent serde**: Serializes as a bare integer, matching the
///   integer columns in the store
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price ──► SaleTransaction.unit_price ──► SaleTransaction.total │
/// │                                                        │                │
/// │                                       Receivable.amount (credit sales)  │
/// │                                                                         │
/// │  Expense.amount ──┐                                                     │
/// │  Sale totals ─────┴──► DailyTotals / PeriodReport ──► CSV export        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole rupiah.
    #[inline]
    pub const fn from_rupiah(rupiah: i64) -> Self {
        Money(rupiah)
    }

    /// Returns the value in rupiah.
    #[inline]
    pub const fn rupiah(&self) -> i64 {
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use pembukuan_core::money::Money;
    ///
    /// let unit_price = Money::from_rupiah(7000);
    /// assert_eq!(unit_price.multiply_quantity(2).rupiah(), 14000);
    /// ```
    ///
    /// Saturates at the `i64` bounds.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Like [`Money::multiply_quantity`] but returns `None` on overflow.
    ///
    /// Used when computing persisted totals from user input, where an
    /// absurd quantity must become a validation error instead of a panic.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================
// Arithmetic saturates. Stored rows are not guaranteed to have passed
// validation, and a report over them must not panic.

/// Formats like the `id-ID` currency formatter: `Rp 15.000`.
///
/// ## Note
/// Thousands are grouped with `.`; there are no decimals.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}Rp {}", sign, group_thousands(self.0.unsigned_abs()))
    }
}

/// Groups digits in threes with a `.` separator.
pub(crate) fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }

    out
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
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl From<i64> for Money {
    fn from(rupiah: i64) -> Self {
        Money(rupiah)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_rupiah(15000).to_string(), "Rp 15.000");
        assert_eq!(Money::from_rupiah(500).to_string(), "Rp 500");
        assert_eq!(Money::from_rupiah(0).to_string(), "Rp 0");
        assert_eq!(Money::from_rupiah(1234567).to_string(), "Rp 1.234.567");
        assert_eq!(Money::from_rupiah(-25000).to_string(), "-Rp 25.000");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_rupiah(1000);
        let b = Money::from_rupiah(500);

        assert_eq!((a + b).rupiah(), 1500);
        assert_eq!((a - b).rupiah(), 500);
        assert_eq!((b - a).rupiah(), -500);
        assert_eq!((a * 3).rupiah(), 3000);
    }

    #[test]
    fn test_sum() {
        let total: Money = [20000, 5000, 0]
            .into_iter()
            .map(Money::from_rupiah)
            .sum();
        assert_eq!(total.rupiah(), 25000);

        let empty: Money = std::iter::empty().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_sum_saturates_instead_of_overflowing() {
        let half = Money::from_rupiah(i64::MAX / 2 + 1);
        let total: Money = [half, half].into_iter().sum();
        assert_eq!(total.rupiah(), i64::MAX);

        let mut running = half;
        running += half;
        assert_eq!(running.rupiah(), i64::MAX);
        assert_eq!((Money::from_rupiah(i64::MIN) - half).rupiah(), i64::MIN);
    }

    #[test]
    fn test_checked_multiply_overflow() {
        let price = Money::from_rupiah(i64::MAX / 2);
        assert!(price.checked_multiply_quantity(3).is_none());
        assert_eq!(
            Money::from_rupiah(5000).checked_multiply_quantity(3),
            Some(Money::from_rupiah(15000))
        );
    }

    #[test]
    fn test_serializes_as_bare_integer() {
        let json = serde_json::to_string(&Money::from_rupiah(14000)).unwrap();
        assert_eq!(json, "14000");
    }
}
