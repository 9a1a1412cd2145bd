//! # Money Module
//!
//! Provides the `Money` type for rental prices and totals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Catalog prices are whole rupees today, but per-day rates multiplied    │
//! │  by day counts and quantities get summed across a whole cart.           │
//! │                                                                         │
//! │  Floating point:  0.1 + 0.2 = 0.30000000000000004                       │
//! │  Integer minor units:  10 + 20 = 30  (always)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The type is currency-agnostic: one unit of `minor()` is 1/100 of whatever
//! the storefront displays. No rounding, tax, or conversion happens here.
//!
//! ## Usage
//! ```rust
//! use lensrent_core::money::Money;
//!
//! let per_day = Money::from_major(500);
//! let three_days = per_day.checked_mul(3);
//! assert_eq!(three_days, Some(Money::from_major(1500)));
//! assert_eq!(Money::from_major(1500).to_string(), "1500.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in minor units (paise, cents, ...).
///
/// ## Where Money is Used
/// ```text
/// Catalog price ──► CartLineItem.unit_price ──► line_total ──► cart_total
///                                                                  │
///                                           PaymentRequest.amount ◄┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use lensrent_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(1099).minor(), 1099);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from whole major units (e.g. rupees).
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the whole major-unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor-unit remainder (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
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

    /// Multiplies by a quantity, day count, or hour count.
    ///
    /// `None` when the product does not fit in an `i64` of minor units.
    ///
    /// ```rust
    /// use lensrent_core::money::Money;
    ///
    /// let hourly = Money::from_major(800);
    /// assert_eq!(hourly.checked_mul(4), Some(Money::from_major(3200)));
    /// assert_eq!(Money::from_minor(i64::MAX).checked_mul(2), None);
    /// ```
    #[inline]
    pub const fn checked_mul(&self, factor: i64) -> Option<Self> {
        match self.0.checked_mul(factor) {
            Some(minor) => Some(Money(minor)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(minor) => Some(Money(minor)),
            None => None,
        }
    }

    /// Formats with a currency symbol prefix, e.g. `₹1500.00`.
    pub fn format_with(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}{}{}.{:02}",
            sign,
            symbol,
            self.major().abs(),
            self.minor_part()
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Symbol-free display; the storefront supplies the currency symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with(""))
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

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
