//! # Money Module
//!
//! Integer money and tax rates for cart pricing.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CART TOTALS IN FLOATING POINT                                          │
//! │                                                                         │
//! │    3 × $0.10 add-on + $0.20 config = 0.5000000000000001  ❌              │
//! │                                                                         │
//! │  CART TOTALS IN CENTS                                                   │
//! │    3 × 10 + 20 = 50 cents                                 ✅              │
//! │                                                                         │
//! │  Every price snapshot, modifier, discount and total is an i64 count    │
//! │  of the smallest currency unit. Only the UI formats it as "$0.50".     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bazaar_core::money::{Money, TaxRate};
//!
//! let unit = Money::from_cents(1099);
//! let line = unit.multiply_quantity(3);
//! assert_eq!(line.cents(), 3297);
//!
//! let tax = line.calculate_tax(TaxRate::from_bps(1000));
//! assert_eq!(tax.cents(), 330);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: config modifiers may be negative (a smaller storage
///   tier), so intermediate sums can dip below zero
/// - **Saturating cart math**: quantities come from UI collaborators; a
///   runaway quantity pins at `i64::MAX` instead of wrapping
///
/// ## Where Money Flows
/// ```text
/// ProductRef.price ──► CartEntry.unit_price ──► CartItem.total_price
///                                                     │
/// AddonRef.price ─────────────────────────────────────┤
/// ConfigSelection.price_modifier ─────────────────────┘
///                                                     ▼
///                         Cart.subtotal ──► tax ──► total − discount
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -$5.50.
    ///
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion, always 0-99.
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Floors the amount at zero.
    ///
    /// Used for the cart total, which a discount can never push negative,
    /// and for discount amounts themselves.
    ///
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(-4700).clamp_non_negative(), Money::zero());
    /// assert_eq!(Money::from_cents(250).clamp_non_negative().cents(), 250);
    /// ```
    #[inline]
    pub const fn clamp_non_negative(self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            self
        }
    }

    /// Multiplies by a quantity, saturating at the i64 bounds.
    ///
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Adds two amounts, saturating at the i64 bounds.
    #[inline]
    pub const fn saturating_add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }

    /// Calculates tax at the given rate, rounding half up.
    ///
    /// ## Implementation
    /// Integer math in i128: `(amount * bps + 5000) / 10000`.
    /// The +5000 is half of the 10000 divisor.
    ///
    /// ```rust
    /// use bazaar_core::money::{Money, TaxRate};
    ///
    /// let subtotal = Money::from_cents(23000);
    /// let tax = subtotal.calculate_tax(TaxRate::from_bps(1000));
    /// assert_eq!(tax.cents(), 2300);
    ///
    /// // $0.05 at 10% = 0.5 cents → 1 cent
    /// assert_eq!(Money::from_cents(5).calculate_tax(TaxRate::from_bps(1000)).cents(), 1);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax_cents = (i128::from(self.0) * i128::from(rate.bps()) + 5000) / 10000;
        Money::from_cents(i64::try_from(tax_cents).unwrap_or(i64::MAX))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-oriented display; the storefront UI owns localized formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
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
        self.saturating_add(other)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = self.saturating_add(other);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate in basis points (1 bps = 0.01%).
///
/// 1000 bps = 10%, the flat cart rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        crate::CART_TAX_RATE
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
