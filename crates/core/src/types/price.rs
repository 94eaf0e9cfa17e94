//! Type-safe price representation using decimal arithmetic.
//!
//! Store prices arrive as JSON numbers (`"netPrice": 49.5`) and are shown
//! with exactly two decimals. Every derived amount goes through
//! [`Price::round2`] so line totals and grand totals agree with what the
//! customer sees.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A monetary amount in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an integer number of minor units (paise, cents).
    #[must_use]
    pub fn from_minor_units(minor: i64) -> Self {
        Self(Decimal::new(minor, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Round to two decimal places, half away from zero.
    #[must_use]
    pub fn round2(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Whether the amount is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Amount in minor units (two implied decimals), as payment gateways expect.
    ///
    /// Returns `None` if the amount does not fit in an `i64`.
    #[must_use]
    pub fn to_minor_units(self) -> Option<i64> {
        let scaled = self.round2().0.checked_mul(Decimal::ONE_HUNDRED)?;
        i64::try_from(scaled.trunc()).ok()
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.round2().0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn price(s: &str) -> Price {
        Price::new(s.parse().unwrap())
    }

    #[test]
    fn test_display_pads_two_decimals() {
        assert_eq!(price("100").to_string(), "100.00");
        assert_eq!(price("0").to_string(), "0.00");
        assert_eq!(price("12.5").to_string(), "12.50");
    }

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(price("1.005").round2(), price("1.01"));
        assert_eq!(price("1.004").round2(), price("1.00"));
    }

    #[test]
    fn test_multiply_by_quantity() {
        assert_eq!(price("50.00") * 2, price("100.00"));
        assert_eq!(price("19.99") * 0, Price::ZERO);
    }

    #[test]
    fn test_sum() {
        let total: Price = [price("1.10"), price("2.20"), price("3.30")].into_iter().sum();
        assert_eq!(total, price("6.60"));
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(price("150.00").to_minor_units(), Some(15000));
        assert_eq!(price("0.5").to_minor_units(), Some(50));
        assert_eq!(Price::from_minor_units(15000), price("150.00"));
    }

    #[test]
    fn test_deserialize_from_json_number() {
        let p: Price = serde_json::from_str("49.5").unwrap();
        assert_eq!(p, price("49.5"));
        let p: Price = serde_json::from_str("\"12.30\"").unwrap();
        assert_eq!(p, price("12.30"));
    }
}
