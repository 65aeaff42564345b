use core::cmp::Ordering;
use core::fmt::Display;
use core::str::FromStr;

use crate::{BigDecimal, BigInteger};

/// Behaviour shared by [`BigInteger`] and [`BigDecimal`], for code that is
/// generic over either.
///
/// Comparison goes through [`cmp_value`](Numeric::cmp_value) rather than
/// `Ord`: for decimals it is numeric and ignores scale.
pub trait Numeric: Clone + Display + FromStr {
    /// -1, 0 or 1.
    fn signum(&self) -> i32;

    fn is_zero(&self) -> bool;

    fn negate(&self) -> Self;

    fn abs(&self) -> Self;

    /// Numeric ordering.
    fn cmp_value(&self, other: &Self) -> Ordering;

    /// The smaller value; `self` when they compare equal.
    fn min_value<'a>(&'a self, other: &'a Self) -> &'a Self {
        if self.cmp_value(other) == Ordering::Greater { other } else { self }
    }

    /// The larger value; `self` when they compare equal.
    fn max_value<'a>(&'a self, other: &'a Self) -> &'a Self {
        if self.cmp_value(other) == Ordering::Less { other } else { self }
    }
}

impl Numeric for BigInteger {
    #[inline]
    fn signum(&self) -> i32 {
        BigInteger::signum(self)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        BigInteger::is_zero(self)
    }

    #[inline]
    fn negate(&self) -> Self {
        BigInteger::negate(self)
    }

    #[inline]
    fn abs(&self) -> Self {
        BigInteger::abs(self)
    }

    #[inline]
    fn cmp_value(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl Numeric for BigDecimal {
    #[inline]
    fn signum(&self) -> i32 {
        BigDecimal::signum(self)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        BigDecimal::is_zero(self)
    }

    #[inline]
    fn negate(&self) -> Self {
        BigDecimal::negate(self)
    }

    #[inline]
    fn abs(&self) -> Self {
        BigDecimal::abs(self)
    }

    #[inline]
    fn cmp_value(&self, other: &Self) -> Ordering {
        BigDecimal::cmp_value(self, other)
    }
}

#[cfg(test)]
mod tests {
    use std::string::{String, ToString};
    use std::vec::Vec;

    use super::*;

    fn largest<T: Numeric>(values: &[T]) -> Option<&T> {
        values.iter().reduce(|a, b| a.max_value(b))
    }

    fn describe<T: Numeric>(value: &T) -> String {
        match value.signum() {
            -1 => ["negative ", &value.abs().to_string()].concat(),
            0 => "zero".to_string(),
            _ => value.to_string(),
        }
    }

    #[test]
    fn test_generic_over_integers() {
        let values: Vec<BigInteger> =
            ["3", "-10", "7"].iter().map(|s| s.parse().unwrap()).collect();
        assert_eq!(largest(&values), Some(&BigInteger::from(7)));
        assert_eq!(describe(&BigInteger::from(-5)), "negative 5");
        assert_eq!(describe(&BigInteger::ZERO), "zero");
    }

    #[test]
    fn test_generic_over_decimals() {
        let values: Vec<BigDecimal> =
            ["1.50", "-2", "1.5"].iter().map(|s| s.parse().unwrap()).collect();
        // equal by value: the first one wins
        assert_eq!(largest(&values).map(|d| d.to_string()), Some("1.50".to_string()));
        assert_eq!(describe(&"-0.25".parse::<BigDecimal>().unwrap()), "negative 0.25");
        assert!(Numeric::is_zero(&"0.000".parse::<BigDecimal>().unwrap()));
    }

    #[test]
    fn test_min_max_value() {
        let a: BigDecimal = "2.0".parse().unwrap();
        let b: BigDecimal = "2.00".parse().unwrap();
        assert_eq!(a.min_value(&b).scale(), 1);
        assert_eq!(b.max_value(&a).scale(), 2);
        let c: BigDecimal = "-3".parse().unwrap();
        assert_eq!(a.min_value(&c), &c);
        assert_eq!(Numeric::negate(&c), BigDecimal::from(3));
        assert_eq!(BigInteger::from(4).min_value(&BigInteger::from(-4)), &BigInteger::from(-4));
    }
}
