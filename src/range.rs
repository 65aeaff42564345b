use core::iter::FusedIterator;

use crate::BigInteger;

/// Inclusive range of integers stepping by one, created with
/// [`BigInteger::range_to`].
///
/// Iterating consumes the range from either end; `contains` and `is_empty`
/// describe what is left.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BigIntegerRange {
    start: BigInteger,
    end_inclusive: BigInteger,
}

impl BigIntegerRange {
    pub fn new(start: BigInteger, end_inclusive: BigInteger) -> Self {
        Self {
            start,
            end_inclusive,
        }
    }

    #[inline]
    pub fn start(&self) -> &BigInteger {
        &self.start
    }

    #[inline]
    pub fn end_inclusive(&self) -> &BigInteger {
        &self.end_inclusive
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start > self.end_inclusive
    }

    pub fn contains(&self, value: &BigInteger) -> bool {
        &self.start <= value && value <= &self.end_inclusive
    }

    /// Number of remaining values, zero when empty.
    pub fn len_big(&self) -> BigInteger {
        if self.is_empty() {
            BigInteger::ZERO
        } else {
            &(&self.end_inclusive - &self.start) + &BigInteger::ONE
        }
    }
}

impl Iterator for BigIntegerRange {
    type Item = BigInteger;

    fn next(&mut self) -> Option<BigInteger> {
        if self.is_empty() {
            return None;
        }
        let next = &self.start + &BigInteger::ONE;
        Some(core::mem::replace(&mut self.start, next))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.len_big().to_u64_exact().ok().and_then(|n| usize::try_from(n).ok()) {
            Some(n) => (n, Some(n)),
            None => (usize::MAX, None),
        }
    }
}

impl DoubleEndedIterator for BigIntegerRange {
    fn next_back(&mut self) -> Option<BigInteger> {
        if self.is_empty() {
            return None;
        }
        let prev = &self.end_inclusive - &BigInteger::ONE;
        Some(core::mem::replace(&mut self.end_inclusive, prev))
    }
}

impl FusedIterator for BigIntegerRange {}
