use core::cmp::Ordering;
use core::fmt;
use core::iter::{Product, Sum};
use core::ops::{
    Add, AddAssign, BitAnd, BitOr, BitXor, Div, DivAssign, Mul, MulAssign, Neg, Not, Rem,
    RemAssign, Shl, Shr, Sub, SubAssign,
};
use core::str::FromStr;

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::magnitude;
use crate::range::BigIntegerRange;
use crate::{ArithmeticError, ParseError};

/// Arbitrary-precision signed integer.
///
/// Stored as a sign and a magnitude of 32-bit words, least-significant word
/// first, with no most-significant zero word. Zero has signum 0 and an empty
/// magnitude. Bit operations behave as if the value were stored in
/// two's complement with infinite sign extension.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BigInteger {
    signum: i8,
    mag: Cow<'static, [u32]>,
}

// ============================================================================
// Constants
// ============================================================================

impl BigInteger {
    /// Zero
    pub const ZERO: Self = Self::from_static(0, &[]);

    /// One
    pub const ONE: Self = Self::from_static(1, &[1]);

    /// Two
    pub const TWO: Self = Self::from_static(1, &[2]);

    /// Ten
    pub const TEN: Self = Self::from_static(1, &[10]);

    /// Minus one
    pub const NEGATIVE_ONE: Self = Self::from_static(-1, &[1]);
}

// ============================================================================
// Constructors and Raw Access
// ============================================================================

impl Default for BigInteger {
    fn default() -> Self {
        Self::ZERO
    }
}

impl BigInteger {
    /// Builds a value over a static, already trimmed magnitude.
    pub(crate) const fn from_static(signum: i8, mag: &'static [u32]) -> Self {
        Self {
            signum,
            mag: Cow::Borrowed(mag),
        }
    }

    /// Canonicalizing constructor used by every arithmetic result.
    pub(crate) fn from_parts(signum: i8, mut mag: Vec<u32>) -> Self {
        magnitude::trim(&mut mag);
        let signum = if mag.is_empty() { 0 } else { signum };
        Self {
            signum,
            mag: Cow::Owned(mag),
        }
    }

    /// Creates a value from an explicit sign and little-endian magnitude words.
    ///
    /// Leading (most-significant) zero words are ignored. A non-zero signum
    /// with an all-zero magnitude yields zero.
    ///
    /// # Errors
    /// Returns `ParseError::SignumMismatch` if `signum` is not -1, 0 or 1, or
    /// is 0 while the magnitude is non-zero.
    pub fn from_sign_magnitude(signum: i32, mag: &[u32]) -> Result<Self, ParseError> {
        let mag = magnitude::trimmed(mag);
        match signum {
            -1 | 1 => Ok(Self::from_parts(signum as i8, mag.to_vec())),
            0 if mag.is_empty() => Ok(Self::ZERO),
            _ => Err(ParseError::SignumMismatch),
        }
    }

    /// Creates a value from big-endian two's-complement 32-bit words.
    ///
    /// The sign comes from the first word, so `[-1]` is -1 and
    /// `[0, -1]` is 4294967295. An empty slice is zero.
    pub fn from_words(words: &[i32]) -> Self {
        let negative = words.first().is_some_and(|&w| w < 0);
        let le = words.iter().rev().map(|&w| w as u32).collect();
        Self::from_twos_complement(le, negative)
    }

    /// Creates a value from big-endian two's-complement bytes, the format
    /// produced by [`to_be_bytes`](Self::to_be_bytes). An empty slice is zero.
    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        let negative = bytes.first().is_some_and(|&b| b & 0x80 != 0);
        let fill = if negative { 0xFF } else { 0x00 };
        Self::from_twos_complement(be_bytes_to_words(bytes, fill), negative)
    }

    /// Creates a value from a sign and a big-endian unsigned magnitude.
    ///
    /// # Errors
    /// Same as [`from_sign_magnitude`](Self::from_sign_magnitude).
    pub fn from_sign_be_bytes(signum: i32, bytes: &[u8]) -> Result<Self, ParseError> {
        Self::from_sign_magnitude(signum, &be_bytes_to_words(bytes, 0))
    }

    /// -1, 0 or 1.
    #[inline(always)]
    pub const fn signum(&self) -> i32 {
        self.signum as i32
    }

    /// The absolute value as little-endian 32-bit words, without
    /// most-significant zero words. Empty for zero.
    #[inline(always)]
    pub fn magnitude(&self) -> &[u32] {
        &self.mag
    }

    /// Minimal big-endian two's-complement encoding; always at least one
    /// byte, and always has room for the sign bit.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        let byte_len = (self.bit_length() / 8 + 1) as usize;
        let words = self.to_twos_complement(byte_len.div_ceil(4));
        (0..byte_len)
            .rev()
            .map(|i| (words[i / 4] >> ((i % 4) * 8)) as u8)
            .collect()
    }

    fn from_u128(mut value: u128) -> Self {
        let mut mag = Vec::with_capacity(4);
        while value != 0 {
            mag.push(value as u32);
            value >>= 32;
        }
        Self::from_parts(1, mag)
    }

    fn from_i128(value: i128) -> Self {
        let abs = Self::from_u128(value.unsigned_abs());
        if value < 0 { abs.negate() } else { abs }
    }

    /// Low 64 bits of the magnitude.
    #[inline]
    fn low_u64(&self) -> u64 {
        let lo = *self.mag.first().unwrap_or(&0) as u64;
        let hi = *self.mag.get(1).unwrap_or(&0) as u64;
        (hi << 32) | lo
    }

    /// Inclusive range `self..=end`, stepping by one.
    pub fn range_to(&self, end: &Self) -> BigIntegerRange {
        BigIntegerRange::new(self.clone(), end.clone())
    }
}

/// Groups big-endian bytes into little-endian words, padding the most
/// significant word with `fill`.
fn be_bytes_to_words(bytes: &[u8], fill: u8) -> Vec<u32> {
    let mut words = Vec::with_capacity(bytes.len().div_ceil(4));
    for chunk in bytes.rchunks(4) {
        let mut buf = [fill; 4];
        buf[4 - chunk.len()..].copy_from_slice(chunk);
        words.push(u32::from_be_bytes(buf));
    }
    words
}

// ============================================================================
// Two's Complement Helpers
// ============================================================================

/// In-place two's-complement negation over a fixed width.
fn negate_words(words: &mut [u32]) {
    let mut carry = true;
    for w in words.iter_mut() {
        let (v, c) = (!*w).overflowing_add(carry as u32);
        *w = v;
        carry = c;
    }
}

impl BigInteger {
    fn from_twos_complement(mut words: Vec<u32>, negative: bool) -> Self {
        if negative {
            negate_words(&mut words);
            Self::from_parts(-1, words)
        } else {
            Self::from_parts(1, words)
        }
    }

    /// Sign-extended two's-complement words; `len` must exceed the magnitude
    /// length or be enough to hold the sign bit.
    fn to_twos_complement(&self, len: usize) -> Vec<u32> {
        let mut words = vec![0u32; len];
        let n = self.mag.len().min(len);
        words[..n].copy_from_slice(&self.mag[..n]);
        if self.signum < 0 {
            negate_words(&mut words);
        }
        words
    }

    fn bitwise(&self, rhs: &Self, op: impl Fn(u32, u32) -> u32) -> Self {
        let len = self.mag.len().max(rhs.mag.len()) + 1;
        let a = self.to_twos_complement(len);
        let b = rhs.to_twos_complement(len);
        let words: Vec<u32> = a.iter().zip(&b).map(|(&x, &y)| op(x, y)).collect();
        let negative = words[len - 1] >> 31 == 1;
        Self::from_twos_complement(words, negative)
    }

    /// `|self| - 1` for a non-zero value.
    fn mag_minus_one(&self) -> Vec<u32> {
        magnitude::sub(&self.mag, &[1])
    }
}

// ============================================================================
// Sign Operations
// ============================================================================

impl BigInteger {
    #[inline(always)]
    pub const fn is_zero(&self) -> bool {
        self.signum == 0
    }

    #[inline(always)]
    pub const fn is_positive(&self) -> bool {
        self.signum > 0
    }

    #[inline(always)]
    pub const fn is_negative(&self) -> bool {
        self.signum < 0
    }

    #[inline]
    pub fn is_one(&self) -> bool {
        self.signum == 1 && *self.mag == [1]
    }

    #[inline]
    pub fn is_odd(&self) -> bool {
        self.mag.first().is_some_and(|&w| w & 1 == 1)
    }

    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn abs(&self) -> Self {
        if self.signum < 0 { self.negate() } else { self.clone() }
    }

    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn negate(&self) -> Self {
        Self {
            signum: -self.signum,
            mag: self.mag.clone(),
        }
    }
}

// ============================================================================
// Arithmetic Operations - Addition and Subtraction
// ============================================================================

impl BigInteger {
    fn add_signed(&self, rhs_signum: i8, rhs_mag: &[u32]) -> Self {
        if rhs_signum == 0 {
            return self.clone();
        }
        if self.signum == 0 {
            return Self::from_parts(rhs_signum, rhs_mag.to_vec());
        }
        if self.signum == rhs_signum {
            return Self::from_parts(self.signum, magnitude::add(&self.mag, rhs_mag));
        }
        match magnitude::cmp(&self.mag, rhs_mag) {
            Ordering::Equal => Self::ZERO,
            Ordering::Greater => Self::from_parts(self.signum, magnitude::sub(&self.mag, rhs_mag)),
            Ordering::Less => Self::from_parts(rhs_signum, magnitude::sub(rhs_mag, &self.mag)),
        }
    }

    fn add_impl(&self, rhs: &Self) -> Self {
        self.add_signed(rhs.signum, &rhs.mag)
    }

    fn sub_impl(&self, rhs: &Self) -> Self {
        self.add_signed(-rhs.signum, &rhs.mag)
    }
}

// ============================================================================
// Arithmetic Operations - Multiplication
// ============================================================================

impl BigInteger {
    fn mul_impl(&self, rhs: &Self) -> Self {
        if self.signum == 0 || rhs.signum == 0 {
            return Self::ZERO;
        }
        Self::from_parts(self.signum * rhs.signum, magnitude::mul(&self.mag, &rhs.mag))
    }

    /// Raises `self` to `exponent` by binary exponentiation. `x^0` is one,
    /// including `0^0`.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn pow(&self, mut exponent: u32) -> Self {
        let mut result = Self::ONE;
        let mut base = self.clone();
        while exponent > 0 {
            if exponent & 1 == 1 {
                result = &result * &base;
            }
            exponent >>= 1;
            if exponent > 0 {
                base = &base * &base;
            }
        }
        result
    }

    /// Like [`pow`](Self::pow) but accepts a signed exponent.
    ///
    /// # Errors
    /// Returns `ArithmeticError::NegativeExponent` if `exponent < 0`.
    pub fn try_pow(&self, exponent: i32) -> Result<Self, ArithmeticError> {
        u32::try_from(exponent)
            .map(|e| self.pow(e))
            .map_err(|_| ArithmeticError::NegativeExponent)
    }
}

// ============================================================================
// Arithmetic Operations - Division
// ============================================================================

impl BigInteger {
    /// Truncating division returning `(quotient, remainder)` with
    /// `self == quotient * divisor + remainder`; the remainder takes the sign
    /// of `self`.
    ///
    /// # Errors
    /// Returns `ArithmeticError::DivisionByZero` if `divisor` is zero.
    pub fn div_rem(&self, divisor: &Self) -> Result<(Self, Self), ArithmeticError> {
        if divisor.signum == 0 {
            return Err(ArithmeticError::DivisionByZero);
        }
        if self.signum == 0 {
            return Ok((Self::ZERO, Self::ZERO));
        }
        let (q, r) = magnitude::div_rem(&self.mag, &divisor.mag);
        Ok((
            Self::from_parts(self.signum * divisor.signum, q),
            Self::from_parts(self.signum, r),
        ))
    }

    /// Checked truncating division. Returns `None` if `divisor` is zero.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn checked_div(&self, divisor: &Self) -> Option<Self> {
        self.div_rem(divisor).ok().map(|(q, _)| q)
    }

    /// Checked remainder. Returns `None` if `divisor` is zero.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn checked_rem(&self, divisor: &Self) -> Option<Self> {
        self.div_rem(divisor).ok().map(|(_, r)| r)
    }

    /// Truncating division. Returns an error if `divisor` is zero.
    pub fn try_div(&self, divisor: &Self) -> Result<Self, ArithmeticError> {
        self.div_rem(divisor).map(|(q, _)| q)
    }

    /// Remainder with the sign of `self`. Returns an error if `divisor` is zero.
    pub fn try_rem(&self, divisor: &Self) -> Result<Self, ArithmeticError> {
        self.div_rem(divisor).map(|(_, r)| r)
    }

    /// Non-negative residue of `self` modulo `m`.
    ///
    /// # Errors
    /// Returns `ArithmeticError::NonPositiveModulus` if `m <= 0`.
    pub fn modulo(&self, m: &Self) -> Result<Self, ArithmeticError> {
        if m.signum <= 0 {
            return Err(ArithmeticError::NonPositiveModulus);
        }
        let r = self.try_rem(m)?;
        Ok(if r.is_negative() { &r + m } else { r })
    }

    /// Remainder of the magnitude by a single word.
    pub(crate) fn mag_rem_word(&self, d: u32) -> u32 {
        magnitude::div_rem_word(&self.mag, d).1
    }
}

// ============================================================================
// Number Theory
// ============================================================================

const SMALL_PRIMES: [u32; 25] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97,
];

impl BigInteger {
    /// Greatest common divisor; always non-negative, `gcd(0, 0) == 0`.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn gcd(&self, other: &Self) -> Self {
        let mut a = self.mag.to_vec();
        let mut b = other.mag.to_vec();
        while !b.is_empty() {
            let (_, r) = magnitude::div_rem(&a, &b);
            a = b;
            b = r;
        }
        Self::from_parts(1, a)
    }

    /// `self^exponent mod m`, reducing after every squaring and
    /// multiplication. A negative exponent uses the modular inverse.
    ///
    /// # Errors
    /// Returns `ArithmeticError::NonPositiveModulus` if `m <= 0` and
    /// `ArithmeticError::NotInvertible` for a negative exponent when `self`
    /// has no inverse modulo `m`.
    pub fn mod_pow(&self, exponent: &Self, m: &Self) -> Result<Self, ArithmeticError> {
        if m.signum <= 0 {
            return Err(ArithmeticError::NonPositiveModulus);
        }
        if m.is_one() {
            return Ok(Self::ZERO);
        }
        let base = if exponent.is_negative() {
            self.mod_inverse(m)?
        } else {
            self.modulo(m)?
        };
        Ok(base.mod_pow_unchecked(&exponent.mag, m))
    }

    /// Square-and-multiply over the exponent magnitude; `self` must already
    /// be reduced modulo the positive `m`.
    fn mod_pow_unchecked(&self, exponent: &[u32], m: &Self) -> Self {
        let mut result = Self::ONE;
        for i in (0..magnitude::bit_length(exponent)).rev() {
            result = (&result * &result).mag_mod(m);
            if magnitude::test_bit(exponent, i) {
                result = (&result * self).mag_mod(m);
            }
        }
        result
    }

    /// Reduction of a non-negative value by a positive modulus.
    fn mag_mod(&self, m: &Self) -> Self {
        Self::from_parts(1, magnitude::div_rem(&self.mag, &m.mag).1)
    }

    /// Multiplicative inverse of `self` modulo `m`, in `[0, m)`.
    ///
    /// # Errors
    /// Returns `ArithmeticError::NonPositiveModulus` if `m <= 0` and
    /// `ArithmeticError::NotInvertible` if `gcd(self, m) != 1`.
    pub fn mod_inverse(&self, m: &Self) -> Result<Self, ArithmeticError> {
        if m.signum <= 0 {
            return Err(ArithmeticError::NonPositiveModulus);
        }
        if m.is_one() {
            return Ok(Self::ZERO);
        }
        // Extended Euclid tracking only the coefficient of `a`
        let (mut old_r, mut r) = (self.modulo(m)?, m.clone());
        let (mut old_s, mut s) = (Self::ONE, Self::ZERO);
        while !r.is_zero() {
            let (q, rem) = old_r.div_rem(&r)?;
            old_r = core::mem::replace(&mut r, rem);
            let next_s = &old_s - &(&q * &s);
            old_s = core::mem::replace(&mut s, next_s);
        }
        if !old_r.is_one() {
            return Err(ArithmeticError::NotInvertible);
        }
        old_s.modulo(m)
    }

    /// Floor square root.
    ///
    /// # Errors
    /// Returns `ArithmeticError::NegativeSquareRoot` if `self < 0`.
    pub fn sqrt(&self) -> Result<Self, ArithmeticError> {
        if self.is_negative() {
            return Err(ArithmeticError::NegativeSquareRoot);
        }
        Ok(Self::from_parts(1, magnitude::sqrt(&self.mag)))
    }

    /// `(s, self - s*s)` where `s` is the floor square root.
    pub fn sqrt_rem(&self) -> Result<(Self, Self), ArithmeticError> {
        let s = self.sqrt()?;
        let rem = self - &(&s * &s);
        Ok((s, rem))
    }

    /// Miller-Rabin test on `|self|`.
    ///
    /// Returns `true` when `certainty <= 0`. Witnesses are the leading small
    /// primes, `certainty / 2` of them (at least one), so the answer is
    /// deterministic. Not hardened against timing side-channels.
    pub fn is_probable_prime(&self, certainty: i32) -> bool {
        if certainty <= 0 {
            return true;
        }
        let w = self.abs();
        if w.mag.len() <= 1 {
            let v = w.low_u64() as u32;
            if v <= SMALL_PRIMES[SMALL_PRIMES.len() - 1] {
                return SMALL_PRIMES.contains(&v);
            }
        }
        if SMALL_PRIMES.iter().any(|&p| w.mag_rem_word(p) == 0) {
            return false;
        }
        let largest = SMALL_PRIMES[SMALL_PRIMES.len() - 1] as u64;
        if w.mag.len() <= 2 && w.low_u64() < largest * largest {
            return true;
        }

        let w_minus_one = &w - &Self::ONE;
        let s = magnitude::trailing_zeros(&w_minus_one.mag).unwrap_or(0);
        let d = magnitude::shr(&w_minus_one.mag, s as usize);
        let rounds = (certainty as usize).div_ceil(2).clamp(1, SMALL_PRIMES.len());

        'witness: for &a in &SMALL_PRIMES[..rounds] {
            let mut x = Self::from(a).mod_pow_unchecked(&d, &w);
            if x.is_one() || x == w_minus_one {
                continue;
            }
            for _ in 1..s {
                x = (&x * &x).mag_mod(&w);
                if x == w_minus_one {
                    continue 'witness;
                }
            }
            return false;
        }
        true
    }

    /// Smallest probable prime strictly greater than `self`.
    ///
    /// # Errors
    /// Returns `ArithmeticError::NegativeValue` if `self < 0`.
    pub fn next_probable_prime(&self) -> Result<Self, ArithmeticError> {
        if self.is_negative() {
            return Err(ArithmeticError::NegativeValue);
        }
        if magnitude::cmp(&self.mag, &[2]) == Ordering::Less {
            return Ok(Self::TWO);
        }
        let mut candidate = self + &Self::ONE;
        if !candidate.is_odd() {
            candidate = &candidate + &Self::ONE;
        }
        while !candidate.is_probable_prime(100) {
            candidate = &candidate + &Self::TWO;
        }
        Ok(candidate)
    }
}

// ============================================================================
// Bit Operations
// ============================================================================

impl BigInteger {
    /// Number of bits in the minimal two's-complement representation,
    /// excluding the sign bit.
    pub fn bit_length(&self) -> u64 {
        let len = magnitude::bit_length(&self.mag);
        if self.signum < 0 && magnitude::trailing_zeros(&self.mag) == Some(len - 1) {
            // -2^k needs one bit fewer than 2^k
            len - 1
        } else {
            len
        }
    }

    /// Number of bits that differ from the sign bit.
    pub fn bit_count(&self) -> u64 {
        let ones = |m: &[u32]| m.iter().map(|w| w.count_ones() as u64).sum::<u64>();
        if self.signum < 0 {
            ones(&self.mag_minus_one())
        } else {
            ones(&self.mag)
        }
    }

    /// Index of the rightmost one bit, `None` for zero.
    pub fn lowest_set_bit(&self) -> Option<u64> {
        magnitude::trailing_zeros(&self.mag)
    }

    /// Whether bit `n` of the two's-complement representation is set.
    pub fn test_bit(&self, n: u64) -> bool {
        if self.signum < 0 {
            !magnitude::test_bit(&self.mag_minus_one(), n)
        } else {
            magnitude::test_bit(&self.mag, n)
        }
    }

    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn set_bit(&self, n: u64) -> Self {
        self | &Self::single_bit(n)
    }

    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn clear_bit(&self, n: u64) -> Self {
        self.and_not(&Self::single_bit(n))
    }

    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn flip_bit(&self, n: u64) -> Self {
        self ^ &Self::single_bit(n)
    }

    fn single_bit(n: u64) -> Self {
        Self::from_parts(1, magnitude::shl(&[1], n as usize))
    }

    /// `self & !other`.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn and_not(&self, other: &Self) -> Self {
        self.bitwise(other, |a, b| a & !b)
    }

    /// `self * 2^n`; a negative `n` shifts right.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn shift_left(&self, n: i32) -> Self {
        if n >= 0 {
            self.shl_bits(n as u64)
        } else {
            self.shr_bits(n.unsigned_abs() as u64)
        }
    }

    /// `floor(self / 2^n)`; a negative `n` shifts left.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn shift_right(&self, n: i32) -> Self {
        if n >= 0 {
            self.shr_bits(n as u64)
        } else {
            self.shl_bits(n.unsigned_abs() as u64)
        }
    }

    fn shl_bits(&self, n: u64) -> Self {
        Self::from_parts(self.signum, magnitude::shl(&self.mag, n as usize))
    }

    fn shr_bits(&self, n: u64) -> Self {
        if self.signum >= 0 {
            return Self::from_parts(self.signum, magnitude::shr(&self.mag, n as usize));
        }
        // floor(-m / 2^n) == -(((m - 1) >> n) + 1)
        let shifted = magnitude::shr(&self.mag_minus_one(), n as usize);
        Self::from_parts(-1, magnitude::add(&shifted, &[1]))
    }
}

// ============================================================================
// Integer Conversions
// ============================================================================

impl BigInteger {
    /// Low-order 64 bits of the two's-complement representation.
    pub fn to_i64(&self) -> i64 {
        let low = self.low_u64() as i64;
        if self.signum < 0 { low.wrapping_neg() } else { low }
    }

    /// Low-order 32 bits of the two's-complement representation.
    pub fn to_i32(&self) -> i32 {
        self.to_i64() as i32
    }

    /// Returns an error if the value does not fit in an `i64`.
    pub fn to_i64_exact(&self) -> Result<i64, ArithmeticError> {
        if self.bit_length() <= 63 {
            Ok(self.to_i64())
        } else {
            Err(ArithmeticError::Overflow)
        }
    }

    /// Returns an error if the value does not fit in an `i32`.
    pub fn to_i32_exact(&self) -> Result<i32, ArithmeticError> {
        if self.bit_length() <= 31 {
            Ok(self.to_i32())
        } else {
            Err(ArithmeticError::Overflow)
        }
    }

    /// Returns an error if the value is negative or does not fit in a `u64`.
    pub fn to_u64_exact(&self) -> Result<u64, ArithmeticError> {
        if self.signum >= 0 && self.mag.len() <= 2 {
            Ok(self.low_u64())
        } else {
            Err(ArithmeticError::Overflow)
        }
    }
}

// ============================================================================
// Float Conversions
// ============================================================================

impl BigInteger {
    /// Nearest `f64`, ties to even; infinite when out of range.
    pub fn to_f64(&self) -> f64 {
        let (top, shift) = self.top_bits_with_sticky();
        let mut abs = top as f64;
        if shift > 0 {
            abs *= if shift <= 1023 {
                f64::from_bits((1023 + shift) << 52)
            } else {
                f64::INFINITY
            };
        }
        if self.signum < 0 { -abs } else { abs }
    }

    /// Nearest `f32`, ties to even; infinite when out of range.
    pub fn to_f32(&self) -> f32 {
        let (top, shift) = self.top_bits_with_sticky();
        let mut abs = top as f32;
        if shift > 0 {
            abs *= if shift <= 127 {
                f32::from_bits(((127 + shift) as u32) << 23)
            } else {
                f32::INFINITY
            };
        }
        if self.signum < 0 { -abs } else { abs }
    }

    /// The 64 most significant magnitude bits and the shift that restores
    /// their weight. Discarded one bits are folded into the lowest kept bit
    /// so the final `as` conversion rounds exactly once.
    fn top_bits_with_sticky(&self) -> (u64, u64) {
        let len = magnitude::bit_length(&self.mag);
        if len <= 64 {
            return (self.low_u64(), 0);
        }
        let shift = len - 64;
        let shifted = magnitude::shr(&self.mag, shift as usize);
        let mut top = ((shifted[1] as u64) << 32) | shifted[0] as u64;
        if magnitude::any_low_bits(&self.mag, shift) {
            top |= 1;
        }
        (top, shift)
    }
}

// ============================================================================
// String Parsing
// ============================================================================

impl BigInteger {
    /// Parses an optionally signed (`-` or `+`) digit string in `radix`.
    ///
    /// Digits above 9 are the letters `a-z`, in either case. Leading zeros
    /// are accepted and do not affect the result.
    ///
    /// # Errors
    /// Returns `ParseError::InvalidRadix` for a radix outside `2..=36`,
    /// `ParseError::Empty` if there are no digits, and
    /// `ParseError::InvalidDigit` for any character that is not a digit of
    /// `radix`.
    pub fn parse_radix(s: &str, radix: u32) -> Result<Self, ParseError> {
        if !(2..=36).contains(&radix) {
            return Err(ParseError::InvalidRadix(radix));
        }
        let (signum, digits) = match s.as_bytes().first() {
            Some(b'-') => (-1, &s[1..]),
            Some(b'+') => (1, &s[1..]),
            _ => (1, s),
        };
        if digits.is_empty() {
            return Err(ParseError::Empty);
        }
        let values = digits
            .chars()
            .map(|c| {
                c.to_digit(radix)
                    .map(|d| d as u8)
                    .ok_or(ParseError::InvalidDigit { digit: c, radix })
            })
            .collect::<Result<Vec<u8>, _>>()?;
        Ok(Self::from_parts(
            signum,
            magnitude::from_radix_digits(&values, radix),
        ))
    }
}

impl FromStr for BigInteger {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_radix(s, 10)
    }
}

// ============================================================================
// Formatting
// ============================================================================

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

impl BigInteger {
    /// Shortest representation in `radix`: lowercase digits, a leading `-`
    /// for negative values, `"0"` for zero.
    ///
    /// # Panics
    /// Panics if `radix` is outside `2..=36`.
    pub fn to_string_radix(&self, radix: u32) -> String {
        let mut out = String::new();
        if self.signum < 0 {
            out.push('-');
        }
        out.push_str(&self.abs_digits(radix));
        out
    }

    pub(crate) fn abs_digits(&self, radix: u32) -> String {
        assert!((2..=36).contains(&radix), "radix must be in 2..=36");
        magnitude::to_radix_digits(&self.mag, radix)
            .into_iter()
            .map(|d| DIGITS[d as usize] as char)
            .collect()
    }
}

impl fmt::Display for BigInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad_integral(self.signum >= 0, "", &self.abs_digits(10))
    }
}

impl fmt::Debug for BigInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            // {:#?} shows raw internals
            f.debug_struct("BigInteger")
                .field("signum", &self.signum)
                .field("mag", &&*self.mag)
                .finish()
        } else {
            write!(f, "BigInteger({})", self)
        }
    }
}

impl fmt::LowerHex for BigInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad_integral(self.signum >= 0, "0x", &self.abs_digits(16))
    }
}

impl fmt::UpperHex for BigInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad_integral(
            self.signum >= 0,
            "0x",
            &self.abs_digits(16).to_ascii_uppercase(),
        )
    }
}

impl fmt::Binary for BigInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad_integral(self.signum >= 0, "0b", &self.abs_digits(2))
    }
}

impl fmt::Octal for BigInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad_integral(self.signum >= 0, "0o", &self.abs_digits(8))
    }
}

// ============================================================================
// Comparison
// ============================================================================

impl Ord for BigInteger {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.signum.cmp(&other.signum) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
        let by_mag = magnitude::cmp(&self.mag, &other.mag);
        if self.signum < 0 { by_mag.reverse() } else { by_mag }
    }
}

impl PartialOrd for BigInteger {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ============================================================================
// Operator Overloading
// ============================================================================

macro_rules! forward_binop {
    (impl $imp:ident, $method:ident, $inner:ident) => {
        impl $imp<&BigInteger> for &BigInteger {
            type Output = BigInteger;

            #[inline]
            fn $method(self, rhs: &BigInteger) -> BigInteger {
                self.$inner(rhs)
            }
        }

        impl $imp<BigInteger> for &BigInteger {
            type Output = BigInteger;

            #[inline]
            fn $method(self, rhs: BigInteger) -> BigInteger {
                self.$inner(&rhs)
            }
        }

        impl $imp<&BigInteger> for BigInteger {
            type Output = BigInteger;

            #[inline]
            fn $method(self, rhs: &BigInteger) -> BigInteger {
                (&self).$inner(rhs)
            }
        }

        impl $imp<BigInteger> for BigInteger {
            type Output = BigInteger;

            #[inline]
            fn $method(self, rhs: BigInteger) -> BigInteger {
                (&self).$inner(&rhs)
            }
        }
    };
}

macro_rules! forward_assign {
    (impl $imp:ident, $method:ident, $op:tt) => {
        impl $imp<&BigInteger> for BigInteger {
            #[inline]
            fn $method(&mut self, rhs: &BigInteger) {
                *self = &*self $op rhs;
            }
        }

        impl $imp<BigInteger> for BigInteger {
            #[inline]
            fn $method(&mut self, rhs: BigInteger) {
                *self = &*self $op &rhs;
            }
        }
    };
}

impl BigInteger {
    fn div_or_panic(&self, rhs: &Self) -> Self {
        self.try_div(rhs).expect("attempt to divide by zero")
    }

    fn rem_or_panic(&self, rhs: &Self) -> Self {
        self.try_rem(rhs)
            .expect("attempt to calculate the remainder with a divisor of zero")
    }

    fn and_impl(&self, rhs: &Self) -> Self {
        self.bitwise(rhs, |a, b| a & b)
    }

    fn or_impl(&self, rhs: &Self) -> Self {
        self.bitwise(rhs, |a, b| a | b)
    }

    fn xor_impl(&self, rhs: &Self) -> Self {
        self.bitwise(rhs, |a, b| a ^ b)
    }
}

forward_binop!(impl Add, add, add_impl);
forward_binop!(impl Sub, sub, sub_impl);
forward_binop!(impl Mul, mul, mul_impl);
forward_binop!(impl Div, div, div_or_panic);
forward_binop!(impl Rem, rem, rem_or_panic);
forward_binop!(impl BitAnd, bitand, and_impl);
forward_binop!(impl BitOr, bitor, or_impl);
forward_binop!(impl BitXor, bitxor, xor_impl);

forward_assign!(impl AddAssign, add_assign, +);
forward_assign!(impl SubAssign, sub_assign, -);
forward_assign!(impl MulAssign, mul_assign, *);
forward_assign!(impl DivAssign, div_assign, /);
forward_assign!(impl RemAssign, rem_assign, %);

impl Neg for BigInteger {
    type Output = BigInteger;

    #[inline]
    fn neg(mut self) -> BigInteger {
        self.signum = -self.signum;
        self
    }
}

impl Neg for &BigInteger {
    type Output = BigInteger;

    #[inline]
    fn neg(self) -> BigInteger {
        self.negate()
    }
}

impl Not for &BigInteger {
    type Output = BigInteger;

    /// `!x == -x - 1`
    fn not(self) -> BigInteger {
        &self.negate() - &BigInteger::ONE
    }
}

impl Not for BigInteger {
    type Output = BigInteger;

    fn not(self) -> BigInteger {
        !&self
    }
}

impl Shl<u32> for &BigInteger {
    type Output = BigInteger;

    fn shl(self, n: u32) -> BigInteger {
        self.shl_bits(n as u64)
    }
}

impl Shl<u32> for BigInteger {
    type Output = BigInteger;

    fn shl(self, n: u32) -> BigInteger {
        self.shl_bits(n as u64)
    }
}

impl Shr<u32> for &BigInteger {
    type Output = BigInteger;

    fn shr(self, n: u32) -> BigInteger {
        self.shr_bits(n as u64)
    }
}

impl Shr<u32> for BigInteger {
    type Output = BigInteger;

    fn shr(self, n: u32) -> BigInteger {
        self.shr_bits(n as u64)
    }
}

// ============================================================================
// Standard Library Trait Implementations
// ============================================================================

macro_rules! impl_from_primitive {
    ($via:ident: $($t:ty),*) => {
        $(
            impl From<$t> for BigInteger {
                #[inline]
                fn from(value: $t) -> Self {
                    Self::$via(value as _)
                }
            }
        )*
    };
}

impl_from_primitive!(from_i128: i8, i16, i32, i64, i128, isize);
impl_from_primitive!(from_u128: u8, u16, u32, u64, u128, usize);

impl TryFrom<&BigInteger> for i64 {
    type Error = ArithmeticError;

    fn try_from(value: &BigInteger) -> Result<Self, Self::Error> {
        value.to_i64_exact()
    }
}

impl TryFrom<&BigInteger> for i32 {
    type Error = ArithmeticError;

    fn try_from(value: &BigInteger) -> Result<Self, Self::Error> {
        value.to_i32_exact()
    }
}

impl TryFrom<&BigInteger> for u64 {
    type Error = ArithmeticError;

    fn try_from(value: &BigInteger) -> Result<Self, Self::Error> {
        value.to_u64_exact()
    }
}

// ============================================================================
// Iterator Trait Implementations
// ============================================================================

impl Sum for BigInteger {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, x| &acc + &x)
    }
}

impl<'a> Sum<&'a BigInteger> for BigInteger {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, x| &acc + x)
    }
}

impl Product for BigInteger {
    fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ONE, |acc, x| &acc * &x)
    }
}

impl<'a> Product<&'a BigInteger> for BigInteger {
    fn product<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::ONE, |acc, x| &acc * x)
    }
}

// ============================================================================
// Serde Support
// ============================================================================

#[cfg(feature = "serde")]
impl Serialize for BigInteger {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            // JSON, TOML, etc. - decimal string
            serializer.collect_str(self)
        } else {
            // Bincode, MessagePack, etc. - two's-complement bytes
            serializer.serialize_bytes(&self.to_be_bytes())
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for BigInteger {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct BigIntegerVisitor;

        impl<'de> de::Visitor<'de> for BigIntegerVisitor {
            type Value = BigInteger;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an integer string or two's-complement bytes")
            }

            fn visit_str<E>(self, v: &str) -> core::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                v.parse().map_err(de::Error::custom)
            }

            fn visit_bytes<E>(self, v: &[u8]) -> core::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(BigInteger::from_be_bytes(v))
            }

            fn visit_seq<A>(self, mut seq: A) -> core::result::Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut bytes = Vec::new();
                while let Some(b) = seq.next_element::<u8>()? {
                    bytes.push(b);
                }
                Ok(BigInteger::from_be_bytes(&bytes))
            }
        }

        if deserializer.is_human_readable() {
            deserializer.deserialize_str(BigIntegerVisitor)
        } else {
            deserializer.deserialize_bytes(BigIntegerVisitor)
        }
    }
}


#[cfg(test)]
mod arithmetic_tests {
    use super::*;

    fn big(s: &str) -> BigInteger {
        s.parse().unwrap()
    }

    #[test]
    fn test_add_mixed_signs() {
        assert_eq!(&big("5") + &big("-3"), big("2"));
        assert_eq!(&big("-5") + &big("3"), big("-2"));
        assert_eq!(&big("-5") + &big("-3"), big("-8"));
        assert_eq!(&big("3") + &big("-5"), big("-2"));
        assert_eq!(&big("0") + &big("-5"), big("-5"));
    }

    #[test]
    fn test_add_carry_propagation() {
        let a = big("18446744073709551615"); // 2^64 - 1
        assert_eq!(&a + &BigInteger::ONE, big("18446744073709551616"));
        assert_eq!(&big("18446744073709551616") - &BigInteger::ONE, a);
    }

    #[test]
    fn test_sub() {
        assert_eq!(&big("3") - &big("5"), big("-2"));
        assert_eq!(&big("-3") - &big("-5"), big("2"));
        assert_eq!(
            &big("100000000000000000000000000000") - &big("1"),
            big("99999999999999999999999999999")
        );
    }

    #[test]
    fn test_mul_signs() {
        assert_eq!(&big("-4") * &big("5"), big("-20"));
        assert_eq!(&big("-4") * &big("-5"), big("20"));
        assert_eq!(&big("-4") * &BigInteger::ZERO, BigInteger::ZERO);
        assert_eq!((&big("-4") * &BigInteger::ZERO).signum(), 0);
    }

    #[test]
    fn test_mul_large() {
        let a = big("123456789012345678901234567890");
        let b = big("987654321098765432109876543210");
        assert_eq!(
            &a * &b,
            big("121932631137021795226185032733622923332237463801111263526900")
        );
    }

    #[test]
    fn test_mul_karatsuba_sized() {
        // 2^(32*60) - 1 squared, large enough for the Karatsuba path
        let m = &(BigInteger::ONE << (32 * 60)) - &BigInteger::ONE;
        let expected = &(&(BigInteger::ONE << (64 * 60)) - &(BigInteger::ONE << (32 * 60 + 1)))
            + &BigInteger::ONE;
        assert_eq!(&m * &m, expected);
    }

    #[test]
    fn test_pow() {
        assert_eq!(BigInteger::TWO.pow(100), big("1267650600228229401496703205376"));
        assert_eq!(big("-3").pow(3), big("-27"));
        assert_eq!(big("-3").pow(4), big("81"));
        assert_eq!(BigInteger::ZERO.pow(0), BigInteger::ONE);
        assert_eq!(BigInteger::ZERO.pow(5), BigInteger::ZERO);
        assert_eq!(BigInteger::TEN.try_pow(3), Ok(big("1000")));
        assert_eq!(
            BigInteger::TEN.try_pow(-1),
            Err(ArithmeticError::NegativeExponent)
        );
    }

    #[test]
    fn test_operators_and_assign() {
        let mut x = big("10");
        x += &big("5");
        x -= big("3");
        x *= &big("4");
        x /= &big("5");
        x %= big("7");
        assert_eq!(x, big("2"));
        assert_eq!(-x.clone(), big("-2"));
        assert_eq!(-&x, big("-2"));
    }

    #[test]
    fn test_sum_product() {
        let values = [big("1"), big("2"), big("3"), big("4")];
        assert_eq!(values.iter().sum::<BigInteger>(), big("10"));
        assert_eq!(values.iter().product::<BigInteger>(), big("24"));
        assert_eq!(values.into_iter().product::<BigInteger>(), big("24"));
    }

    #[test]
    fn test_factorial_and_fibonacci() {
        let factorial: BigInteger = (1..=30).map(BigInteger::from).product();
        assert_eq!(factorial, big("265252859812191058636308480000000"));

        let (mut prev, mut curr) = (BigInteger::ONE, BigInteger::ONE);
        for _ in 2..=100 {
            let next = &curr + &prev;
            prev = core::mem::replace(&mut curr, next);
        }
        assert_eq!(curr, big("573147844013817084101"));
    }

    #[test]
    fn test_ordering() {
        let mut values = [big("5"), big("-10"), big("0"), big("100000000000"), big("-3")];
        values.sort();
        assert_eq!(
            values,
            [big("-10"), big("-3"), big("0"), big("5"), big("100000000000")]
        );
        assert!(big("-100000000000") < big("-1"));
        assert_eq!(big("4").min(big("-4")), big("-4"));
        assert_eq!(big("4").max(big("-4")), big("4"));
    }
}







#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn test_serialize() {
        let v: BigInteger = "-123456789012345678901234567890".parse().unwrap();
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#""-123456789012345678901234567890""#);
    }

    #[test]
    fn test_deserialize() {
        let v: BigInteger = serde_json::from_str(r#""42""#).unwrap();
        assert_eq!(v, BigInteger::from(42));
        assert!(serde_json::from_str::<BigInteger>(r#""4x2""#).is_err());
    }

    #[test]
    fn test_bincode_round_trip() {
        for s in [
            "-123456789012345678901234567890",
            "0",
            "255",
            "-128",
            "-4294967296",
            "340282366920938463463374607431768211456",
        ] {
            let v: BigInteger = s.parse().unwrap();
            let bytes = bincode::serialize(&v).unwrap();
            assert_eq!(bincode::deserialize::<BigInteger>(&bytes).unwrap(), v, "{s}");
        }
    }

    #[test]
    fn test_bincode_writes_twos_complement_bytes() {
        // u64 length prefix, then the big-endian bytes
        let bytes = bincode::serialize(&BigInteger::from(-1)).unwrap();
        assert_eq!(bytes, [1, 0, 0, 0, 0, 0, 0, 0, 0xFF]);
        let bytes = bincode::serialize(&BigInteger::ZERO).unwrap();
        assert_eq!(bytes, [1, 0, 0, 0, 0, 0, 0, 0, 0x00]);
    }
}
