use core::cmp::Ordering;
use core::fmt;
use core::iter::{Product, Sum};
use core::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Rem, Sub, SubAssign};
use core::str::FromStr;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::big_integer::BigInteger;
use crate::magnitude;
use crate::rounding::{MathContext, RoundingMode};
use crate::{ArithmeticError, ParseError};

/// Arbitrary-precision signed decimal: `unscaled × 10^(-scale)`.
///
/// Equality and hashing compare the representation, so `1.0` and `1.00`
/// are different values under `==`. Numeric comparison is
/// [`cmp_value`](Self::cmp_value); there is deliberately no `Ord`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BigDecimal {
    int_val: BigInteger,
    scale: i32,
}

// ============================================================================
// Constants
// ============================================================================

const PI_WORDS: &[u32] = &[
    0x5c818030, 0xdeef99c2, 0x23395996, 0x146fcbaa, 0x4341a853, 0x587ae4d5, 0x0cc8c28c,
    0xb20c734d, 0xd22c79a6, 0x7af30bd5, 0xe6aa7551, 0x9f74b1d4, 0x0ed92700, 0xd668875e,
    0x01d827e4, 0x8431a111, 0xfc683a86, 0x101abd7f, 0x1c2d3258, 0xa3361311, 0x9d0a300a,
    0xabbbf528, 0x7eb98cde, 0xa3eca482, 0x5b0f60f0, 0xaddb075d, 0x0001ac80,
];

const E_WORDS: &[u32] = &[
    0x1e07a858, 0xebdbddc0, 0x03f2abde, 0xd10408d8, 0x1620117d, 0xceacfc5e, 0x4166008e,
    0xfe16e8a3, 0x048f8fe1, 0x6ca03251, 0xa7b58e01, 0x86a9e37e, 0xf1db363a, 0x7312dec2,
    0xd5da6540, 0x91a7c694, 0xee5e6f67, 0xdd9a876a, 0x9fc4915e, 0xdaf269b8, 0x061ab975,
    0x509a6423, 0x49d0e196, 0xd594b984, 0x04dd0bad, 0xb5210972, 0x000172c3,
];

impl BigDecimal {
    /// Zero (scale 0)
    pub const ZERO: Self = Self::from_parts(BigInteger::ZERO, 0);

    /// One (scale 0)
    pub const ONE: Self = Self::from_parts(BigInteger::ONE, 0);

    /// Two (scale 0)
    pub const TWO: Self = Self::from_parts(BigInteger::TWO, 0);

    /// Ten (scale 0)
    pub const TEN: Self = Self::from_parts(BigInteger::TEN, 0);

    /// 0.5
    pub const ONE_HALF: Self = Self::from_parts(BigInteger::from_static(1, &[5]), 1);

    /// 0.1
    pub const ONE_TENTH: Self = Self::from_parts(BigInteger::ONE, 1);

    /// π to 256 significant digits
    pub const PI: Self = Self::from_parts(BigInteger::from_static(1, PI_WORDS), 255);

    /// Euler's number to 256 significant digits
    pub const E: Self = Self::from_parts(BigInteger::from_static(1, E_WORDS), 255);
}

// ============================================================================
// Decimal Helpers
// ============================================================================

/// `10^n`.
fn ten_pow(n: u32) -> BigInteger {
    if n < 20 {
        BigInteger::from(10u64.pow(n))
    } else {
        BigInteger::TEN.pow(n)
    }
}

#[inline]
fn mul_ten_pow(value: &BigInteger, n: u32) -> BigInteger {
    if n == 0 { value.clone() } else { value * &ten_pow(n) }
}

/// Number of decimal digits in `|value|`; zero has one digit.
fn digit_count(value: &BigInteger) -> u32 {
    if value.is_zero() {
        return 1;
    }
    // floor(log10(2) * (bits + 1)) is either the digit count or one short
    let bits = magnitude::bit_length(value.magnitude());
    let r = (((bits + 1) * 646_456_993) >> 31) as u32;
    if magnitude::cmp(value.magnitude(), ten_pow(r).magnitude()) == Ordering::Less {
        r
    } else {
        r + 1
    }
}

#[inline]
fn check_scale(scale: i64) -> Result<i32, ArithmeticError> {
    i32::try_from(scale).map_err(|_| ArithmeticError::ScaleOverflow)
}

#[inline]
fn saturate_scale(scale: i64) -> i32 {
    scale.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Distance between two scales as a power-of-ten exponent.
#[inline]
fn scale_distance(delta: i64) -> Result<u32, ArithmeticError> {
    u32::try_from(delta.unsigned_abs()).map_err(|_| ArithmeticError::ScaleOverflow)
}

/// Divides and rounds the quotient according to `mode`.
fn divide_and_round(
    dividend: &BigInteger,
    divisor: &BigInteger,
    mode: RoundingMode,
) -> Result<BigInteger, ArithmeticError> {
    divide_and_round_checked(dividend, divisor, mode).map(|(q, _)| q)
}

/// Divides and rounds, also reporting whether the division was exact.
///
/// The remainder is compared with half the divisor, so the decision is
/// exact whatever the size of the operands.
fn divide_and_round_checked(
    dividend: &BigInteger,
    divisor: &BigInteger,
    mode: RoundingMode,
) -> Result<(BigInteger, bool), ArithmeticError> {
    let (q, r) = dividend.div_rem(divisor)?;
    if r.is_zero() {
        return Ok((q, true));
    }
    let negative = dividend.signum() != divisor.signum();
    let twice_r = magnitude::shl(r.magnitude(), 1);
    let half_cmp = magnitude::cmp(&twice_r, divisor.magnitude());
    match mode.increments(negative, half_cmp, q.is_odd()) {
        Some(true) if negative => Ok((&q - &BigInteger::ONE, false)),
        Some(true) => Ok((&q + &BigInteger::ONE, false)),
        Some(false) => Ok((q, false)),
        None => {
            trace_event!(trace, %dividend, %divisor, "rounding necessary under UNNECESSARY");
            Err(ArithmeticError::RoundingNecessary)
        }
    }
}

// ============================================================================
// Constructors and Accessors
// ============================================================================

impl Default for BigDecimal {
    fn default() -> Self {
        Self::ZERO
    }
}

impl BigDecimal {
    const fn from_parts(int_val: BigInteger, scale: i32) -> Self {
        Self { int_val, scale }
    }

    /// Creates `unscaled × 10^(-scale)`.
    #[inline]
    pub fn new(unscaled: BigInteger, scale: i32) -> Self {
        Self::from_parts(unscaled, scale)
    }

    #[inline(always)]
    pub fn unscaled_value(&self) -> &BigInteger {
        &self.int_val
    }

    #[inline(always)]
    pub const fn scale(&self) -> i32 {
        self.scale
    }

    /// Number of significant decimal digits of the unscaled value; zero has
    /// precision 1.
    pub fn precision(&self) -> u32 {
        digit_count(&self.int_val)
    }

    #[inline(always)]
    pub const fn signum(&self) -> i32 {
        self.int_val.signum()
    }

    #[inline(always)]
    pub const fn is_zero(&self) -> bool {
        self.int_val.is_zero()
    }

    /// One unit in the last place: `1 × 10^(-scale)`.
    pub fn ulp(&self) -> Self {
        Self::new(BigInteger::ONE, self.scale)
    }

    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn abs(&self) -> Self {
        Self::new(self.int_val.abs(), self.scale)
    }

    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn negate(&self) -> Self {
        Self::new(self.int_val.negate(), self.scale)
    }

    /// Same as [`round`](Self::round).
    pub fn plus_ctx(&self, mc: &MathContext) -> Result<Self, ArithmeticError> {
        self.round(mc)
    }
}

// ============================================================================
// Float Conversions - From
// ============================================================================

impl BigDecimal {
    /// Exact decimal expansion of the binary value of `value`.
    ///
    /// `0.1` becomes `0.1000000000000000055511151231257827021181583404541015625`.
    ///
    /// # Errors
    /// Returns `ParseError::NonFinite` for NaN and infinities.
    pub fn from_f64(value: f64) -> Result<Self, ParseError> {
        if !value.is_finite() {
            return Err(ParseError::NonFinite);
        }
        let bits = value.to_bits();
        let negative = bits >> 63 == 1;
        let biased = ((bits >> 52) & 0x7FF) as i32;
        let mut mantissa = bits & ((1u64 << 52) - 1);
        let mut exponent = if biased == 0 {
            1 - 1075
        } else {
            mantissa |= 1 << 52;
            biased - 1075
        };
        if mantissa == 0 {
            return Ok(Self::ZERO);
        }
        let tz = mantissa.trailing_zeros();
        mantissa >>= tz;
        exponent += tz as i32;

        let m = BigInteger::from(mantissa);
        let abs = if exponent >= 0 {
            Self::new(m.shift_left(exponent), 0)
        } else {
            // m / 2^k == m * 5^k / 10^k
            let k = exponent.unsigned_abs();
            Self::new(&m * &BigInteger::from(5).pow(k), k as i32)
        };
        Ok(if negative { abs.negate() } else { abs })
    }

    /// Decimal value of the shortest text that round-trips `value` widened
    /// to `f64`, laid out with at least one fraction digit. `0.1f32`
    /// becomes `0.10000000149011612`, `1.0f32` becomes `1.0`. When two
    /// shortest digit strings are equally near, the one ending in an even
    /// digit is used.
    ///
    /// # Errors
    /// Returns `ParseError::NonFinite` for NaN and infinities.
    pub fn from_f32(value: f32) -> Result<Self, ParseError> {
        if !value.is_finite() {
            return Err(ParseError::NonFinite);
        }
        let wide = (value as f64).abs();
        let text = format!("{:e}", wide);
        let (mantissa, exponent) = text.split_once('e').ok_or(ParseError::MalformedDecimal)?;
        let exponent: i64 = exponent.parse().map_err(|_| ParseError::MalformedDecimal)?;
        let digits: Vec<u8> = mantissa
            .bytes()
            .filter(u8::is_ascii_digit)
            .map(|b| b - b'0')
            .collect();
        let n = digits.len() as i64;
        let digit_scale = i32::try_from(n - 1 - exponent).map_err(|_| ParseError::ScaleOverflow)?;
        let mut unscaled = BigInteger::from_parts(1, magnitude::from_radix_digits(&digits, 10));
        if unscaled.is_odd() {
            unscaled = Self::even_tie_partner(wide, unscaled, digit_scale)?;
        }

        // Plain layout between 10^-3 and 10^7, scientific outside
        let fraction_digits = if wide == 0.0 || (1e-3..1e7).contains(&wide) {
            (n - 1 - exponent).max(1)
        } else {
            (n - 1).max(1) - exponent
        };
        let padding = (fraction_digits - (n - 1 - exponent)) as u32;
        let scale = i32::try_from(fraction_digits).map_err(|_| ParseError::ScaleOverflow)?;
        let abs = Self::new(mul_ten_pow(&unscaled, padding), scale);
        Ok(if value.is_sign_negative() { abs.negate() } else { abs })
    }

    /// The even neighbour of `shortest × 10^(-scale)` when it is exactly as
    /// near to `value` and reads back as `value`; `shortest` otherwise.
    fn even_tie_partner(
        value: f64,
        shortest: BigInteger,
        scale: i32,
    ) -> Result<BigInteger, ParseError> {
        let exact = Self::from_f64(value)?;
        let distance = |unscaled: &BigInteger| (&exact - &Self::new(unscaled.clone(), scale)).abs();
        let nearest = distance(&shortest);
        let width = digit_count(&shortest);
        for neighbour in [&shortest - &BigInteger::ONE, &shortest + &BigInteger::ONE] {
            if neighbour.is_zero() || digit_count(&neighbour) != width {
                continue;
            }
            if distance(&neighbour).eq_value(&nearest)
                && Self::new(neighbour.clone(), scale).to_f64() == value
            {
                return Ok(neighbour);
            }
        }
        Ok(shortest)
    }
}

// ============================================================================
// String Parsing
// ============================================================================

fn ascii_digits(s: &str) -> Result<Vec<u8>, ParseError> {
    s.bytes()
        .map(|b| {
            if b.is_ascii_digit() {
                Ok(b - b'0')
            } else {
                Err(ParseError::MalformedDecimal)
            }
        })
        .collect()
}

impl BigDecimal {
    /// Parses `[+-]? digits ['.' digits] ([eE] [+-]? digits)?`.
    ///
    /// The significand needs at least one digit on either side of the
    /// point. The scale is the number of fraction digits minus the
    /// exponent, so trailing zeros are kept: `"1.50"` has scale 2.
    ///
    /// # Errors
    /// Returns `ParseError::Empty` for an empty string,
    /// `ParseError::MalformedDecimal` for anything outside the grammar and
    /// `ParseError::ScaleOverflow` when the scale does not fit an `i32`.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        if s.is_empty() {
            return Err(ParseError::Empty);
        }
        let (negative, body) = match s.as_bytes()[0] {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };
        let (significand, exponent) = match body.find(['e', 'E']) {
            Some(i) => (&body[..i], Some(&body[i + 1..])),
            None => (body, None),
        };
        let (int_part, frac_part) = significand.split_once('.').unwrap_or((significand, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(ParseError::MalformedDecimal);
        }
        let mut digits = ascii_digits(int_part)?;
        digits.extend(ascii_digits(frac_part)?);

        let exponent = match exponent {
            None => 0,
            Some(e) => {
                let unsigned = e.strip_prefix(['+', '-']).unwrap_or(e);
                let value = ascii_digits(unsigned)?
                    .into_iter()
                    .try_fold(0i64, |acc, d| {
                        acc.checked_mul(10)
                            .and_then(|v| v.checked_add(d as i64))
                            .filter(|v| *v <= u32::MAX as i64)
                    })
                    .ok_or(ParseError::ScaleOverflow)?;
                if unsigned.is_empty() {
                    return Err(ParseError::MalformedDecimal);
                }
                if e.starts_with('-') { -value } else { value }
            }
        };
        let scale = i32::try_from(frac_part.len() as i64 - exponent)
            .map_err(|_| ParseError::ScaleOverflow)?;

        let unscaled = BigInteger::from_parts(
            if negative { -1 } else { 1 },
            magnitude::from_radix_digits(&digits, 10),
        );
        Ok(Self::new(unscaled, scale))
    }

    /// Parses, then rounds to `mc`.
    pub fn parse_with_context(s: &str, mc: &MathContext) -> crate::Result<Self> {
        Ok(Self::parse(s)?.round(mc)?)
    }
}

impl FromStr for BigDecimal {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ============================================================================
// Canonicalization and Comparison
// ============================================================================

impl BigDecimal {
    /// Removes trailing zero digits while the scale stays above `preferred`.
    fn strip_zeros_to(&self, preferred: i64) -> Self {
        let mut int_val = self.int_val.clone();
        let mut scale = self.scale;
        while !int_val.is_zero() && scale as i64 > preferred && scale > i32::MIN {
            let (q, r) = magnitude::div_rem_word(int_val.magnitude(), 10);
            if r != 0 {
                break;
            }
            int_val = BigInteger::from_parts(int_val.signum() as i8, q);
            scale -= 1;
        }
        Self::new(int_val, scale)
    }

    /// Numerically equal value with no trailing zeros in the unscaled
    /// value. Zero becomes [`BigDecimal::ZERO`]. The scale may go negative:
    /// `100` becomes `1E+2`.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn strip_trailing_zeros(&self) -> Self {
        if self.is_zero() {
            return Self::ZERO;
        }
        self.strip_zeros_to(i64::MIN)
    }

    /// Numeric comparison, ignoring scale: `1.0` and `1.00` are `Equal`.
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        match self.signum().cmp(&other.signum()) {
            Ordering::Equal if self.is_zero() => return Ordering::Equal,
            Ordering::Equal => {}
            unequal => return unequal,
        }
        // Leading digit positions decide unless they coincide
        let adjusted = |d: &Self| d.precision() as i64 - d.scale as i64;
        let by_magnitude = match adjusted(self).cmp(&adjusted(other)) {
            Ordering::Equal => {
                let (a, b) = self.aligned(other);
                magnitude::cmp(a.magnitude(), b.magnitude())
            }
            unequal => unequal,
        };
        if self.signum() < 0 { by_magnitude.reverse() } else { by_magnitude }
    }

    /// Numeric equality, ignoring scale.
    pub fn eq_value(&self, other: &Self) -> bool {
        self.cmp_value(other) == Ordering::Equal
    }

    /// Both unscaled values brought to the larger of the two scales.
    fn aligned(&self, other: &Self) -> (BigInteger, BigInteger) {
        match self.scale.cmp(&other.scale) {
            Ordering::Equal => (self.int_val.clone(), other.int_val.clone()),
            Ordering::Less => {
                let n = (other.scale as i64 - self.scale as i64) as u32;
                (mul_ten_pow(&self.int_val, n), other.int_val.clone())
            }
            Ordering::Greater => {
                let n = (self.scale as i64 - other.scale as i64) as u32;
                (self.int_val.clone(), mul_ten_pow(&other.int_val, n))
            }
        }
    }
}

// ============================================================================
// Rounding and Scale Manipulation
// ============================================================================

impl BigDecimal {
    /// Rounds to `mc.precision()` significant digits. Unlimited precision,
    /// or a value that already fits, is returned unchanged.
    ///
    /// # Errors
    /// `RoundingNecessary` under `Unnecessary` when digits would be lost;
    /// `ScaleOverflow` when the new scale leaves the `i32` range.
    pub fn round(&self, mc: &MathContext) -> Result<Self, ArithmeticError> {
        let precision = mc.precision();
        let current = self.precision();
        if precision == 0 || current <= precision {
            return Ok(self.clone());
        }
        let dropped = current - precision;
        let mut scale = self.scale as i64 - dropped as i64;
        let mut q = divide_and_round(&self.int_val, &ten_pow(dropped), mc.rounding_mode())?;
        if digit_count(&q) > precision {
            // Carried into a new digit: 10^precision, exactly divisible
            let (digits, _) = magnitude::div_rem_word(q.magnitude(), 10);
            q = BigInteger::from_parts(q.signum() as i8, digits);
            scale -= 1;
        }
        Ok(Self::new(q, check_scale(scale)?))
    }

    /// Value with exactly `new_scale` fraction digits, rounding if digits are
    /// dropped.
    ///
    /// # Errors
    /// `RoundingNecessary` under `Unnecessary` when digits would be lost.
    pub fn set_scale(&self, new_scale: i32, mode: RoundingMode) -> Result<Self, ArithmeticError> {
        let delta = new_scale as i64 - self.scale as i64;
        let n = scale_distance(delta)?;
        let int_val = match delta.cmp(&0) {
            Ordering::Equal => return Ok(self.clone()),
            Ordering::Greater => mul_ten_pow(&self.int_val, n),
            Ordering::Less => divide_and_round(&self.int_val, &ten_pow(n), mode)?,
        };
        Ok(Self::new(int_val, new_scale))
    }

    /// [`set_scale`](Self::set_scale) that refuses to round.
    pub fn set_scale_exact(&self, new_scale: i32) -> Result<Self, ArithmeticError> {
        self.set_scale(new_scale, RoundingMode::Unnecessary)
    }

    /// Divides by `10^n` by moving the decimal point; the result scale is
    /// never negative.
    pub fn move_point_left(&self, n: i32) -> Result<Self, ArithmeticError> {
        self.moved_point(self.scale as i64 + n as i64)
    }

    /// Multiplies by `10^n` by moving the decimal point; the result scale is
    /// never negative.
    pub fn move_point_right(&self, n: i32) -> Result<Self, ArithmeticError> {
        self.moved_point(self.scale as i64 - n as i64)
    }

    fn moved_point(&self, new_scale: i64) -> Result<Self, ArithmeticError> {
        let moved = Self::new(self.int_val.clone(), check_scale(new_scale)?);
        if moved.scale < 0 { moved.set_scale_exact(0) } else { Ok(moved) }
    }

    /// `self × 10^n`, adjusting only the scale.
    pub fn scale_by_power_of_ten(&self, n: i32) -> Result<Self, ArithmeticError> {
        Ok(Self::new(
            self.int_val.clone(),
            check_scale(self.scale as i64 - n as i64)?,
        ))
    }
}

// ============================================================================
// Arithmetic Operations - Addition, Subtraction and Multiplication
// ============================================================================

impl BigDecimal {
    fn add_impl(&self, rhs: &Self) -> Self {
        let (a, b) = self.aligned(rhs);
        Self::new(&a + &b, self.scale.max(rhs.scale))
    }

    fn sub_impl(&self, rhs: &Self) -> Self {
        let (a, b) = self.aligned(rhs);
        Self::new(&a - &b, self.scale.max(rhs.scale))
    }

    /// Exact product; the scale is the sum of the scales.
    ///
    /// # Errors
    /// `ScaleOverflow` when that sum leaves the `i32` range.
    pub fn try_mul(&self, rhs: &Self) -> Result<Self, ArithmeticError> {
        let scale = check_scale(self.scale as i64 + rhs.scale as i64)?;
        Ok(Self::new(&self.int_val * &rhs.int_val, scale))
    }

    /// Sum rounded to `mc`.
    pub fn add_ctx(&self, rhs: &Self, mc: &MathContext) -> Result<Self, ArithmeticError> {
        self.add_impl(rhs).round(mc)
    }

    /// Difference rounded to `mc`.
    pub fn sub_ctx(&self, rhs: &Self, mc: &MathContext) -> Result<Self, ArithmeticError> {
        self.sub_impl(rhs).round(mc)
    }

    /// Product rounded to `mc`.
    pub fn mul_ctx(&self, rhs: &Self, mc: &MathContext) -> Result<Self, ArithmeticError> {
        self.try_mul(rhs)?.round(mc)
    }
}

// ============================================================================
// Arithmetic Operations - Division
// ============================================================================

impl BigDecimal {
    /// Unscaled quotient at `scale`, rounded with `mode`, and whether it is
    /// exact.
    fn quotient_at_scale(
        &self,
        divisor: &Self,
        scale: i64,
        mode: RoundingMode,
    ) -> Result<(BigInteger, bool), ArithmeticError> {
        let shift = scale + divisor.scale as i64 - self.scale as i64;
        let n = scale_distance(shift)?;
        if shift >= 0 {
            divide_and_round_checked(&mul_ten_pow(&self.int_val, n), &divisor.int_val, mode)
        } else {
            divide_and_round_checked(&self.int_val, &mul_ten_pow(&divisor.int_val, n), mode)
        }
    }

    /// Quotient rounded to `scale` fraction digits.
    ///
    /// # Errors
    /// `DivisionByZero`, or `RoundingNecessary` under `Unnecessary`.
    pub fn div_with_scale(
        &self,
        divisor: &Self,
        scale: i32,
        mode: RoundingMode,
    ) -> Result<Self, ArithmeticError> {
        if divisor.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        let (q, _) = self.quotient_at_scale(divisor, scale as i64, mode)?;
        Ok(Self::new(q, scale))
    }

    /// Quotient rounded to the scale of `self`.
    pub fn div_rounding(
        &self,
        divisor: &Self,
        mode: RoundingMode,
    ) -> Result<Self, ArithmeticError> {
        self.div_with_scale(divisor, self.scale, mode)
    }

    /// Quotient with `mc.precision()` significant digits. An exact quotient
    /// has its trailing zeros stripped down to the preferred scale
    /// `self.scale - divisor.scale`; a rounded one keeps all `precision`
    /// digits, so `1 / 0.999` at precision 3 is `1.00`. Unlimited precision
    /// means [`div_exact`](Self::div_exact).
    ///
    /// # Errors
    /// `DivisionByZero`, or `RoundingNecessary` under `Unnecessary`.
    pub fn div_ctx(&self, divisor: &Self, mc: &MathContext) -> Result<Self, ArithmeticError> {
        if mc.is_unlimited() {
            return self.div_exact(divisor);
        }
        if divisor.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        let preferred = self.scale as i64 - divisor.scale as i64;
        if self.is_zero() {
            return Ok(Self::new(BigInteger::ZERO, saturate_scale(preferred)));
        }
        self.div_to_precision(divisor, mc)
    }

    /// Both operands non-zero, `mc` limited.
    fn div_to_precision(&self, divisor: &Self, mc: &MathContext) -> Result<Self, ArithmeticError> {
        let precision = mc.precision();
        let preferred = self.scale as i64 - divisor.scale as i64;
        let (xprec, yprec) = (self.precision(), divisor.precision());

        // Exponent of the quotient's leading digit
        let mantissa_cmp = if xprec >= yprec {
            let d = mul_ten_pow(&divisor.int_val, xprec - yprec);
            magnitude::cmp(self.int_val.magnitude(), d.magnitude())
        } else {
            let x = mul_ten_pow(&self.int_val, yprec - xprec);
            magnitude::cmp(x.magnitude(), divisor.int_val.magnitude())
        };
        let mut leading =
            (xprec as i64 - self.scale as i64) - (yprec as i64 - divisor.scale as i64);
        if mantissa_cmp == Ordering::Less {
            leading -= 1;
        }

        let mut scale = precision as i64 - 1 - leading;
        let (mut q, exact) = self.quotient_at_scale(divisor, scale, mc.rounding_mode())?;
        if digit_count(&q) > precision {
            // only a rounding increment carries into a new digit
            let (digits, _) = magnitude::div_rem_word(q.magnitude(), 10);
            q = BigInteger::from_parts(q.signum() as i8, digits);
            scale -= 1;
        }
        let quotient = Self::new(q, check_scale(scale)?);
        Ok(if exact { quotient.strip_zeros_to(preferred) } else { quotient })
    }

    /// Exact quotient at the smallest scale not below
    /// `self.scale - divisor.scale`.
    ///
    /// # Errors
    /// `DivisionByZero`, or `NonTerminatingDecimal` when the quotient has
    /// no finite decimal expansion (`1 / 3`).
    pub fn div_exact(&self, divisor: &Self) -> Result<Self, ArithmeticError> {
        if divisor.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        let preferred = saturate_scale(self.scale as i64 - divisor.scale as i64);
        if self.is_zero() {
            return Ok(Self::new(BigInteger::ZERO, preferred));
        }
        // An exact quotient never needs more digits than this
        let digits = self.precision() as u64 + (10 * divisor.precision() as u64).div_ceil(3);
        let mc = MathContext::new(
            digits.min(i32::MAX as u64) as u32,
            RoundingMode::Unnecessary,
        );
        let quotient = self.div_to_precision(divisor, &mc).map_err(|e| match e {
            ArithmeticError::RoundingNecessary => {
                trace_event!(
                    debug,
                    dividend = %self,
                    divisor = %divisor,
                    "non-terminating decimal expansion"
                );
                ArithmeticError::NonTerminatingDecimal
            }
            other => other,
        })?;
        if quotient.scale < preferred {
            quotient.set_scale_exact(preferred)
        } else {
            Ok(quotient)
        }
    }

    /// Integer part of the exact quotient, truncated toward zero, at the
    /// preferred scale `self.scale - divisor.scale` where that is exact.
    pub fn div_to_integral_value(&self, divisor: &Self) -> Result<Self, ArithmeticError> {
        if divisor.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        let preferred = saturate_scale(self.scale as i64 - divisor.scale as i64);
        let (a, b) = self.aligned(divisor);
        let q = a.try_div(&b)?;
        if q.is_zero() {
            return Ok(Self::new(BigInteger::ZERO, preferred));
        }
        let integral = Self::new(q, 0);
        match preferred.cmp(&0) {
            Ordering::Less => Ok(integral.strip_zeros_to(preferred as i64)),
            Ordering::Equal => Ok(integral),
            Ordering::Greater => integral.set_scale_exact(preferred),
        }
    }

    /// `self - self.div_to_integral_value(divisor) * divisor`; takes the sign
    /// of `self`.
    pub fn try_rem(&self, divisor: &Self) -> Result<Self, ArithmeticError> {
        self.div_rem(divisor).map(|(_, r)| r)
    }

    /// Integral quotient and remainder together.
    pub fn div_rem(&self, divisor: &Self) -> Result<(Self, Self), ArithmeticError> {
        let q = self.div_to_integral_value(divisor)?;
        let r = self.sub_impl(&q.try_mul(divisor)?);
        Ok((q, r))
    }
}

// ============================================================================
// Arithmetic Operations - Powers and Roots
// ============================================================================

const MAX_EXPONENT: i32 = 999_999_999;

impl BigDecimal {
    /// Exact `self^n` with scale `scale × n`. `x^0` is one.
    ///
    /// # Errors
    /// `InvalidExponent` unless `0 <= n <= 999_999_999`; `ScaleOverflow`
    /// when the result scale leaves the `i32` range.
    pub fn pow(&self, n: i32) -> Result<Self, ArithmeticError> {
        if !(0..=MAX_EXPONENT).contains(&n) {
            return Err(ArithmeticError::InvalidExponent);
        }
        let scale = check_scale(self.scale as i64 * n as i64)?;
        Ok(Self::new(self.int_val.pow(n as u32), scale))
    }

    /// `self^n` rounded to `mc`, by the ANSI X3.274 algorithm: binary
    /// exponentiation at `precision + digits(n) + 1` working digits, then a
    /// reciprocal for negative `n`, then a final rounding.
    ///
    /// # Errors
    /// `InvalidExponent` when `|n| > 999_999_999`, when `n` has more digits
    /// than the precision, or when `n < 0` with unlimited precision.
    pub fn pow_ctx(&self, n: i32, mc: &MathContext) -> Result<Self, ArithmeticError> {
        if mc.is_unlimited() {
            return self.pow(n);
        }
        if !(-MAX_EXPONENT..=MAX_EXPONENT).contains(&n) {
            return Err(ArithmeticError::InvalidExponent);
        }
        if n == 0 {
            return Ok(Self::ONE);
        }
        let mag = n.unsigned_abs();
        let exponent_digits = digit_count(&BigInteger::from(mag));
        if exponent_digits > mc.precision() {
            return Err(ArithmeticError::InvalidExponent);
        }
        let work = MathContext::new(
            mc.precision() + exponent_digits + 1,
            mc.rounding_mode(),
        );

        let mut acc = Self::ONE;
        let mut seen = false;
        for bit in (0..31).rev() {
            if (mag >> bit) & 1 == 1 {
                seen = true;
                acc = acc.mul_ctx(self, &work)?;
            }
            if bit > 0 && seen {
                acc = acc.mul_ctx(&acc, &work)?;
            }
        }
        if n < 0 {
            acc = Self::ONE.div_ctx(&acc, &work)?;
        }
        acc.round(mc)
    }

    /// Square root rounded to `mc`.
    ///
    /// Unlimited precision requires an exact root. The result is brought
    /// as close to the preferred scale `self.scale / 2` as `mc` allows.
    ///
    /// # Errors
    /// `NegativeSquareRoot` for negative input; `RoundingNecessary` when an
    /// exact root was required but does not exist.
    pub fn sqrt(&self, mc: &MathContext) -> Result<Self, ArithmeticError> {
        if self.is_negative() {
            return Err(ArithmeticError::NegativeSquareRoot);
        }
        let preferred = self.scale / 2;
        if self.is_zero() {
            return Ok(Self::new(BigInteger::ZERO, preferred));
        }

        let root = if mc.is_unlimited() {
            // Even scale, then the root of the unscaled value must be exact
            let (int_val, scale) = if self.scale % 2 == 0 {
                (self.int_val.clone(), self.scale as i64)
            } else {
                (mul_ten_pow(&self.int_val, 1), self.scale as i64 + 1)
            };
            let (r, rem) = int_val.sqrt_rem()?;
            if !rem.is_zero() {
                return Err(ArithmeticError::RoundingNecessary);
            }
            Self::new(r, check_scale(scale / 2)?)
        } else {
            // Enough extra digits that the floor root has precision + 1
            // digits, with the odd tail standing in for any discarded part
            let precision = mc.precision() as i64;
            let mut extra = (2 * precision + 2 - self.precision() as i64).max(0);
            if (self.scale as i64 + extra) % 2 != 0 {
                extra += 1;
            }
            let n = mul_ten_pow(&self.int_val, scale_distance(extra)?);
            let (r, rem) = n.sqrt_rem()?;
            let root_scale = (self.scale as i64 + extra) / 2;
            let approx = if rem.is_zero() {
                Self::new(r, check_scale(root_scale)?)
            } else {
                let sticky = &mul_ten_pow(&r, 1) + &BigInteger::ONE;
                Self::new(sticky, check_scale(root_scale + 1)?)
            };
            approx.round(mc)?
        };

        if root.scale == preferred {
            return Ok(root);
        }
        let stripped = root.strip_trailing_zeros();
        let mut target = preferred as i64;
        if !mc.is_unlimited() {
            target = target.min(
                stripped.scale as i64 + mc.precision() as i64 - stripped.precision() as i64,
            );
        }
        if target > stripped.scale as i64 {
            stripped.set_scale_exact(check_scale(target)?)
        } else {
            Ok(stripped)
        }
    }

    #[inline(always)]
    fn is_negative(&self) -> bool {
        self.int_val.is_negative()
    }
}

// ============================================================================
// Integer and Float Conversions - To
// ============================================================================

impl BigDecimal {
    /// Integer part, truncated toward zero.
    pub fn to_big_integer(&self) -> BigInteger {
        let n = self.scale.unsigned_abs();
        if self.scale <= 0 {
            mul_ten_pow(&self.int_val, n)
        } else {
            self.int_val
                .try_div(&ten_pow(n))
                .expect("powers of ten are non-zero")
        }
    }

    /// Integer value; fails if there is a non-zero fractional part.
    pub fn to_big_integer_exact(&self) -> Result<BigInteger, ArithmeticError> {
        Ok(self.set_scale_exact(0)?.int_val)
    }

    /// Low-order 64 bits of the integer part.
    pub fn to_i64(&self) -> i64 {
        self.to_big_integer().to_i64()
    }

    /// Fails with `RoundingNecessary` for a fractional part and `Overflow`
    /// outside the `i64` range.
    pub fn to_i64_exact(&self) -> Result<i64, ArithmeticError> {
        self.to_big_integer_exact()?.to_i64_exact()
    }

    /// Nearest `f64`, via the correctly rounded `core` float parser.
    pub fn to_f64(&self) -> f64 {
        format!("{}e{}", self.int_val, -(self.scale as i64))
            .parse()
            .expect("\"<digits>e<exponent>\" is valid float syntax")
    }

    /// Nearest `f32`, via the correctly rounded `core` float parser.
    pub fn to_f32(&self) -> f32 {
        format!("{}e{}", self.int_val, -(self.scale as i64))
            .parse()
            .expect("\"<digits>e<exponent>\" is valid float syntax")
    }
}

// ============================================================================
// Formatting
// ============================================================================

impl BigDecimal {
    /// Unsigned layout. Scientific notation is used when the scale is
    /// negative or the adjusted exponent is below -6; `engineering` picks an
    /// exponent that is a multiple of three.
    fn layout(&self, engineering: bool) -> String {
        let coeff = self.int_val.abs_digits(10);
        if self.scale == 0 {
            return coeff;
        }
        let len = coeff.len() as i64;
        let mut adjusted = len - 1 - self.scale as i64;

        if self.scale > 0 && adjusted >= -6 {
            let point = len - self.scale as i64;
            let mut out = String::with_capacity(coeff.len() + 2);
            if point > 0 {
                out.push_str(&coeff[..point as usize]);
                out.push('.');
                out.push_str(&coeff[point as usize..]);
            } else {
                out.push_str("0.");
                out.extend(core::iter::repeat_n('0', (-point) as usize));
                out.push_str(&coeff);
            }
            return out;
        }

        let mut out = String::with_capacity(coeff.len() + 8);
        if !engineering {
            out.push_str(&coeff[..1]);
            if len > 1 {
                out.push('.');
                out.push_str(&coeff[1..]);
            }
        } else {
            let sig = adjusted.rem_euclid(3);
            adjusted -= sig;
            let int_digits = sig + 1;
            if self.is_zero() {
                match int_digits {
                    1 => out.push('0'),
                    2 => {
                        out.push_str("0.00");
                        adjusted += 3;
                    }
                    _ => {
                        out.push_str("0.0");
                        adjusted += 3;
                    }
                }
            } else if int_digits >= len {
                out.push_str(&coeff);
                out.extend(core::iter::repeat_n('0', (int_digits - len) as usize));
            } else {
                out.push_str(&coeff[..int_digits as usize]);
                out.push('.');
                out.push_str(&coeff[int_digits as usize..]);
            }
        }
        if adjusted != 0 {
            out.push('E');
            if adjusted > 0 {
                out.push('+');
            }
            out.push_str(&format!("{}", adjusted));
        }
        out
    }

    /// Like `Display` but with an exponent that is a multiple of three.
    pub fn to_engineering_string(&self) -> String {
        let body = self.layout(true);
        if self.is_negative() { format!("-{}", body) } else { body }
    }

    /// Never uses an exponent: `1E+3` prints as `1000`.
    pub fn to_plain_string(&self) -> String {
        let digits = self.int_val.abs_digits(10);
        let mut out = String::with_capacity(digits.len() + 4);
        if self.is_negative() {
            out.push('-');
        }
        if self.scale <= 0 {
            out.push_str(&digits);
            if !self.is_zero() {
                out.extend(core::iter::repeat_n('0', self.scale.unsigned_abs() as usize));
            }
            return out;
        }
        let point = digits.len() as i64 - self.scale as i64;
        if point > 0 {
            out.push_str(&digits[..point as usize]);
            out.push('.');
            out.push_str(&digits[point as usize..]);
        } else {
            out.push_str("0.");
            out.extend(core::iter::repeat_n('0', (-point) as usize));
            out.push_str(&digits);
        }
        out
    }
}

impl fmt::Display for BigDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad_integral(!self.is_negative(), "", &self.layout(false))
    }
}

impl fmt::Debug for BigDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.debug_struct("BigDecimal")
                .field("int_val", &self.int_val)
                .field("scale", &self.scale)
                .finish()
        } else {
            write!(f, "BigDecimal({})", self)
        }
    }
}

// ============================================================================
// Operator Overloading
// ============================================================================

macro_rules! forward_binop {
    (impl $imp:ident, $method:ident, $inner:ident) => {
        impl $imp<&BigDecimal> for &BigDecimal {
            type Output = BigDecimal;

            #[inline]
            fn $method(self, rhs: &BigDecimal) -> BigDecimal {
                self.$inner(rhs)
            }
        }

        impl $imp<BigDecimal> for BigDecimal {
            type Output = BigDecimal;

            #[inline]
            fn $method(self, rhs: BigDecimal) -> BigDecimal {
                (&self).$inner(&rhs)
            }
        }

        impl $imp<&BigDecimal> for BigDecimal {
            type Output = BigDecimal;

            #[inline]
            fn $method(self, rhs: &BigDecimal) -> BigDecimal {
                (&self).$inner(rhs)
            }
        }
    };
}

impl BigDecimal {
    fn mul_or_panic(&self, rhs: &Self) -> Self {
        self.try_mul(rhs).expect("attempt to multiply with scale overflow")
    }

    fn div_or_panic(&self, rhs: &Self) -> Self {
        self.div_exact(rhs)
            .expect("attempt to divide by zero or with a non-terminating quotient")
    }

    fn rem_or_panic(&self, rhs: &Self) -> Self {
        self.try_rem(rhs)
            .expect("attempt to calculate the remainder with a divisor of zero")
    }
}

forward_binop!(impl Add, add, add_impl);
forward_binop!(impl Sub, sub, sub_impl);
forward_binop!(impl Mul, mul, mul_or_panic);
forward_binop!(impl Div, div, div_or_panic);
forward_binop!(impl Rem, rem, rem_or_panic);

impl AddAssign<&BigDecimal> for BigDecimal {
    fn add_assign(&mut self, rhs: &BigDecimal) {
        *self = self.add_impl(rhs);
    }
}

impl SubAssign<&BigDecimal> for BigDecimal {
    fn sub_assign(&mut self, rhs: &BigDecimal) {
        *self = self.sub_impl(rhs);
    }
}

impl MulAssign<&BigDecimal> for BigDecimal {
    fn mul_assign(&mut self, rhs: &BigDecimal) {
        *self = self.mul_or_panic(rhs);
    }
}

impl Neg for BigDecimal {
    type Output = BigDecimal;

    #[inline]
    fn neg(self) -> BigDecimal {
        self.negate()
    }
}

impl Neg for &BigDecimal {
    type Output = BigDecimal;

    #[inline]
    fn neg(self) -> BigDecimal {
        self.negate()
    }
}

// ============================================================================
// Standard Library Trait Implementations
// ============================================================================

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for BigDecimal {
                #[inline]
                fn from(value: $t) -> Self {
                    Self::new(BigInteger::from(value), 0)
                }
            }
        )*
    };
}

impl_from_integer!(i32, i64, u32, u64);

impl From<BigInteger> for BigDecimal {
    fn from(value: BigInteger) -> Self {
        Self::new(value, 0)
    }
}

impl TryFrom<f64> for BigDecimal {
    type Error = ParseError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_f64(value)
    }
}

impl TryFrom<f32> for BigDecimal {
    type Error = ParseError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::from_f32(value)
    }
}

impl Sum for BigDecimal {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, x| acc.add_impl(&x))
    }
}

impl<'a> Sum<&'a BigDecimal> for BigDecimal {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, x| acc.add_impl(x))
    }
}

impl Product for BigDecimal {
    fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ONE, |acc, x| acc.mul_or_panic(&x))
    }
}

impl<'a> Product<&'a BigDecimal> for BigDecimal {
    fn product<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::ONE, |acc, x| acc.mul_or_panic(x))
    }
}

// ============================================================================
// Serde Support
// ============================================================================

#[cfg(feature = "serde")]
impl Serialize for BigDecimal {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            (&self.int_val, self.scale).serialize(serializer)
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for BigDecimal {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct BigDecimalVisitor;

        impl<'de> de::Visitor<'de> for BigDecimalVisitor {
            type Value = BigDecimal;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a decimal string")
            }

            fn visit_str<E>(self, v: &str) -> core::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                BigDecimal::parse(v).map_err(de::Error::custom)
            }
        }

        if deserializer.is_human_readable() {
            deserializer.deserialize_str(BigDecimalVisitor)
        } else {
            let (int_val, scale) = <(BigInteger, i32)>::deserialize(deserializer)?;
            Ok(BigDecimal::new(int_val, scale))
        }
    }
}



#[cfg(test)]
mod rounding_tests {
    use std::string::ToString;

    use super::*;

    fn dec(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_rounding_table() {
        use RoundingMode::*;
        let modes = [Up, Down, Ceiling, Floor, HalfUp, HalfDown, HalfEven];
        let table: [(&str, [i64; 7]); 8] = [
            ("5.5", [6, 5, 6, 5, 6, 5, 6]),
            ("2.5", [3, 2, 3, 2, 3, 2, 2]),
            ("1.6", [2, 1, 2, 1, 2, 2, 2]),
            ("1.1", [2, 1, 2, 1, 1, 1, 1]),
            ("1.0", [1, 1, 1, 1, 1, 1, 1]),
            ("-1.1", [-2, -1, -1, -2, -1, -1, -1]),
            ("-2.5", [-3, -2, -2, -3, -3, -2, -2]),
            ("-5.5", [-6, -5, -5, -6, -6, -5, -6]),
        ];
        for (input, expected) in table {
            for (mode, want) in modes.into_iter().zip(expected) {
                let got = dec(input).set_scale(0, mode).unwrap();
                assert_eq!(got, BigDecimal::from(want), "{input} {mode}");
            }
            let exact = dec(input).set_scale(0, Unnecessary);
            if input == "1.0" {
                assert_eq!(exact, Ok(BigDecimal::ONE));
            } else {
                assert_eq!(exact, Err(ArithmeticError::RoundingNecessary), "{input}");
            }
        }
    }

    #[test]
    fn test_half_modes_beyond_the_half() {
        // 2.51 is above the tie, 2.49 below
        assert_eq!(dec("2.51").set_scale(0, RoundingMode::HalfDown), Ok(dec("3")));
        assert_eq!(dec("2.49").set_scale(0, RoundingMode::HalfUp), Ok(dec("2")));
        assert_eq!(dec("-0.5").set_scale(0, RoundingMode::HalfEven), Ok(dec("0")));
        assert_eq!(dec("-0.4").set_scale(0, RoundingMode::Floor), Ok(dec("-1")));
    }

    #[test]
    fn test_set_scale_up_is_exact() {
        let d = dec("1.5").set_scale(4, RoundingMode::Unnecessary).unwrap();
        assert_eq!(d.to_string(), "1.5000");
        assert_eq!(dec("1234").set_scale(-2, RoundingMode::HalfUp), Ok(dec("1.2E+3")));
    }

    #[test]
    fn test_round_to_precision() {
        let mc = MathContext::new(3, RoundingMode::HalfUp);
        assert_eq!(dec("123.456").round(&mc), Ok(dec("123")));
        assert_eq!(dec("0.0012345").round(&mc), Ok(dec("0.00123")));
        assert_eq!(dec("999.9").round(&mc).unwrap().to_string(), "1.00E+3");
        assert_eq!(dec("12").round(&mc), Ok(dec("12")));
        assert_eq!(dec("123.456").round(&MathContext::UNLIMITED), Ok(dec("123.456")));
        assert_eq!(
            dec("1.25").round(&MathContext::new(2, RoundingMode::HalfEven)),
            Ok(dec("1.2"))
        );
        assert_eq!(
            dec("1.25").round(&MathContext::new(2, RoundingMode::Unnecessary)),
            Err(ArithmeticError::RoundingNecessary)
        );
        assert_eq!(dec("1.25").plus_ctx(&MathContext::with_precision(2)), Ok(dec("1.3")));
    }

    #[test]
    fn test_strip_trailing_zeros() {
        assert_eq!(dec("1.500").strip_trailing_zeros().to_string(), "1.5");
        assert_eq!(dec("100").strip_trailing_zeros().to_string(), "1E+2");
        assert_eq!(dec("0.000").strip_trailing_zeros(), BigDecimal::ZERO);
        assert_eq!(dec("0E+5").strip_trailing_zeros(), BigDecimal::ZERO);
        assert_eq!(dec("-12.0").strip_trailing_zeros(), dec("-12"));
        assert_eq!(dec("7").strip_trailing_zeros(), dec("7"));
    }

    #[test]
    fn test_move_point() {
        assert_eq!(dec("1.5").move_point_left(2), Ok(dec("0.015")));
        assert_eq!(dec("1.5").move_point_right(3), Ok(dec("1500")));
        assert_eq!(dec("1.5").move_point_right(3).unwrap().scale(), 0);
        assert_eq!(dec("1.5").move_point_left(-1), Ok(dec("15")));
        assert_eq!(dec("1.5").scale_by_power_of_ten(3).unwrap().to_string(), "1.5E+3");
        assert_eq!(
            BigDecimal::new(BigInteger::ONE, i32::MAX).move_point_left(1),
            Err(ArithmeticError::ScaleOverflow)
        );
    }
}



#[cfg(test)]
mod comparison_tests {
    use std::collections::HashSet;

    use super::*;

    fn dec(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_equality_is_representation_sensitive() {
        assert_ne!(dec("1.0"), dec("1.00"));
        assert_eq!(dec("1.0").cmp_value(&dec("1.00")), Ordering::Equal);
        assert!(dec("1.0").eq_value(&dec("1.00")));
        let set: HashSet<BigDecimal> = [dec("1.0"), dec("1.00"), dec("1.0")].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_cmp_value() {
        assert_eq!(dec("-1").cmp_value(&dec("0.5")), Ordering::Less);
        assert_eq!(dec("1E+3").cmp_value(&dec("999.99")), Ordering::Greater);
        assert_eq!(dec("-1E+3").cmp_value(&dec("-999.99")), Ordering::Less);
        assert_eq!(dec("0.00").cmp_value(&dec("0E+5")), Ordering::Equal);
        assert_eq!(dec("1.23").cmp_value(&dec("1.24")), Ordering::Less);
        assert_eq!(dec("9.5").cmp_value(&dec("10")), Ordering::Less);
    }

    #[test]
    fn test_integer_conversions() {
        assert_eq!(dec("-7.9").to_big_integer(), BigInteger::from(-7));
        assert_eq!(dec("1.2E+3").to_big_integer(), BigInteger::from(1200));
        assert_eq!(dec("-7.9").to_big_integer_exact(), Err(ArithmeticError::RoundingNecessary));
        assert_eq!(dec("7.00").to_big_integer_exact(), Ok(BigInteger::from(7)));
        assert_eq!(dec("18446744073709551617.5").to_i64(), 1);
        assert_eq!(dec("42.0").to_i64_exact(), Ok(42));
        assert_eq!(dec("42.5").to_i64_exact(), Err(ArithmeticError::RoundingNecessary));
        assert_eq!(dec("1E+19").to_i64_exact(), Err(ArithmeticError::Overflow));
    }

    #[test]
    fn test_float_conversions() {
        assert_eq!(dec("0.1").to_f64(), 0.1);
        assert_eq!(dec("-2.5").to_f64(), -2.5);
        assert_eq!(dec("1E+400").to_f64(), f64::INFINITY);
        assert_eq!(dec("1E-400").to_f64(), 0.0);
        assert_eq!(dec("0.1").to_f32(), 0.1f32);
        assert_eq!(BigDecimal::from_f64(0.1).unwrap().to_f64(), 0.1);
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn test_serialize_keeps_scale() {
        let d: BigDecimal = "1.50".parse().unwrap();
        assert_eq!(serde_json::to_string(&d).unwrap(), r#""1.50""#);
        let e: BigDecimal = "1E+3".parse().unwrap();
        assert_eq!(serde_json::to_string(&e).unwrap(), r#""1E+3""#);
    }

    #[test]
    fn test_deserialize() {
        let d: BigDecimal = serde_json::from_str(r#""-0.125""#).unwrap();
        assert_eq!(d, BigDecimal::new(BigInteger::from(-125), 3));
        assert!(serde_json::from_str::<BigDecimal>(r#""1.2.3""#).is_err());
    }

    #[test]
    fn test_bincode_round_trip_keeps_scale() {
        for (s, scale) in [
            ("-1.50", 2),
            ("0", 0),
            ("0.000", 3),
            ("1E+3", -3),
            ("-12345678901234567890.123", 3),
        ] {
            let d: BigDecimal = s.parse().unwrap();
            let bytes = bincode::serialize(&d).unwrap();
            let back = bincode::deserialize::<BigDecimal>(&bytes).unwrap();
            assert_eq!(back, d, "{s}");
            assert_eq!(back.scale(), scale, "{s}");
        }
    }
}
