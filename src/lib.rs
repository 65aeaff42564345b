//! Arbitrary-precision integer and decimal arithmetic
//!
//! This library provides two value types that never overflow:
//!
//! - **`BigInteger`**: unbounded signed integer
//!   - Sign-magnitude storage, 32-bit words, least-significant word first
//!   - Karatsuba multiplication above a size threshold, Knuth long division
//!   - Radix 2..=36 parsing and formatting, two's-complement bit operations
//!
//! - **`BigDecimal`**: unbounded signed decimal
//!   - An unscaled `BigInteger` paired with a base-10 scale
//!   - Eight rounding modes, `MathContext` precision control
//!   - Exact reconstruction of binary floating-point values
//!
//! ## Features
//!
//! - **Interchangeable**: rounding, `toString` layout and parsing follow the JVM
//!   `java.math` semantics, so values survive a round trip through it unchanged
//! - **no_std compatible**: only needs `alloc`
//! - **Serde support** (`serde` feature): strings for human-readable formats
//! - **Structured logging** (`tracing` feature): algorithm-level trace events
//!
//! ## Example
//!
//! ```rust
//! use bigmath::{BigDecimal, BigInteger, RoundingMode};
//!
//! let a: BigInteger = "123456789012345678901234567890".parse().unwrap();
//! let b = BigInteger::from(987_654_321);
//! let (q, r) = a.div_rem(&b).unwrap();
//! assert_eq!(&(&q * &b) + &r, a);
//!
//! let price: BigDecimal = "19.99".parse().unwrap();
//! let qty = BigDecimal::from(3);
//! let third = (&price * &qty)
//!     .div_with_scale(&BigDecimal::from(7), 2, RoundingMode::HalfEven)
//!     .unwrap();
//! assert_eq!(third.to_string(), "8.57");
//! ```

#![no_std]
#![cfg_attr(test, allow(unused_imports))]

#[cfg(test)]
extern crate std;

extern crate alloc;

/// Forwards to `tracing` when the `tracing` feature is enabled.
macro_rules! trace_event {
    ($level:ident, $($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        {
            tracing::$level!($($arg)+);
        }
    };
}

mod big_decimal;
mod big_integer;
mod magnitude;
mod numeric;
mod range;
mod rounding;

pub use big_decimal::BigDecimal;
pub use big_integer::BigInteger;
pub use magnitude::KARATSUBA_THRESHOLD;
pub use numeric::Numeric;
pub use range::BigIntegerRange;
pub use rounding::{MathContext, RoundingMode};

use thiserror::Error;

/// Malformed textual or structural input.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty number string")]
    Empty,

    #[error("radix {0} out of range (2..=36)")]
    InvalidRadix(u32),

    #[error("invalid digit {digit:?} for radix {radix}")]
    InvalidDigit { digit: char, radix: u32 },

    #[error("malformed decimal number")]
    MalformedDecimal,

    #[error("scale out of range")]
    ScaleOverflow,

    #[error("NaN and infinite values have no decimal representation")]
    NonFinite,

    #[error("signum does not match magnitude")]
    SignumMismatch,

    #[error("malformed math context")]
    InvalidMathContext,

    #[error("unknown rounding mode")]
    InvalidRoundingMode,
}

/// Operations whose result is undefined or not representable.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("negative exponent")]
    NegativeExponent,

    #[error("exponent out of range")]
    InvalidExponent,

    #[error("modulus not positive")]
    NonPositiveModulus,

    #[error("value not invertible for the given modulus")]
    NotInvertible,

    #[error("non-terminating decimal expansion; no exact representable decimal result")]
    NonTerminatingDecimal,

    #[error("rounding necessary")]
    RoundingNecessary,

    #[error("square root of a negative value")]
    NegativeSquareRoot,

    #[error("operation undefined for negative values")]
    NegativeValue,

    #[error("overflow: value out of range for the target type")]
    Overflow,

    #[error("scale out of range")]
    ScaleOverflow,
}

/// Either kind of failure, for callers that combine parsing with arithmetic.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
}

pub type Result<T> = core::result::Result<T, MathError>;
