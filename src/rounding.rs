use core::fmt;
use core::str::FromStr;

use crate::ParseError;

/// Policy for discarding digits of a decimal value.
///
/// The discarded digit string is compared with exactly one half of a unit in
/// the last retained place; the `Half*` modes differ only when it is equal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum RoundingMode {
    /// Away from zero.
    Up,
    /// Toward zero (truncate).
    Down,
    /// Toward positive infinity.
    Ceiling,
    /// Toward negative infinity.
    Floor,
    /// Nearest neighbour, ties away from zero.
    #[default]
    HalfUp,
    /// Nearest neighbour, ties toward zero.
    HalfDown,
    /// Nearest neighbour, ties to the even neighbour (banker's rounding).
    HalfEven,
    /// Asserts that no rounding is needed; rounding fails otherwise.
    Unnecessary,
}

// ============================================================================
// Rounding Decision
// ============================================================================

impl RoundingMode {
    /// All modes, in legacy-code order.
    pub const ALL: [RoundingMode; 8] = [
        RoundingMode::Up,
        RoundingMode::Down,
        RoundingMode::Ceiling,
        RoundingMode::Floor,
        RoundingMode::HalfUp,
        RoundingMode::HalfDown,
        RoundingMode::HalfEven,
        RoundingMode::Unnecessary,
    ];

    /// Decides whether a truncated quotient must be bumped one unit away
    /// from zero.
    ///
    /// * `negative` - sign of the exact value
    /// * `half_cmp` - discarded fraction compared with one half
    /// * `odd` - whether the truncated last digit is odd
    ///
    /// Only called when the discarded fraction is non-zero. Returns `None`
    /// for `Unnecessary`.
    pub(crate) const fn increments(
        self,
        negative: bool,
        half_cmp: core::cmp::Ordering,
        odd: bool,
    ) -> Option<bool> {
        use core::cmp::Ordering::*;
        Some(match self {
            RoundingMode::Up => true,
            RoundingMode::Down => false,
            RoundingMode::Ceiling => !negative,
            RoundingMode::Floor => negative,
            RoundingMode::HalfUp => !matches!(half_cmp, Less),
            RoundingMode::HalfDown => matches!(half_cmp, Greater),
            RoundingMode::HalfEven => match half_cmp {
                Greater => true,
                Less => false,
                Equal => odd,
            },
            RoundingMode::Unnecessary => return None,
        })
    }

    /// The legacy `ROUND_*` integer code (`UP = 0` through `UNNECESSARY = 7`).
    pub const fn legacy_code(self) -> i32 {
        match self {
            RoundingMode::Up => 0,
            RoundingMode::Down => 1,
            RoundingMode::Ceiling => 2,
            RoundingMode::Floor => 3,
            RoundingMode::HalfUp => 4,
            RoundingMode::HalfDown => 5,
            RoundingMode::HalfEven => 6,
            RoundingMode::Unnecessary => 7,
        }
    }

    /// Inverse of [`legacy_code`](Self::legacy_code).
    pub const fn from_legacy_code(code: i32) -> Result<Self, ParseError> {
        if code < 0 || code > 7 {
            return Err(ParseError::InvalidRoundingMode);
        }
        Ok(Self::ALL[code as usize])
    }

    /// The upper-case constant name, e.g. `"HALF_EVEN"`.
    pub const fn name(self) -> &'static str {
        match self {
            RoundingMode::Up => "UP",
            RoundingMode::Down => "DOWN",
            RoundingMode::Ceiling => "CEILING",
            RoundingMode::Floor => "FLOOR",
            RoundingMode::HalfUp => "HALF_UP",
            RoundingMode::HalfDown => "HALF_DOWN",
            RoundingMode::HalfEven => "HALF_EVEN",
            RoundingMode::Unnecessary => "UNNECESSARY",
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RoundingMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or(ParseError::InvalidRoundingMode)
    }
}

impl TryFrom<i32> for RoundingMode {
    type Error = ParseError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_legacy_code(code)
    }
}

// ============================================================================
// MathContext
// ============================================================================

/// Precision and rounding policy for context-aware decimal operations.
///
/// A precision of `0` means unlimited: operations are carried out exactly.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MathContext {
    precision: u32,
    rounding_mode: RoundingMode,
}

impl MathContext {
    /// Exact arithmetic.
    pub const UNLIMITED: Self = Self::new(0, RoundingMode::HalfUp);

    /// IEEE 754R decimal32: 7 digits, banker's rounding.
    pub const DECIMAL32: Self = Self::new(7, RoundingMode::HalfEven);

    /// IEEE 754R decimal64: 16 digits, banker's rounding.
    pub const DECIMAL64: Self = Self::new(16, RoundingMode::HalfEven);

    /// IEEE 754R decimal128: 34 digits, banker's rounding.
    pub const DECIMAL128: Self = Self::new(34, RoundingMode::HalfEven);

    #[inline]
    pub const fn new(precision: u32, rounding_mode: RoundingMode) -> Self {
        Self {
            precision,
            rounding_mode,
        }
    }

    /// A context with the default `HalfUp` rounding.
    #[inline]
    pub const fn with_precision(precision: u32) -> Self {
        Self::new(precision, RoundingMode::HalfUp)
    }

    #[inline]
    pub const fn precision(&self) -> u32 {
        self.precision
    }

    #[inline]
    pub const fn rounding_mode(&self) -> RoundingMode {
        self.rounding_mode
    }

    #[inline]
    pub const fn is_unlimited(&self) -> bool {
        self.precision == 0
    }
}

impl Default for MathContext {
    /// Nine digits, `HalfUp`.
    fn default() -> Self {
        Self::new(9, RoundingMode::HalfUp)
    }
}

impl fmt::Display for MathContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "precision={} roundingMode={}",
            self.precision, self.rounding_mode
        )
    }
}

impl FromStr for MathContext {
    type Err = ParseError;

    /// Parses the `Display` form, e.g. `"precision=7 roundingMode=HALF_EVEN"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix("precision=")
            .ok_or(ParseError::InvalidMathContext)?;
        let (digits, mode) = rest
            .split_once(" roundingMode=")
            .ok_or(ParseError::InvalidMathContext)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidMathContext);
        }
        let precision = digits
            .parse::<u32>()
            .map_err(|_| ParseError::InvalidMathContext)?;
        Ok(Self::new(precision, mode.parse()?))
    }
}

#[cfg(test)]
mod rounding_mode_tests {
    use std::string::ToString;

    use super::*;
    use core::cmp::Ordering::*;

    #[test]
    fn test_legacy_codes_round_trip() {
        for (code, mode) in RoundingMode::ALL.into_iter().enumerate() {
            assert_eq!(mode.legacy_code(), code as i32);
            assert_eq!(RoundingMode::try_from(code as i32), Ok(mode));
        }
        assert_eq!(
            RoundingMode::from_legacy_code(8),
            Err(ParseError::InvalidRoundingMode)
        );
        assert_eq!(
            RoundingMode::from_legacy_code(-1),
            Err(ParseError::InvalidRoundingMode)
        );
    }

    #[test]
    fn test_names() {
        assert_eq!(RoundingMode::HalfEven.to_string(), "HALF_EVEN");
        assert_eq!("CEILING".parse::<RoundingMode>(), Ok(RoundingMode::Ceiling));
        assert!("half_even".parse::<RoundingMode>().is_err());
    }

    #[test]
    fn test_increments() {
        // positive, discarded fraction exactly one half, last digit even
        let cases = [
            (RoundingMode::Up, true),
            (RoundingMode::Down, false),
            (RoundingMode::Ceiling, true),
            (RoundingMode::Floor, false),
            (RoundingMode::HalfUp, true),
            (RoundingMode::HalfDown, false),
            (RoundingMode::HalfEven, false),
        ];
        for (mode, expected) in cases {
            assert_eq!(mode.increments(false, Equal, false), Some(expected), "{mode}");
        }
        assert_eq!(RoundingMode::HalfEven.increments(false, Equal, true), Some(true));
        assert_eq!(RoundingMode::Ceiling.increments(true, Less, false), Some(false));
        assert_eq!(RoundingMode::Floor.increments(true, Less, false), Some(true));
        assert_eq!(RoundingMode::Unnecessary.increments(false, Less, false), None);
    }
}
