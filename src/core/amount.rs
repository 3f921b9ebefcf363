use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest scale a [`Amount`] can carry.
pub const MAX_SCALE: u32 = 28;

/// Low-level failure of an [`Amount`] operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    /// The requested scale is outside `0..=MAX_SCALE`.
    #[error("scale {0} is out of range (max {MAX_SCALE})")]
    ScaleOutOfRange(u32),

    /// The result does not fit the 96-bit mantissa at the required scale.
    #[error("{0} overflows the decimal representation")]
    Overflow(&'static str),

    /// The operation would have silently dropped digits.
    #[error("{op} would lose precision (expected scale {expected}, got {actual})")]
    PrecisionLoss {
        op: &'static str,
        expected: u32,
        actual: u32,
    },

    #[error("division by zero")]
    DivisionByZero,

    /// Text could not be parsed as a decimal value.
    #[error("invalid amount '{0}'")]
    Parse(String),
}

/// Fixed-point decimal value with an explicit scale.
///
/// An `Amount` is `mantissa / 10^scale`. The scale is part of the value:
/// `1000.00` and `1000` compare equal but render differently, and every
/// operation documents the scale of its result:
///
/// | Operation | Result scale |
/// |---|---|
/// | [`checked_add`](Self::checked_add), [`checked_sub`](Self::checked_sub) | max of both scales |
/// | [`checked_mul`](Self::checked_mul) | sum of both scales |
/// | [`rescale`](Self::rescale) | the target scale |
/// | [`divide`](Self::divide) | the target scale |
///
/// Operations that cannot honour this contract fail with an
/// [`ArithmeticError`] instead of rounding behind the caller's back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// Zero at scale 0.
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// One at scale 0.
    pub const ONE: Amount = Amount(Decimal::ONE);

    /// Build an amount from its unscaled value and scale.
    ///
    /// `Amount::new(100000, 2)` is `1000.00`.
    ///
    /// # Panics
    ///
    /// Panics when `scale` exceeds [`MAX_SCALE`]; use [`Amount::try_new`]
    /// for untrusted input.
    pub fn new(value: i64, scale: u32) -> Self {
        Self(Decimal::new(value, scale))
    }

    pub fn try_new(value: i64, scale: u32) -> Result<Self, ArithmeticError> {
        check_scale(scale)?;
        Decimal::try_new(value, scale)
            .map(Self)
            .map_err(|_| ArithmeticError::ScaleOutOfRange(scale))
    }

    /// Zero at the given scale, e.g. `0.00` for scale 2.
    pub fn zero(scale: u32) -> Result<Self, ArithmeticError> {
        Self::try_new(0, scale)
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(normalize_sign(value))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn scale(&self) -> u32 {
        self.0.scale()
    }

    /// The unscaled integer value.
    pub fn mantissa(&self) -> i128 {
        self.0.mantissa()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    pub fn negate(&self) -> Self {
        Self::from_decimal(-self.0)
    }

    /// Add, aligning both operands to the larger scale.
    pub fn checked_add(&self, other: Amount) -> Result<Amount, ArithmeticError> {
        let expected = self.scale().max(other.scale());
        let sum = self
            .0
            .checked_add(other.0)
            .ok_or(ArithmeticError::Overflow("addition"))?;
        Self::exact("addition", sum, expected)
    }

    /// Subtract, aligning both operands to the larger scale.
    pub fn checked_sub(&self, other: Amount) -> Result<Amount, ArithmeticError> {
        let expected = self.scale().max(other.scale());
        let diff = self
            .0
            .checked_sub(other.0)
            .ok_or(ArithmeticError::Overflow("subtraction"))?;
        Self::exact("subtraction", diff, expected)
    }

    /// Multiply without rounding; the result scale is the sum of both scales.
    pub fn checked_mul(&self, other: Amount) -> Result<Amount, ArithmeticError> {
        let expected = self.scale() + other.scale();
        check_scale(expected)?;
        let product = self
            .0
            .checked_mul(other.0)
            .ok_or(ArithmeticError::Overflow("multiplication"))?;
        Self::exact("multiplication", product, expected)
    }

    /// Change the scale. Reducing it rounds half away from zero; increasing
    /// it pads with zeros. This is the only operation that may drop digits.
    pub fn rescale(&self, scale: u32) -> Result<Amount, ArithmeticError> {
        check_scale(scale)?;
        let current = self.scale();
        if scale == current {
            return Ok(*self);
        }
        if scale < current {
            let rounded = self
                .0
                .round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
            return Self::exact("rescale", rounded, scale);
        }
        let mut widened = self.0;
        widened.rescale(scale);
        Self::exact("rescale", widened, scale)
    }

    /// Divide, producing a result at exactly `scale` digits, rounded half
    /// away from zero. Division is never implicit: callers always name the
    /// precision they need because most quotients do not terminate.
    pub fn divide(&self, divisor: Amount, scale: u32) -> Result<Amount, ArithmeticError> {
        check_scale(scale)?;
        let denominator = divisor.mantissa();
        if denominator == 0 {
            return Err(ArithmeticError::DivisionByZero);
        }

        // (a / 10^sa) / (b / 10^sb) = q / 10^t  =>  q = a * 10^(sb + t - sa) / b
        let shift = i64::from(divisor.scale()) + i64::from(scale) - i64::from(self.scale());
        let (num, den) = if shift >= 0 {
            let factor = pow10(shift as u32)?;
            let num = self
                .mantissa()
                .checked_mul(factor)
                .ok_or(ArithmeticError::Overflow("division"))?;
            (num, denominator)
        } else {
            let factor = pow10((-shift) as u32)?;
            let den = denominator
                .checked_mul(factor)
                .ok_or(ArithmeticError::Overflow("division"))?;
            (self.mantissa(), den)
        };

        let mut quotient = num / den;
        let remainder = num % den;
        if remainder != 0 {
            let twice = remainder
                .unsigned_abs()
                .checked_mul(2)
                .ok_or(ArithmeticError::Overflow("division"))?;
            if twice >= den.unsigned_abs() {
                quotient += if (num < 0) == (den < 0) { 1 } else { -1 };
            }
        }

        Decimal::try_from_i128_with_scale(quotient, scale)
            .map(Self::from_decimal)
            .map_err(|_| ArithmeticError::Overflow("division"))
    }

    /// Sum a sequence of amounts; the result scale is the largest operand scale.
    pub fn checked_sum<I>(amounts: I) -> Result<Amount, ArithmeticError>
    where
        I: IntoIterator<Item = Amount>,
    {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, |acc, a| acc.checked_add(a))
    }

    fn exact(op: &'static str, value: Decimal, expected: u32) -> Result<Amount, ArithmeticError> {
        let mut value = value;
        if value.scale() < expected {
            // zero operands short-circuit to a result at the other operand's scale
            value.rescale(expected);
        }
        if value.scale() != expected {
            return Err(ArithmeticError::PrecisionLoss {
                op,
                expected,
                actual: value.scale(),
            });
        }
        Ok(Self::from_decimal(value))
    }
}

fn check_scale(scale: u32) -> Result<(), ArithmeticError> {
    if scale > MAX_SCALE {
        return Err(ArithmeticError::ScaleOutOfRange(scale));
    }
    Ok(())
}

fn pow10(exp: u32) -> Result<i128, ArithmeticError> {
    10i128
        .checked_pow(exp)
        .ok_or(ArithmeticError::Overflow("power of ten"))
}

// Rounding a tiny negative value can leave a signed zero behind.
fn normalize_sign(mut value: Decimal) -> Decimal {
    if value.is_zero() {
        value.set_sign_positive(true);
    }
    value
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Amount {
    type Err = ArithmeticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .map(Self::from_decimal)
            .map_err(|_| ArithmeticError::Parse(s.to_string()))
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self::from_decimal(value)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self(Decimal::from(value))
    }
}
