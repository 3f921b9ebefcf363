use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::amount::{Amount, ArithmeticError};

/// A ratio applied to amounts, stored as a fraction.
///
/// `Percentage::new(21, 2)` is `0.21`, rendered and parsed as `"21%"`.
/// `Percentage::new(105, 3)` is `10.5%`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Percentage(Amount);

impl Percentage {
    /// Build a percentage from the unscaled fraction value and its scale.
    ///
    /// # Panics
    ///
    /// Panics when `scale` exceeds [`MAX_SCALE`](super::amount::MAX_SCALE).
    pub fn new(value: i64, scale: u32) -> Self {
        Self(Amount::new(value, scale))
    }

    /// Wrap an amount expressing the fraction (`0.21` for 21%).
    pub fn from_fraction(fraction: Amount) -> Self {
        Self(fraction)
    }

    pub fn fraction(&self) -> Amount {
        self.0
    }

    pub fn scale(&self) -> u32 {
        self.0.scale()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Full-precision product `amount × fraction`; the scale is the sum of
    /// both scales.
    pub fn of_raw(&self, amount: Amount) -> Result<Amount, ArithmeticError> {
        amount.checked_mul(self.0)
    }

    /// The product brought back to the amount's own scale.
    pub fn of(&self, amount: Amount) -> Result<Amount, ArithmeticError> {
        self.of_rounded(amount, amount.scale())
    }

    /// The product rounded to `scale`, typically the currency's minor unit.
    pub fn of_rounded(&self, amount: Amount, scale: u32) -> Result<Amount, ArithmeticError> {
        self.of_raw(amount)?.rescale(scale)
    }

    /// `1 + fraction`, the multiplier that adds this percentage on top of a base.
    pub fn factor(&self) -> Result<Amount, ArithmeticError> {
        Amount::ONE.checked_add(self.0)
    }

    /// Reverse [`factor`](Self::factor): the base which, with this
    /// percentage added, gives `amount`. The quotient is produced at `scale`.
    pub fn remove(&self, amount: Amount, scale: u32) -> Result<Amount, ArithmeticError> {
        amount.divide(self.factor()?, scale)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fraction = self.0.as_decimal();
        let scale = fraction.scale();
        let shown = if scale >= 2 {
            Decimal::from_i128_with_scale(fraction.mantissa(), scale - 2)
        } else {
            fraction * Decimal::from(100)
        };
        write!(f, "{shown}%")
    }
}

impl FromStr for Percentage {
    type Err = ArithmeticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .trim()
            .strip_suffix('%')
            .ok_or_else(|| ArithmeticError::Parse(s.to_string()))?;
        let shown: Amount = digits.trim().parse()?;
        let fraction = Decimal::try_from_i128_with_scale(shown.mantissa(), shown.scale() + 2)
            .map_err(|_| ArithmeticError::Parse(s.to_string()))?;
        Ok(Self(Amount::from_decimal(fraction)))
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Percentage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
