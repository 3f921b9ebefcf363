//! Applying supplied exchange rates. Rates are data, never looked up.

use serde::{Deserialize, Serialize};

use super::amount::Amount;
use super::currencies::currency_scale;
use super::error::CalcError;

/// How much one unit of `from` is worth in `to`.
///
/// A document in EUR with an amount in USD carries
/// `ExchangeRate { from: "USD", to: "EUR", amount: 0.875967 }`, and
/// `100.00 USD` converts into `87.60 EUR`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub from: String,
    pub to: String,
    pub amount: Amount,
}

impl ExchangeRate {
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: Amount) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }

    /// Multiply by the rate and round to the destination currency's precision.
    pub fn convert(&self, amount: Amount) -> Result<Amount, CalcError> {
        let scale = currency_scale(&self.to).ok_or_else(|| {
            CalcError::malformed("exchange_rate.to", format!("unknown currency '{}'", self.to))
        })?;
        amount
            .checked_mul(self.amount)
            .and_then(|a| a.rescale(scale))
            .map_err(CalcError::precision(format!("exchange_rate[{}→{}]", self.from, self.to)))
    }

    /// Rejects unknown currencies, identity rates and non-positive amounts.
    pub fn validate(&self, path: &str) -> Result<(), CalcError> {
        for (field, code) in [("from", &self.from), ("to", &self.to)] {
            if currency_scale(code).is_none() {
                return Err(CalcError::malformed(
                    format!("{path}.{field}"),
                    format!("unknown currency '{code}'"),
                ));
            }
        }
        if self.from == self.to {
            return Err(CalcError::malformed(
                path,
                "exchange rate must convert between two different currencies",
            ));
        }
        if !self.amount.is_positive() {
            return Err(CalcError::malformed(
                format!("{path}.amount"),
                "exchange rate must be positive",
            ));
        }
        Ok(())
    }
}

/// Find the rate converting `from` into `to`. Same-currency lookups and
/// missing rates both give `None`.
pub fn match_exchange_rate<'a>(
    rates: &'a [ExchangeRate],
    from: &str,
    to: &str,
) -> Option<&'a ExchangeRate> {
    if from == to {
        return None;
    }
    rates.iter().find(|r| r.from == from && r.to == to)
}

/// Convert between currencies using the supplied rates. Returns the amount
/// untouched when both currencies match and `None` when no rate applies.
pub fn convert(
    rates: &[ExchangeRate],
    from: &str,
    to: &str,
    amount: Amount,
) -> Result<Option<Amount>, CalcError> {
    if from == to {
        return Ok(Some(amount));
    }
    match match_exchange_rate(rates, from, to) {
        Some(rate) => rate.convert(amount).map(Some),
        None => Ok(None),
    }
}
