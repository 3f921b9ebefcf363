//! Tax regime datasets: categories, their named rates and the dated
//! percentage values of each rate.
//!
//! A dataset is loaded once and only read afterwards, so it can be shared
//! across threads computing different documents.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::category::{RateKey, TaxCategory};
use crate::core::{CalcError, Percentage};

/// A jurisdiction's tax definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeDef {
    /// Country or regime code, e.g. "ES".
    pub code: String,
    /// Default ISO 4217 currency of documents issued under this regime.
    pub currency: String,
    #[serde(default)]
    pub categories: Vec<CategoryDef>,
}

/// One tax category and its rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDef {
    pub code: TaxCategory,
    /// Retained taxes are withheld by the buyer: they reduce the payable
    /// amount instead of adding to it.
    #[serde(default)]
    pub retained: bool,
    #[serde(default)]
    pub rates: Vec<RateDef>,
}

/// A named rate and its history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateDef {
    pub key: RateKey,
    /// Newest first. `since` dates must be strictly decreasing.
    pub values: Vec<RateValue>,
}

/// The percentage of a rate from a given date on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateValue {
    /// First day the value applies; `None` means it always applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<NaiveDate>,
    pub percent: Percentage,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
}

impl RegimeDef {
    pub fn new(code: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            currency: currency.into(),
            categories: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: CategoryDef) -> Self {
        self.categories.push(category);
        self
    }

    /// Load a dataset from JSON and validate it.
    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> Result<Self, CalcError> {
        let regime: RegimeDef =
            serde_json::from_str(json).map_err(|e| CalcError::Regime(e.to_string()))?;
        regime.validate()?;
        Ok(regime)
    }

    pub fn category(&self, code: &TaxCategory) -> Option<&CategoryDef> {
        self.categories.iter().find(|c| &c.code == code)
    }

    /// Check the dataset is internally consistent. Only needed when a
    /// dataset is assembled or loaded, not on every lookup.
    pub fn validate(&self) -> Result<(), CalcError> {
        if crate::core::currency_scale(&self.currency).is_none() {
            return Err(CalcError::Regime(format!(
                "{}: unknown currency '{}'",
                self.code, self.currency
            )));
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            if !seen.insert(&category.code) {
                return Err(CalcError::Regime(format!(
                    "{}: duplicate category {}",
                    self.code, category.code
                )));
            }
            category.validate()?;
        }
        Ok(())
    }
}

impl CategoryDef {
    pub fn new(code: TaxCategory) -> Self {
        Self {
            code,
            retained: false,
            rates: Vec::new(),
        }
    }

    pub fn retained(mut self) -> Self {
        self.retained = true;
        self
    }

    pub fn with_rate(mut self, rate: RateDef) -> Self {
        self.rates.push(rate);
        self
    }

    pub fn rate(&self, key: &RateKey) -> Option<&RateDef> {
        self.rates.iter().find(|r| &r.key == key)
    }

    fn validate(&self) -> Result<(), CalcError> {
        let mut seen = HashSet::new();
        for rate in &self.rates {
            if !seen.insert(&rate.key) {
                return Err(CalcError::Regime(format!(
                    "{}: duplicate rate {}",
                    self.code, rate.key
                )));
            }
            rate.validate(&self.code)?;
        }
        Ok(())
    }
}

impl RateDef {
    pub fn new(key: RateKey) -> Self {
        Self {
            key,
            values: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: RateValue) -> Self {
        self.values.push(value);
        self
    }

    /// The value in force on `date`: the newest enabled value whose `since`
    /// is on or before the date. A value without `since` is older than any
    /// dated one. The order of `values` does not matter here.
    pub fn on(&self, date: NaiveDate) -> Option<&RateValue> {
        self.values
            .iter()
            .filter(|v| !v.disabled && v.since.is_none_or(|since| since <= date))
            .max_by_key(|v| v.since)
    }

    fn validate(&self, category: &TaxCategory) -> Result<(), CalcError> {
        if self.values.is_empty() {
            return Err(CalcError::Regime(format!(
                "{category}/{}: at least one value is required",
                self.key
            )));
        }
        let mut previous: Option<NaiveDate> = None;
        for (i, value) in self.values.iter().enumerate() {
            match value.since {
                Some(since) => {
                    if previous.is_some_and(|p| since >= p) {
                        return Err(CalcError::Regime(format!(
                            "{category}/{}: values[{i}] since dates must be strictly decreasing",
                            self.key
                        )));
                    }
                    previous = Some(since);
                }
                None if i + 1 < self.values.len() => {
                    return Err(CalcError::Regime(format!(
                        "{category}/{}: values[{i}] without a since date must be the oldest",
                        self.key
                    )));
                }
                None => {}
            }
        }
        Ok(())
    }
}

impl RateValue {
    /// A value effective from `since` onwards.
    pub fn since(since: NaiveDate, percent: Percentage) -> Self {
        Self {
            since: Some(since),
            percent,
            disabled: false,
        }
    }

    /// A value with no start date.
    pub fn always(percent: Percentage) -> Self {
        Self {
            since: None,
            percent,
            disabled: false,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}
