use chrono::NaiveDate;

use super::category::{RateKey, TaxCategory};
use super::regime::RegimeDef;
use crate::core::{Percentage, RateLookupError};

/// Source of tax percentages for the calculation engine.
///
/// Implementations must be pure: the same category, key and date always
/// give the same answer during a computation pass. `Sync` lets several
/// documents be computed in parallel against one dataset.
pub trait TaxRateResolver: Sync {
    /// The percentage of `key` within `category` in force on `date`.
    fn resolve(
        &self,
        category: &TaxCategory,
        key: &RateKey,
        date: NaiveDate,
    ) -> Result<Percentage, RateLookupError>;

    /// Whether amounts of this category are withheld rather than added.
    fn is_retained(&self, category: &TaxCategory) -> Result<bool, RateLookupError>;
}

impl TaxRateResolver for RegimeDef {
    fn resolve(
        &self,
        category: &TaxCategory,
        key: &RateKey,
        date: NaiveDate,
    ) -> Result<Percentage, RateLookupError> {
        let def = self
            .category(category)
            .ok_or_else(|| RateLookupError::UnknownCategory(category.to_string()))?;
        let rate = def.rate(key).ok_or_else(|| RateLookupError::UnknownRate {
            category: category.to_string(),
            key: key.to_string(),
        })?;
        rate.on(date)
            .map(|v| v.percent)
            .ok_or_else(|| RateLookupError::NoValueOn {
                category: category.to_string(),
                key: key.to_string(),
                date,
            })
    }

    fn is_retained(&self, category: &TaxCategory) -> Result<bool, RateLookupError> {
        self.category(category)
            .map(|c| c.retained)
            .ok_or_else(|| RateLookupError::UnknownCategory(category.to_string()))
    }
}
