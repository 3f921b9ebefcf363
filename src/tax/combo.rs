use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::category::{RateKey, TaxCategory};
use super::resolver::TaxRateResolver;
use crate::core::{CalcError, Percentage};

/// How a combo states its rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComboRate {
    /// Named rate, looked up in the regime on the document's issue date.
    Key(RateKey),
    /// Explicit percentage; never looked up.
    Percent(Percentage),
    /// Explicitly not taxable in this category.
    Exempt,
}

/// A line's association with one tax category and rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCombo {
    pub category: TaxCategory,
    pub rate: ComboRate,
    /// Resolved percentage (set by calculation, `None` when exempt).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<Percentage>,
    /// Resolved retained flag (set by calculation).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub retained: bool,
}

impl TaxCombo {
    pub fn with_key(category: TaxCategory, key: RateKey) -> Self {
        Self::from_rate(category, ComboRate::Key(key))
    }

    pub fn with_percent(category: TaxCategory, percent: Percentage) -> Self {
        Self::from_rate(category, ComboRate::Percent(percent))
    }

    pub fn exempt(category: TaxCategory) -> Self {
        Self::from_rate(category, ComboRate::Exempt)
    }

    fn from_rate(category: TaxCategory, rate: ComboRate) -> Self {
        Self {
            category,
            rate,
            percent: None,
            retained: false,
        }
    }

    /// The rate key, when the combo names one.
    pub fn key(&self) -> Option<&RateKey> {
        match &self.rate {
            ComboRate::Key(key) => Some(key),
            _ => None,
        }
    }

    pub fn is_exempt(&self) -> bool {
        matches!(self.rate, ComboRate::Exempt)
    }

    /// Fill in `percent` and `retained`. Explicit percentages skip the
    /// lookup entirely; exempt combos resolve to no percentage.
    pub fn resolve<R: TaxRateResolver + ?Sized>(
        &mut self,
        resolver: &R,
        date: NaiveDate,
        path: &str,
    ) -> Result<(), CalcError> {
        let percent = match &self.rate {
            ComboRate::Key(key) => Some(
                resolver
                    .resolve(&self.category, key, date)
                    .map_err(CalcError::unresolved(path))?,
            ),
            ComboRate::Percent(percent) => Some(*percent),
            ComboRate::Exempt => None,
        };
        self.retained = match resolver.is_retained(&self.category) {
            Ok(retained) => retained,
            Err(_) if self.is_exempt() => false,
            Err(e) => return Err(CalcError::unresolved(path)(e)),
        };
        self.percent = percent;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::regime::{CategoryDef, RateDef, RateValue, RegimeDef};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn regime() -> RegimeDef {
        RegimeDef::new("ES", "EUR").with_category(
            CategoryDef::new(TaxCategory::Vat).with_rate(
                RateDef::new(RateKey::Standard)
                    .with_value(RateValue::since(date(2012, 9, 1), Percentage::new(21, 2))),
            ),
        )
    }

    #[test]
    fn explicit_percent_overrides_lookup() {
        let mut combo = TaxCombo::with_percent(TaxCategory::Vat, Percentage::new(6, 2));
        // The regime has no value in 2001; an explicit percentage never asks.
        combo.resolve(&regime(), date(2001, 1, 1), "lines[0].taxes[0]").unwrap();
        assert_eq!(combo.percent, Some(Percentage::new(6, 2)));
    }

    #[test]
    fn key_resolution_and_failure() {
        let mut combo = TaxCombo::with_key(TaxCategory::Vat, RateKey::Standard);
        combo.resolve(&regime(), date(2022, 6, 13), "x").unwrap();
        assert_eq!(combo.percent, Some(Percentage::new(21, 2)));
        assert!(!combo.retained);

        let err = combo.resolve(&regime(), date(2010, 1, 1), "lines[3].taxes[0]");
        let err = err.unwrap_err();
        assert_eq!(err.code(), "unresolved-rate");
        assert!(err.to_string().contains("lines[3].taxes[0]"));
    }

    #[test]
    fn exempt_never_fails() {
        let mut combo = TaxCombo::exempt(TaxCategory::Other("ISS".into()));
        combo.resolve(&regime(), date(2022, 6, 13), "x").unwrap();
        assert_eq!(combo.percent, None);
    }

    #[test]
    fn serde_shape() {
        let combo = TaxCombo::with_key(TaxCategory::Vat, RateKey::Standard);
        let json = serde_json::to_string(&combo).unwrap();
        assert_eq!(json, r#"{"category":"VAT","rate":{"key":"standard"}}"#);
        let back: TaxCombo =
            serde_json::from_str(r#"{"category":"VAT","rate":{"percent":"10%"}}"#).unwrap();
        assert_eq!(back.rate, ComboRate::Percent(Percentage::new(10, 2)));
    }
}
