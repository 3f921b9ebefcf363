use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{Amount, CalcError, ExchangeRate, Percentage};
use crate::tax::{RateKey, TaxCategory, TaxCombo};

/// The document whose figures are computed.
///
/// Raw inputs are set by the caller; `Line::sum`, `Line::total`, resolved
/// discount/charge/advance amounts, resolved tax combos and `totals` are
/// derived by [`calculate`](super::calculate) and never meant to be set
/// by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Document code or number.
    pub code: String,
    /// Rates are resolved as of this date.
    pub issue_date: NaiveDate,
    /// ISO 4217 currency of every amount in the document.
    pub currency: String,
    /// When set, line prices already contain this tax category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prices_include: Option<TaxCategory>,
    pub lines: Vec<Line>,
    /// Disbursements made on the customer's behalf; payable but untaxed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outlays: Vec<Outlay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
    /// Rates for presenting totals in other currencies.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exchange_rates: Vec<ExchangeRate>,
    /// Calculated totals (set by `calculate()`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totals: Option<Totals>,
}

/// Invoice line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub quantity: Amount,
    pub item: Item,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discounts: Vec<LineAdjustment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub charges: Vec<LineAdjustment>,
    /// At most one combo per category.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taxes: Vec<TaxCombo>,
    /// quantity × price (set by `calculate()`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sum: Option<Amount>,
    /// sum − discounts + charges (set by `calculate()`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Amount>,
}

/// What is being sold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    /// Unit price, tax-inclusive when the invoice says so.
    pub price: Amount,
    /// Unit of measure (UNECE Rec 20, e.g. "HUR").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// A line discount or charge. Either `percent` is given and `amount` is
/// derived from the line sum, or `amount` is given directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineAdjustment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<Percentage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
}

/// A disbursement paid on the customer's behalf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outlay {
    pub description: String,
    pub amount: Amount,
}

/// Payment terms and advances already received.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advances: Vec<Advance>,
}

/// A prior payment, as a fixed amount or as a share of the total with tax.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advance {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<Percentage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
}

/// Document totals, all at currency precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of line totals, each rounded to currency precision.
    pub sum: Amount,
    /// Tax-exclusive total.
    pub total: Amount,
    /// Breakdown by category and rate.
    pub taxes: TaxTotal,
    /// Non-retained tax minus retained tax.
    pub tax: Amount,
    /// total + tax.
    pub total_with_tax: Amount,
    /// Sum of outlays.
    pub outlays: Amount,
    /// total_with_tax + outlays.
    pub payable: Amount,
    /// Sum of resolved advances.
    pub advances: Amount,
    /// payable − advances.
    pub due: Amount,
}

/// Tax breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaxTotal {
    pub categories: Vec<CategoryTotal>,
    /// Non-retained amounts minus retained amounts.
    pub sum: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub code: TaxCategory,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub retained: bool,
    pub rates: Vec<RateTotal>,
    pub base: Amount,
    pub amount: Amount,
}

/// Base and tax of one (category, rate) group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTotal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<RateKey>,
    /// `None` for exempt groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<Percentage>,
    pub base: Amount,
    pub amount: Amount,
}

impl Invoice {
    pub fn advances(&self) -> &[Advance] {
        self.payment
            .as_ref()
            .map(|p| p.advances.as_slice())
            .unwrap_or_default()
    }
}

impl Line {
    /// The combo of `category`, if the line has one.
    pub fn combo(&self, category: &TaxCategory) -> Option<&TaxCombo> {
        self.taxes.iter().find(|c| &c.category == category)
    }
}

impl LineAdjustment {
    pub fn percent(percent: Percentage) -> Self {
        Self {
            percent: Some(percent),
            ..Default::default()
        }
    }

    pub fn amount(amount: Amount) -> Self {
        Self {
            amount: Some(amount),
            ..Default::default()
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

impl Outlay {
    pub fn new(description: impl Into<String>, amount: Amount) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

impl Advance {
    /// A share of the document's total with tax.
    pub fn percent(description: impl Into<String>, percent: Percentage) -> Self {
        Self {
            description: description.into(),
            percent: Some(percent),
            amount: None,
        }
    }

    pub fn amount(description: impl Into<String>, amount: Amount) -> Self {
        Self {
            description: description.into(),
            percent: None,
            amount: Some(amount),
        }
    }
}

impl TaxTotal {
    pub fn category(&self, code: &TaxCategory) -> Option<&CategoryTotal> {
        self.categories.iter().find(|c| &c.code == code)
    }
}

impl Totals {
    /// Render every figure in another currency using a supplied rate. Each
    /// figure is converted and rounded on its own, so the converted set is
    /// for presentation and is not re-reconciled.
    pub fn convert(&self, rate: &ExchangeRate) -> Result<Totals, CalcError> {
        let c = |a: Amount| rate.convert(a);
        let categories = self
            .taxes
            .categories
            .iter()
            .map(|ct| {
                let rates = ct
                    .rates
                    .iter()
                    .map(|rt| {
                        Ok(RateTotal {
                            key: rt.key.clone(),
                            percent: rt.percent,
                            base: c(rt.base)?,
                            amount: c(rt.amount)?,
                        })
                    })
                    .collect::<Result<Vec<_>, CalcError>>()?;
                Ok(CategoryTotal {
                    code: ct.code.clone(),
                    retained: ct.retained,
                    rates,
                    base: c(ct.base)?,
                    amount: c(ct.amount)?,
                })
            })
            .collect::<Result<Vec<_>, CalcError>>()?;

        Ok(Totals {
            sum: c(self.sum)?,
            total: c(self.total)?,
            taxes: TaxTotal {
                categories,
                sum: c(self.taxes.sum)?,
            },
            tax: c(self.tax)?,
            total_with_tax: c(self.total_with_tax)?,
            outlays: c(self.outlays)?,
            payable: c(self.payable)?,
            advances: c(self.advances)?,
            due: c(self.due)?,
        })
    }
}
