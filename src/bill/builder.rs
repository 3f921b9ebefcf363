use chrono::NaiveDate;

use super::types::*;
use crate::core::{Amount, CalcError, ExchangeRate, Percentage, is_known_currency_code};
use crate::tax::{RateKey, TaxCategory, TaxCombo, TaxRateResolver};

/// Builder for documents that are calculated on construction.
///
/// ```
/// use cuadre::*;
/// use chrono::NaiveDate;
///
/// let regime = RegimeDef::new("ES", "EUR").with_category(
///     CategoryDef::new(TaxCategory::Vat)
///         .with_rate(RateDef::new(RateKey::Standard).with_value(RateValue::always(Percentage::new(21, 2)))),
/// );
///
/// let invoice = InvoiceBuilder::new("T-100", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
///     .prices_include(TaxCategory::Vat)
///     .add_line(LineBuilder::new("Menu", Amount::new(2, 0), Amount::new(1210, 2))
///         .tax_rate(TaxCategory::Vat, RateKey::Standard)
///         .build())
///     .build(&regime)
///     .unwrap();
///
/// assert_eq!(invoice.totals.unwrap().total_with_tax.to_string(), "24.20");
/// ```
pub struct InvoiceBuilder {
    code: String,
    issue_date: NaiveDate,
    currency: String,
    prices_include: Option<TaxCategory>,
    lines: Vec<Line>,
    outlays: Vec<Outlay>,
    payment_terms: Option<String>,
    advances: Vec<Advance>,
    exchange_rates: Vec<ExchangeRate>,
}

impl InvoiceBuilder {
    pub fn new(code: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            code: code.into(),
            issue_date,
            currency: "EUR".to_string(),
            prices_include: None,
            lines: Vec::new(),
            outlays: Vec::new(),
            payment_terms: None,
            advances: Vec::new(),
            exchange_rates: Vec::new(),
        }
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = code.into();
        self
    }

    /// Line prices already contain this tax category.
    pub fn prices_include(mut self, category: TaxCategory) -> Self {
        self.prices_include = Some(category);
        self
    }

    pub fn add_line(mut self, line: Line) -> Self {
        self.lines.push(line);
        self
    }

    pub fn add_outlay(mut self, description: impl Into<String>, amount: Amount) -> Self {
        self.outlays.push(Outlay::new(description, amount));
        self
    }

    pub fn add_advance(mut self, advance: Advance) -> Self {
        self.advances.push(advance);
        self
    }

    pub fn payment_terms(mut self, terms: impl Into<String>) -> Self {
        self.payment_terms = Some(terms.into());
        self
    }

    pub fn exchange_rate(mut self, rate: ExchangeRate) -> Self {
        self.exchange_rates.push(rate);
        self
    }

    /// Build the document and calculate it against `resolver`.
    pub fn build<R: TaxRateResolver + ?Sized>(self, resolver: &R) -> Result<Invoice, CalcError> {
        let mut invoice = self.build_unchecked()?;
        if invoice.lines.is_empty() {
            return Err(CalcError::Builder("at least one line is required".into()));
        }
        invoice.calculate(resolver)?;
        Ok(invoice)
    }

    /// Build without calculating, e.g. to serialize a draft.
    pub fn build_unchecked(self) -> Result<Invoice, CalcError> {
        if self.code.trim().is_empty() {
            return Err(CalcError::Builder("document code is required".into()));
        }
        // Input limits
        if self.code.len() > 200 {
            return Err(CalcError::Builder(
                "document code cannot exceed 200 characters".into(),
            ));
        }
        if self.lines.len() > 10_000 {
            return Err(CalcError::Builder(
                "document cannot have more than 10,000 lines".into(),
            ));
        }
        if !is_known_currency_code(&self.currency) {
            return Err(CalcError::Builder(format!(
                "unknown currency '{}'",
                self.currency
            )));
        }

        let payment = if self.payment_terms.is_none() && self.advances.is_empty() {
            None
        } else {
            Some(Payment {
                terms: self.payment_terms,
                advances: self.advances,
            })
        };

        Ok(Invoice {
            code: self.code,
            issue_date: self.issue_date,
            currency: self.currency,
            prices_include: self.prices_include,
            lines: self.lines,
            outlays: self.outlays,
            payment,
            exchange_rates: self.exchange_rates,
            totals: None,
        })
    }
}

/// Builder for a single line.
pub struct LineBuilder {
    name: String,
    quantity: Amount,
    price: Amount,
    unit: Option<String>,
    discounts: Vec<LineAdjustment>,
    charges: Vec<LineAdjustment>,
    taxes: Vec<TaxCombo>,
}

impl LineBuilder {
    pub fn new(name: impl Into<String>, quantity: Amount, price: Amount) -> Self {
        Self {
            name: name.into(),
            quantity,
            price,
            unit: None,
            discounts: Vec::new(),
            charges: Vec::new(),
            taxes: Vec::new(),
        }
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn add_discount(mut self, discount: LineAdjustment) -> Self {
        self.discounts.push(discount);
        self
    }

    pub fn add_charge(mut self, charge: LineAdjustment) -> Self {
        self.charges.push(charge);
        self
    }

    /// Tax by a named rate, looked up on the issue date.
    pub fn tax_rate(mut self, category: TaxCategory, key: RateKey) -> Self {
        self.taxes.push(TaxCombo::with_key(category, key));
        self
    }

    pub fn tax_percent(mut self, category: TaxCategory, percent: Percentage) -> Self {
        self.taxes.push(TaxCombo::with_percent(category, percent));
        self
    }

    pub fn tax_exempt(mut self, category: TaxCategory) -> Self {
        self.taxes.push(TaxCombo::exempt(category));
        self
    }

    pub fn build(self) -> Line {
        Line {
            quantity: self.quantity,
            item: Item {
                name: self.name,
                price: self.price,
                unit: self.unit,
            },
            discounts: self.discounts,
            charges: self.charges,
            taxes: self.taxes,
            sum: None,
            total: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::{CategoryDef, RateDef, RateValue, RegimeDef};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn regime() -> RegimeDef {
        RegimeDef::new("ES", "EUR").with_category(
            CategoryDef::new(TaxCategory::Vat).with_rate(
                RateDef::new(RateKey::Standard)
                    .with_value(RateValue::always(Percentage::new(21, 2))),
            ),
        )
    }

    fn line() -> Line {
        LineBuilder::new("Hosting", Amount::new(1, 0), Amount::new(4999, 2))
            .unit("MON")
            .tax_rate(TaxCategory::Vat, RateKey::Standard)
            .build()
    }

    #[test]
    fn builds_and_calculates() {
        let invoice = InvoiceBuilder::new("B-1", date())
            .add_line(line())
            .add_outlay("Registry fee", Amount::new(1000, 2))
            .add_advance(Advance::amount("Paid", Amount::new(2000, 2)))
            .payment_terms("30 days")
            .build(&regime())
            .unwrap();
        let totals = invoice.totals.as_ref().unwrap();
        assert_eq!(totals.tax.to_string(), "10.50");
        assert_eq!(totals.payable.to_string(), "70.49");
        assert_eq!(totals.due.to_string(), "50.49");
        assert_eq!(invoice.payment.unwrap().terms.as_deref(), Some("30 days"));
    }

    #[test]
    fn rejects_empty_code() {
        let result = InvoiceBuilder::new(" ", date()).add_line(line()).build(&regime());
        assert!(matches!(result, Err(CalcError::Builder(_))));
    }

    #[test]
    fn rejects_long_code() {
        let result = InvoiceBuilder::new("X".repeat(201), date()).build_unchecked();
        assert!(matches!(result, Err(CalcError::Builder(_))));
    }

    #[test]
    fn rejects_unknown_currency() {
        let result = InvoiceBuilder::new("B-2", date())
            .currency("ZZZ")
            .add_line(line())
            .build(&regime());
        assert!(matches!(result, Err(CalcError::Builder(_))));
    }

    #[test]
    fn rejects_no_lines() {
        let result = InvoiceBuilder::new("B-3", date()).build(&regime());
        assert!(matches!(result, Err(CalcError::Builder(_))));
    }

    #[test]
    fn rejects_too_many_lines() {
        let mut builder = InvoiceBuilder::new("B-4", date());
        for _ in 0..10_001 {
            builder = builder.add_line(line());
        }
        assert!(matches!(builder.build_unchecked(), Err(CalcError::Builder(_))));
    }

    #[test]
    fn unchecked_leaves_totals_empty() {
        let invoice = InvoiceBuilder::new("B-5", date())
            .add_line(line())
            .build_unchecked()
            .unwrap();
        assert!(invoice.totals.is_none());
        assert!(invoice.payment.is_none());
        assert_eq!(invoice.lines[0].item.unit.as_deref(), Some("MON"));
    }
}
