//! Document calculation.
//!
//! [`calculate`] fills in every derived figure of an [`Invoice`]: line sums
//! and totals, resolved tax percentages, discount, charge and advance
//! amounts, and the reconciled [`Totals`]. [`remove_included_taxes`]
//! derives the tax-exclusive rendering of a document whose prices
//! include a tax.

mod advance;
mod builder;
mod included;
mod line;
mod totals;
mod types;
mod validation;

pub use advance::resolve_advance;
pub use builder::{InvoiceBuilder, LineBuilder};
pub use included::remove_included_taxes;
pub use line::calculate_line;
pub use totals::aggregate;
pub use types::*;
pub use validation::validate_totals;

use tracing::debug;

use crate::core::{CalcError, currency_scale};
use crate::tax::TaxRateResolver;

/// Calculate every derived field of `invoice` in place.
///
/// Works on a copy and only writes back on success, so a failed pass leaves
/// the document exactly as it was. Calculating an already calculated
/// document gives the same result.
pub fn calculate<R: TaxRateResolver + ?Sized>(
    invoice: &mut Invoice,
    resolver: &R,
) -> Result<(), CalcError> {
    let scale = currency_scale(&invoice.currency).ok_or_else(|| {
        CalcError::malformed(
            "currency",
            format!("unknown currency '{}'", invoice.currency),
        )
    })?;
    for (i, rate) in invoice.exchange_rates.iter().enumerate() {
        rate.validate(&format!("exchange_rates[{i}]"))?;
    }
    if let Some(category) = &invoice.prices_include {
        let retained = resolver
            .is_retained(category)
            .map_err(CalcError::unresolved("prices_include"))?;
        if retained {
            return Err(CalcError::malformed(
                "prices_include",
                format!("retained category {category} cannot be included in prices"),
            ));
        }
    }

    debug!(
        code = %invoice.code,
        lines = invoice.lines.len(),
        currency = %invoice.currency,
        "calculating document"
    );

    let mut work = invoice.clone();
    for (i, line) in work.lines.iter_mut().enumerate() {
        line::calculate_line(line, i, work.issue_date, resolver)?;
    }

    let mut advances = work
        .payment
        .as_ref()
        .map(|p| p.advances.clone())
        .unwrap_or_default();
    let totals = totals::aggregate(
        &work.lines,
        &work.outlays,
        &mut advances,
        work.prices_include.as_ref(),
        scale,
    )?;
    if let Some(payment) = work.payment.as_mut() {
        payment.advances = advances;
    }
    work.totals = Some(totals);

    let errors = validation::validate_totals(&work);
    if !errors.is_empty() {
        let msg = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(CalcError::Reconciliation(msg));
    }

    debug!(code = %work.code, "document reconciled");
    *invoice = work;
    Ok(())
}

impl Invoice {
    /// See [`calculate`].
    pub fn calculate<R: TaxRateResolver + ?Sized>(&mut self, resolver: &R) -> Result<(), CalcError> {
        calculate(self, resolver)
    }

    /// See [`remove_included_taxes`].
    pub fn remove_included_taxes(&self) -> Result<Invoice, CalcError> {
        included::remove_included_taxes(self)
    }

    /// Calculated totals rendered in `currency` through the document's
    /// exchange rates. `None` before calculation or when no rate applies.
    pub fn totals_in(&self, currency: &str) -> Result<Option<Totals>, CalcError> {
        let Some(totals) = &self.totals else {
            return Ok(None);
        };
        if currency == self.currency {
            return Ok(Some(totals.clone()));
        }
        match crate::core::exchange::match_exchange_rate(&self.exchange_rates, &self.currency, currency) {
            Some(rate) => totals.convert(rate).map(Some),
            None => Ok(None),
        }
    }
}
