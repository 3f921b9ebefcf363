//! Deriving a tax-exclusive rendering of a tax-inclusive document.
//!
//! Prices are divided by `1 + rate` at the original price scale plus a
//! number of guard digits. The guard grows with the quantity, because any
//! truncation in the unit price is multiplied by it: the derived price
//! must rebuild the original inclusive line sum, to the currency's minor
//! unit, once multiplied back by quantity and `1 + rate`.
//!
//! Each exclusive line total is rounded on its own when summed, so small
//! per-line differences add up over many lines. The payable of the derived
//! document is therefore projected as a whole and must stay within one
//! minor unit of the inclusive payable.

use tracing::debug;

use super::line::line_amounts;
use super::totals::aggregate;
use super::types::{Invoice, Line};
use crate::core::{Amount, ArithmeticError, CalcError, MAX_SCALE, Percentage, currency_scale};
use crate::tax::{ComboRate, TaxCategory};

/// Return a new, uncomputed copy of `invoice` whose prices exclude the
/// included tax category. The input is never modified; pass the result
/// through [`calculate`](super::calculate) to obtain its totals.
///
/// Every line's combo for the included category needs a percentage: either
/// resolved by a previous calculation or stated explicitly. Documents
/// without included taxes are returned as an identical copy.
///
/// Fails with [`CalcError::Reconciliation`] when the derived prices cannot
/// keep the payable within one minor unit of the inclusive figure.
pub fn remove_included_taxes(invoice: &Invoice) -> Result<Invoice, CalcError> {
    let mut out = invoice.clone();
    let Some(category) = invoice.prices_include.clone() else {
        return Ok(out);
    };
    let scale = currency_scale(&invoice.currency).ok_or_else(|| {
        CalcError::malformed(
            "currency",
            format!("unknown currency '{}'", invoice.currency),
        )
    })?;

    debug!(code = %invoice.code, %category, "removing included taxes");

    for (i, line) in out.lines.iter_mut().enumerate() {
        remove_from_line(line, &category, scale, &format!("lines[{i}]"))?;
    }

    if let Some(payment) = out.payment.as_mut() {
        for advance in &mut payment.advances {
            if advance.percent.is_some() {
                advance.amount = None;
            }
        }
    }
    out.prices_include = None;
    out.totals = None;

    let inclusive = projected_payable(invoice, Some(&category), scale)?;
    let exclusive = projected_payable(&out, None, scale)?;
    let drift = exclusive
        .checked_sub(inclusive)
        .map_err(CalcError::precision("totals.payable"))?
        .abs();
    if drift > Amount::new(1, scale) {
        return Err(CalcError::Reconciliation(format!(
            "totals.payable: exclusive {exclusive} differs from inclusive {inclusive} by {drift}"
        )));
    }
    debug!(code = %invoice.code, %inclusive, %exclusive, "included taxes removed");
    Ok(out)
}

/// Payable of `invoice` from its lines and outlays, using the percentages
/// its combos already carry.
fn projected_payable(
    invoice: &Invoice,
    included: Option<&TaxCategory>,
    scale: u32,
) -> Result<Amount, CalcError> {
    let mut lines = invoice.lines.clone();
    for (i, line) in lines.iter_mut().enumerate() {
        line_amounts(line, &format!("lines[{i}]"))?;
        for combo in &mut line.taxes {
            if let (None, ComboRate::Percent(percent)) = (combo.percent, &combo.rate) {
                combo.percent = Some(*percent);
            }
        }
    }
    let totals = aggregate(&lines, &invoice.outlays, &mut [], included, scale)?;
    Ok(totals.payable)
}

fn remove_from_line(
    line: &mut Line,
    category: &TaxCategory,
    currency_scale: u32,
    path: &str,
) -> Result<(), CalcError> {
    line.sum = None;
    line.total = None;

    let Some(combo) = line.combo(category) else {
        return Ok(());
    };
    let percent = match (combo.percent, &combo.rate) {
        (Some(percent), _) => percent,
        (None, ComboRate::Percent(percent)) => *percent,
        (None, ComboRate::Exempt) => return Ok(()),
        (None, _) => {
            return Err(CalcError::malformed(
                path,
                "tax combo is unresolved; calculate the document before removing included taxes",
            ));
        }
    };
    if percent.is_zero() {
        return Ok(());
    }

    let (price, guard) = exclusive_price(line.quantity, line.item.price, percent, currency_scale)
        .map_err(|e| match e {
            CalcError::Precision { source, .. } => CalcError::Precision {
                path: format!("{path}.item.price"),
                source,
            },
            other => other,
        })?;
    line.item.price = price;

    for (kind, adjustments) in [("discounts", &mut line.discounts), ("charges", &mut line.charges)] {
        for (i, adjustment) in adjustments.iter_mut().enumerate() {
            if adjustment.percent.is_some() {
                // recomputed from the new sum
                adjustment.amount = None;
            } else if let Some(amount) = adjustment.amount {
                let scale = amount.scale() + guard;
                adjustment.amount = Some(
                    percent
                        .remove(amount, scale)
                        .map_err(CalcError::precision(format!("{path}.{kind}[{i}].amount")))?,
                );
            }
        }
    }
    Ok(())
}

/// Divide an inclusive unit price by `1 + percent`, widening the guard
/// until the round trip reproduces the inclusive sum at currency precision.
fn exclusive_price(
    quantity: Amount,
    price: Amount,
    percent: Percentage,
    currency_scale: u32,
) -> Result<(Amount, u32), CalcError> {
    let factor = percent.factor().map_err(CalcError::precision("factor"))?;
    let original = quantity
        .checked_mul(price)
        .and_then(|sum| sum.rescale(currency_scale))
        .map_err(CalcError::precision("sum"))?;

    let mut guard = guard_digits(quantity);
    loop {
        let scale = price.scale() + guard;
        if scale + quantity.scale() + factor.scale() > MAX_SCALE {
            return Err(CalcError::precision("price")(ArithmeticError::ScaleOutOfRange(
                scale + quantity.scale() + factor.scale(),
            )));
        }
        let candidate = percent
            .remove(price, scale)
            .map_err(CalcError::precision("price"))?;
        let rebuilt = candidate
            .checked_mul(quantity)
            .and_then(|sum| sum.checked_mul(factor))
            .and_then(|sum| sum.rescale(currency_scale))
            .map_err(CalcError::precision("price"))?;
        if rebuilt == original {
            return Ok((candidate, guard));
        }
        debug!(%price, %quantity, guard, "round trip missed, widening guard digits");
        guard += 1;
    }
}

/// The reverse of adding `percent` to a line total, at the total's scale
/// plus the guard digits of the line's quantity.
pub(crate) fn exclusive_line_total(
    total: Amount,
    quantity: Amount,
    percent: Percentage,
) -> Result<Amount, ArithmeticError> {
    percent.remove(total, total.scale() + guard_digits(quantity))
}

/// One more digit than the integer part of the quantity has.
pub(crate) fn guard_digits(quantity: Amount) -> u32 {
    let whole = quantity
        .as_decimal()
        .abs()
        .trunc()
        .normalize()
        .mantissa()
        .unsigned_abs();
    whole.checked_ilog10().map_or(1, |d| d + 1) + 1
}
