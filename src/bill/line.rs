use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::trace;

use super::types::{Line, LineAdjustment};
use crate::core::{Amount, CalcError};
use crate::tax::TaxRateResolver;

/// Compute a line's sum, discount and charge amounts, total and tax
/// percentages. Quantity and price are never touched.
pub fn calculate_line<R: TaxRateResolver + ?Sized>(
    line: &mut Line,
    index: usize,
    issue_date: NaiveDate,
    resolver: &R,
) -> Result<(), CalcError> {
    let path = format!("lines[{index}]");
    let (sum, total) = line_amounts(line, &path)?;

    let mut categories = HashSet::new();
    for (i, combo) in line.taxes.iter_mut().enumerate() {
        let combo_path = format!("{path}.taxes[{i}]");
        if !categories.insert(combo.category.clone()) {
            return Err(CalcError::malformed(
                combo_path,
                format!("duplicate tax category {}", combo.category),
            ));
        }
        combo.resolve(resolver, issue_date, &combo_path)?;
    }

    trace!(line = index, %sum, %total, "line calculated");
    Ok(())
}

/// Sum, adjustment amounts and total of a line, written back to it.
pub(crate) fn line_amounts(line: &mut Line, path: &str) -> Result<(Amount, Amount), CalcError> {
    let sum = line
        .quantity
        .checked_mul(line.item.price)
        .map_err(CalcError::precision(format!("{path}.sum")))?;

    let mut total = sum;
    for (i, discount) in line.discounts.iter_mut().enumerate() {
        let amount = resolve_adjustment(discount, sum, &format!("{path}.discounts[{i}]"))?;
        total = total
            .checked_sub(amount)
            .map_err(CalcError::precision(format!("{path}.total")))?;
    }
    for (i, charge) in line.charges.iter_mut().enumerate() {
        let amount = resolve_adjustment(charge, sum, &format!("{path}.charges[{i}]"))?;
        total = total
            .checked_add(amount)
            .map_err(CalcError::precision(format!("{path}.total")))?;
    }

    line.sum = Some(sum);
    line.total = Some(total);
    Ok((sum, total))
}

/// Percentages are applied to the line sum at the sum's own scale; fixed
/// amounts are used as given.
fn resolve_adjustment(
    adjustment: &mut LineAdjustment,
    sum: Amount,
    path: &str,
) -> Result<Amount, CalcError> {
    let amount = match (adjustment.percent, adjustment.amount) {
        (Some(percent), _) => percent.of(sum).map_err(CalcError::precision(path))?,
        (None, Some(amount)) => amount,
        (None, None) => {
            return Err(CalcError::malformed(
                path,
                "either a percent or an amount is required",
            ));
        }
    };
    adjustment.amount = Some(amount);
    Ok(amount)
}
