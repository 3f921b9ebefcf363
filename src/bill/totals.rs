use super::advance::resolve_advance;
use super::included::exclusive_line_total;
use super::types::{Advance, CategoryTotal, Line, Outlay, RateTotal, TaxTotal, Totals};
use crate::core::{Amount, CalcError, Percentage};
use crate::tax::{RateKey, TaxCategory};

/// Tax base accumulated for one (category, rate) group.
struct RateGroup {
    key: Option<RateKey>,
    percent: Option<Percentage>,
    /// Tax-exclusive base at full precision.
    base: Amount,
    /// Line totals as stated, only meaningful for the included category.
    stated: Amount,
}

struct CategoryGroup {
    code: TaxCategory,
    retained: bool,
    rates: Vec<RateGroup>,
}

/// Combine calculated lines, outlays and advances into document totals.
///
/// Tax is computed once per (category, rate) group on the unrounded sum of
/// its bases, then rounded to `scale`. When prices include `included`,
/// each line total is reversed to its exclusive base first and the group's
/// tax is what separates the stated totals from those bases.
pub fn aggregate(
    lines: &[Line],
    outlays: &[Outlay],
    advances: &mut [Advance],
    included: Option<&TaxCategory>,
    scale: u32,
) -> Result<Totals, CalcError> {
    let zero = Amount::zero(scale).map_err(CalcError::precision("currency"))?;
    let round = |a: Amount, path: &str| a.rescale(scale).map_err(CalcError::precision(path));
    let add = |a: Amount, b: Amount, path: &str| a.checked_add(b).map_err(CalcError::precision(path));
    let sub = |a: Amount, b: Amount, path: &str| a.checked_sub(b).map_err(CalcError::precision(path));

    let mut sum = zero;
    let mut groups: Vec<CategoryGroup> = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let path = format!("lines[{i}]");
        let total = line.total.ok_or_else(|| {
            CalcError::malformed(&path, "line total has not been calculated")
        })?;
        sum = add(sum, round(total, "totals.sum")?, "totals.sum")?;

        let base = match included.and_then(|c| line.combo(c)).and_then(|c| c.percent) {
            Some(percent) => exclusive_line_total(total, line.quantity, percent)
                .map_err(CalcError::precision(format!("{path}.total")))?,
            None => total,
        };

        for combo in &line.taxes {
            let gi = match groups.iter().position(|g| g.code == combo.category) {
                Some(gi) => gi,
                None => {
                    groups.push(CategoryGroup {
                        code: combo.category.clone(),
                        retained: combo.retained,
                        rates: Vec::new(),
                    });
                    groups.len() - 1
                }
            };
            let category = &mut groups[gi];
            let key = combo.key().cloned();
            let ri = match category
                .rates
                .iter()
                .position(|r| r.key == key && r.percent == combo.percent)
            {
                Some(ri) => ri,
                None => {
                    category.rates.push(RateGroup {
                        key,
                        percent: combo.percent,
                        base: Amount::ZERO,
                        stated: Amount::ZERO,
                    });
                    category.rates.len() - 1
                }
            };
            let rate = &mut category.rates[ri];
            rate.base = add(rate.base, base, "totals.taxes")?;
            rate.stated = add(rate.stated, total, "totals.taxes")?;
        }
    }

    let mut categories = Vec::with_capacity(groups.len());
    let mut tax = zero;
    let mut included_tax = zero;
    for group in groups {
        let is_included = included == Some(&group.code);
        let path = format!("totals.taxes.{}", group.code);
        let mut rates = Vec::with_capacity(group.rates.len());
        let (mut base_total, mut amount_total) = (zero, zero);
        for rate in group.rates {
            let (base, amount) = match rate.percent {
                Some(_) if is_included => {
                    let amount = round(sub(rate.stated, rate.base, &path)?, &path)?;
                    (sub(round(rate.stated, &path)?, amount, &path)?, amount)
                }
                Some(percent) => {
                    let amount = percent
                        .of_rounded(rate.base, scale)
                        .map_err(CalcError::precision(&path))?;
                    (round(rate.base, &path)?, amount)
                }
                None => (round(rate.base, &path)?, zero),
            };
            base_total = add(base_total, base, &path)?;
            amount_total = add(amount_total, amount, &path)?;
            rates.push(RateTotal {
                key: rate.key,
                percent: rate.percent,
                base,
                amount,
            });
        }

        tax = if group.retained {
            sub(tax, amount_total, "totals.tax")?
        } else {
            add(tax, amount_total, "totals.tax")?
        };
        if is_included {
            included_tax = amount_total;
        }
        categories.push(CategoryTotal {
            code: group.code,
            retained: group.retained,
            rates,
            base: base_total,
            amount: amount_total,
        });
    }

    let total = sub(sum, included_tax, "totals.total")?;
    let total_with_tax = add(total, tax, "totals.total_with_tax")?;

    let mut outlay_sum = zero;
    for (i, outlay) in outlays.iter().enumerate() {
        let amount = round(outlay.amount, &format!("outlays[{i}].amount"))?;
        outlay_sum = add(outlay_sum, amount, "totals.outlays")?;
    }
    let payable = add(total_with_tax, outlay_sum, "totals.payable")?;

    let mut advance_sum = zero;
    for (i, advance) in advances.iter_mut().enumerate() {
        let amount = resolve_advance(
            advance,
            total_with_tax,
            scale,
            &format!("payment.advances[{i}]"),
        )?;
        advance_sum = add(advance_sum, amount, "totals.advances")?;
    }
    let due = sub(payable, advance_sum, "totals.due")?;

    Ok(Totals {
        sum,
        total,
        taxes: TaxTotal {
            categories,
            sum: tax,
        },
        tax,
        total_with_tax,
        outlays: outlay_sum,
        payable,
        advances: advance_sum,
        due,
    })
}
