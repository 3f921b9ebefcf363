use super::types::{Invoice, Totals};
use crate::core::{Amount, ValidationError, currency_scale};

/// Check that calculated totals agree with each other and with the lines.
///
/// Returns all findings rather than stopping at the first. An empty result
/// means the document reconciles to the last minor unit.
pub fn validate_totals(invoice: &Invoice) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let Some(totals) = &invoice.totals else {
        errors.push(ValidationError::new(
            "totals",
            "totals must be calculated before validation",
        ));
        return errors;
    };
    let Some(scale) = currency_scale(&invoice.currency) else {
        errors.push(ValidationError::new(
            "currency",
            format!("unknown currency '{}'", invoice.currency),
        ));
        return errors;
    };

    check_scales(totals, scale, &mut errors);

    let mut check = |field: &str, actual: Amount, expected: Option<Amount>, what: &str| match expected {
        Some(expected) if expected == actual => {}
        Some(expected) => errors.push(ValidationError::new(
            field,
            format!("{actual} does not match {what} {expected}"),
        )),
        None => errors.push(ValidationError::new(
            field,
            format!("{what} cannot be computed exactly"),
        )),
    };

    let line_totals = invoice
        .lines
        .iter()
        .map(|l| l.total.and_then(|t| t.rescale(scale).ok()))
        .collect::<Option<Vec<_>>>();
    let expected_sum = line_totals.and_then(|t| Amount::checked_sum(t).ok());
    check("totals.sum", totals.sum, expected_sum, "sum of line totals");

    let mut expected_tax = Some(Amount::ZERO);
    let mut included_tax = Amount::ZERO;
    for (i, category) in totals.taxes.categories.iter().enumerate() {
        let path = format!("totals.taxes.categories[{i}]");
        let base = Amount::checked_sum(category.rates.iter().map(|r| r.base)).ok();
        check(&format!("{path}.base"), category.base, base, "sum of rate bases");
        let amount = Amount::checked_sum(category.rates.iter().map(|r| r.amount)).ok();
        check(&format!("{path}.amount"), category.amount, amount, "sum of rate amounts");

        expected_tax = expected_tax.and_then(|t| {
            if category.retained {
                t.checked_sub(category.amount).ok()
            } else {
                t.checked_add(category.amount).ok()
            }
        });
        if invoice.prices_include.as_ref() == Some(&category.code) {
            included_tax = category.amount;
        }
    }
    check("totals.taxes.sum", totals.taxes.sum, expected_tax, "category balance");
    check("totals.tax", totals.tax, Some(totals.taxes.sum), "tax breakdown sum");

    check(
        "totals.total",
        totals.total,
        totals.sum.checked_sub(included_tax).ok(),
        "sum minus included tax",
    );
    check(
        "totals.total_with_tax",
        totals.total_with_tax,
        totals.total.checked_add(totals.tax).ok(),
        "total plus tax",
    );

    let outlays = invoice
        .outlays
        .iter()
        .map(|o| o.amount.rescale(scale).ok())
        .collect::<Option<Vec<_>>>()
        .and_then(|o| Amount::checked_sum(o).ok());
    check("totals.outlays", totals.outlays, outlays, "sum of outlays");
    check(
        "totals.payable",
        totals.payable,
        totals.total_with_tax.checked_add(totals.outlays).ok(),
        "total with tax plus outlays",
    );

    let advances = invoice
        .advances()
        .iter()
        .map(|a| a.amount.and_then(|amount| amount.rescale(scale).ok()))
        .collect::<Option<Vec<_>>>()
        .and_then(|a| Amount::checked_sum(a).ok());
    check("totals.advances", totals.advances, advances, "sum of advances");
    check(
        "totals.due",
        totals.due,
        totals.payable.checked_sub(totals.advances).ok(),
        "payable minus advances",
    );

    errors
}

fn check_scales(totals: &Totals, scale: u32, errors: &mut Vec<ValidationError>) {
    let mut fields = vec![
        ("totals.sum".to_string(), totals.sum),
        ("totals.total".to_string(), totals.total),
        ("totals.taxes.sum".to_string(), totals.taxes.sum),
        ("totals.tax".to_string(), totals.tax),
        ("totals.total_with_tax".to_string(), totals.total_with_tax),
        ("totals.outlays".to_string(), totals.outlays),
        ("totals.payable".to_string(), totals.payable),
        ("totals.advances".to_string(), totals.advances),
        ("totals.due".to_string(), totals.due),
    ];
    for (i, category) in totals.taxes.categories.iter().enumerate() {
        let path = format!("totals.taxes.categories[{i}]");
        fields.push((format!("{path}.base"), category.base));
        fields.push((format!("{path}.amount"), category.amount));
        for (j, rate) in category.rates.iter().enumerate() {
            fields.push((format!("{path}.rates[{j}].base"), rate.base));
            fields.push((format!("{path}.rates[{j}].amount"), rate.amount));
        }
    }
    for (field, amount) in fields {
        if amount.scale() != scale {
            errors.push(ValidationError::new(
                field,
                format!("{amount} is not at currency precision ({scale} decimals)"),
            ));
        }
    }
}
