//! Edge cases of the calculation pipeline: degenerate lines, unusual
//! currencies, adjustments and advances at their limits.

use chrono::NaiveDate;
use cuadre::*;
use rust_decimal_macros::dec;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn amt(s: &str) -> Amount {
    s.parse().unwrap()
}

fn pct(s: &str) -> Percentage {
    s.parse().unwrap()
}

fn regime() -> RegimeDef {
    RegimeDef::new("ES", "EUR").with_category(
        CategoryDef::new(TaxCategory::Vat)
            .with_rate(
                RateDef::new(RateKey::Standard)
                    .with_value(RateValue::always(pct("21%"))),
            )
            .with_rate(RateDef::new(RateKey::Zero).with_value(RateValue::always(pct("0%")))),
    )
}

fn line(quantity: &str, price: &str) -> LineBuilder {
    LineBuilder::new("Item", amt(quantity), amt(price)).tax_rate(TaxCategory::Vat, RateKey::Standard)
}

fn build(lines: Vec<Line>) -> Invoice {
    let mut builder = InvoiceBuilder::new("EDGE-1", date(2024, 5, 1));
    for l in lines {
        builder = builder.add_line(l);
    }
    builder.build(&regime()).unwrap()
}

// ---------------------------------------------------------------------------
// Lines
// ---------------------------------------------------------------------------

#[test]
fn zero_quantity_line() {
    let inv = build(vec![line("0", "99.99").build()]);
    let totals = inv.totals.unwrap();
    assert!(totals.payable.is_zero());
    assert_eq!(totals.payable.to_string(), "0.00");
}

#[test]
fn fractional_quantity_keeps_full_precision_on_line() {
    let inv = build(vec![line("1.5", "10.333").build()]);
    assert_eq!(inv.lines[0].sum.unwrap().to_string(), "15.4995");
    let totals = inv.totals.unwrap();
    assert_eq!(totals.sum.to_string(), "15.50");
    // 21% of the unrounded 15.4995
    assert_eq!(totals.tax.to_string(), "3.25");
}

#[test]
fn discounts_are_not_chained() {
    let inv = build(vec![
        line("1", "100.00")
            .add_discount(LineAdjustment::percent(pct("10%")))
            .add_discount(LineAdjustment::percent(pct("10%")))
            .build(),
    ]);
    let l = &inv.lines[0];
    assert_eq!(l.discounts[1].amount.unwrap().to_string(), "10.00");
    assert_eq!(l.total.unwrap().to_string(), "80.00");
}

#[test]
fn full_discount_leaves_zero_total() {
    let inv = build(vec![
        line("2", "25.00")
            .add_discount(LineAdjustment::percent(pct("100%")))
            .build(),
    ]);
    assert!(inv.lines[0].total.unwrap().is_zero());
    assert!(inv.totals.unwrap().tax.is_zero());
}

#[test]
fn charge_with_fixed_amount_of_higher_scale() {
    let inv = build(vec![
        line("1", "10.00")
            .add_charge(LineAdjustment::amount(Amount::from(dec!(0.125))).with_reason("Handling"))
            .build(),
    ]);
    assert_eq!(inv.lines[0].total.unwrap().to_string(), "10.125");
    let totals = inv.totals.unwrap();
    assert_eq!(totals.sum.to_string(), "10.13");
    assert_eq!(totals.total.to_string(), "10.13");
    assert_eq!(totals.tax.to_string(), "2.13");
}

#[test]
fn adjustment_without_value_is_malformed() {
    let result = InvoiceBuilder::new("EDGE-2", date(2024, 5, 1))
        .add_line(line("1", "10.00").add_discount(LineAdjustment::default()).build())
        .build(&regime());
    let err = result.unwrap_err();
    assert_eq!(err.code(), "malformed");
    assert!(err.to_string().contains("lines[0].discounts[0]"));
}

#[test]
fn two_combos_of_one_category_are_malformed() {
    let result = InvoiceBuilder::new("EDGE-3", date(2024, 5, 1))
        .add_line(
            line("1", "10.00")
                .tax_percent(TaxCategory::Vat, pct("10%"))
                .build(),
        )
        .build(&regime());
    assert!(matches!(result, Err(CalcError::Malformed { .. })));
}

#[test]
fn untaxed_document_has_empty_breakdown() {
    let inv = build(vec![LineBuilder::new("Stamp", amt("3"), amt("0.85")).build()]);
    let totals = inv.totals.unwrap();
    assert!(totals.taxes.categories.is_empty());
    assert_eq!(totals.tax.to_string(), "0.00");
    assert_eq!(totals.payable.to_string(), "2.55");
}

#[test]
fn same_key_and_percent_share_a_group() {
    let inv = build(vec![line("1", "0.07").build(), line("1", "0.07").build()]);
    let totals = inv.totals.unwrap();
    let vat = totals.taxes.category(&TaxCategory::Vat).unwrap();
    assert_eq!(vat.rates.len(), 1);
    // 0.0294 rounded once, not 0.01 + 0.01
    assert_eq!(vat.amount.to_string(), "0.03");
}

// ---------------------------------------------------------------------------
// Currencies
// ---------------------------------------------------------------------------

#[test]
fn three_decimal_currency() {
    let inv = InvoiceBuilder::new("KW-1", date(2024, 5, 1))
        .currency("KWD")
        .add_line(line("3", "1.2345").build())
        .build(&regime())
        .unwrap();
    let totals = inv.totals.unwrap();
    assert_eq!(totals.sum.to_string(), "3.704");
    assert_eq!(totals.tax.to_string(), "0.778");
    assert_eq!(totals.payable.to_string(), "4.482");
}

#[test]
fn currency_table() {
    assert_eq!(currency_scale("EUR"), Some(2));
    assert_eq!(currency_scale("JPY"), Some(0));
    assert_eq!(currency_scale("BHD"), Some(3));
    assert_eq!(currency_scale("ZZZ"), None);
    assert!(is_known_currency_code("USD"));
}

// ---------------------------------------------------------------------------
// Outlays and advances
// ---------------------------------------------------------------------------

#[test]
fn outlays_are_never_taxed() {
    let inv = InvoiceBuilder::new("O-1", date(2024, 5, 1))
        .add_line(line("1", "100.00").build())
        .add_outlay("Notary", amt("35.555"))
        .build(&regime())
        .unwrap();
    let totals = inv.totals.unwrap();
    assert_eq!(totals.tax.to_string(), "21.00");
    assert_eq!(totals.outlays.to_string(), "35.56");
    assert_eq!(totals.payable.to_string(), "156.56");
}

#[test]
fn full_advance_leaves_outlays_due() {
    let inv = InvoiceBuilder::new("A-1", date(2024, 5, 1))
        .add_line(line("1", "100.00").build())
        .add_outlay("Courier", amt("12.00"))
        .add_advance(Advance::percent("Prepaid", pct("100%")))
        .build(&regime())
        .unwrap();
    let totals = inv.totals.unwrap();
    assert_eq!(totals.advances.to_string(), "121.00");
    assert_eq!(totals.due.to_string(), "12.00");
}

#[test]
fn advances_do_not_cascade() {
    let inv = InvoiceBuilder::new("A-2", date(2024, 5, 1))
        .add_line(line("1", "100.00").build())
        .add_advance(Advance::percent("First", pct("50%")))
        .add_advance(Advance::percent("Second", pct("50%")))
        .build(&regime())
        .unwrap();
    let advances = inv.advances();
    assert_eq!(advances[0].amount, advances[1].amount);
    assert!(inv.totals.unwrap().due.is_zero());
}

#[test]
fn overpayment_gives_negative_due() {
    let inv = InvoiceBuilder::new("A-3", date(2024, 5, 1))
        .add_line(line("1", "10.00").build())
        .add_advance(Advance::amount("Card", amt("20.00")))
        .build(&regime())
        .unwrap();
    assert_eq!(inv.totals.unwrap().due.to_string(), "-7.90");
}

#[test]
fn fixed_advance_beyond_currency_precision() {
    let inv = InvoiceBuilder::new("A-5", date(2024, 5, 1))
        .add_line(line("1", "10.00").build())
        .add_advance(Advance::amount("Paid", amt("5.005")))
        .build(&regime())
        .unwrap();
    assert_eq!(inv.advances()[0].amount.unwrap().to_string(), "5.005");
    let totals = inv.totals.unwrap();
    assert_eq!(totals.advances.to_string(), "5.01");
    assert_eq!(totals.due.to_string(), "7.09");
}

#[test]
fn advance_without_value_is_malformed() {
    let result = InvoiceBuilder::new("A-4", date(2024, 5, 1))
        .add_line(line("1", "10.00").build())
        .add_advance(Advance {
            description: "?".into(),
            percent: None,
            amount: None,
        })
        .build(&regime());
    let err = result.unwrap_err();
    assert!(err.to_string().contains("payment.advances[0]"));
}

// ---------------------------------------------------------------------------
// Included taxes
// ---------------------------------------------------------------------------

#[test]
fn zero_rate_lines_keep_their_price() {
    let mut inv = InvoiceBuilder::new("Z-1", date(2024, 5, 1))
        .prices_include(TaxCategory::Vat)
        .add_line(
            LineBuilder::new("Book", amt("2"), amt("19.90"))
                .tax_rate(TaxCategory::Vat, RateKey::Zero)
                .build(),
        )
        .build(&regime())
        .unwrap();
    let ex = inv.remove_included_taxes().unwrap();
    assert_eq!(ex.lines[0].item.price.to_string(), "19.90");
    inv.calculate(&regime()).unwrap();
    assert_eq!(inv.totals.unwrap().payable.to_string(), "39.80");
}

#[test]
fn exempt_lines_survive_removal() {
    let inv = InvoiceBuilder::new("Z-2", date(2024, 5, 1))
        .prices_include(TaxCategory::Vat)
        .add_line(
            LineBuilder::new("Course", amt("1"), amt("250.00"))
                .tax_exempt(TaxCategory::Vat)
                .build(),
        )
        .add_line(line("1", "121.00").build())
        .build(&regime())
        .unwrap();
    let totals = inv.totals.as_ref().unwrap();
    assert_eq!(totals.total.to_string(), "350.00");
    assert_eq!(totals.payable.to_string(), "371.00");

    let mut ex = inv.remove_included_taxes().unwrap();
    assert_eq!(ex.lines[0].item.price.to_string(), "250.00");
    assert_eq!(ex.lines[1].item.price.to_string(), "100.0000");
    ex.calculate(&regime()).unwrap();
    assert_eq!(ex.totals.unwrap().payable.to_string(), "371.00");
}

#[test]
fn removal_resets_percent_advances() {
    let mut inv = InvoiceBuilder::new("Z-3", date(2024, 5, 1))
        .prices_include(TaxCategory::Vat)
        .add_line(line("1", "121.00").build())
        .add_advance(Advance::percent("Deposit", pct("10%")))
        .add_advance(Advance::amount("Cash", amt("5.00")))
        .build_unchecked()
        .unwrap();
    inv.calculate(&regime()).unwrap();
    let ex = inv.remove_included_taxes().unwrap();
    let advances = ex.advances();
    assert!(advances[0].amount.is_none());
    assert_eq!(advances[1].amount, Some(amt("5.00")));
    assert_eq!(inv.advances()[0].amount, Some(amt("12.10")));
}

#[test]
fn error_codes_are_stable() {
    let err = InvoiceBuilder::new("", date(2024, 5, 1)).build_unchecked().unwrap_err();
    assert_eq!(err.code(), "builder");
    let err = RegimeDef::new("XX", "ZZZ").validate().unwrap_err();
    assert_eq!(err.code(), "regime");
}
