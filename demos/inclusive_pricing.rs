use chrono::NaiveDate;
use cuadre::*;
use rust_decimal_macros::dec;

fn main() {
    let regime = RegimeDef::new("ES", "EUR").with_category(
        CategoryDef::new(TaxCategory::Vat)
            .with_rate(
                RateDef::new(RateKey::Standard).with_value(RateValue::since(
                    NaiveDate::from_ymd_opt(2012, 9, 1).unwrap(),
                    Percentage::new(21, 2),
                )),
            )
            .with_rate(
                RateDef::new(RateKey::Reduced).with_value(RateValue::since(
                    NaiveDate::from_ymd_opt(2012, 9, 1).unwrap(),
                    Percentage::new(10, 2),
                )),
            ),
    );

    // Shelf prices already contain VAT
    let invoice = InvoiceBuilder::new("T-2024-0042", NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
        .prices_include(TaxCategory::Vat)
        .add_line(
            LineBuilder::new("Menú del día", Amount::from(dec!(4)), Amount::from(dec!(14.50)))
                .tax_rate(TaxCategory::Vat, RateKey::Reduced)
                .build(),
        )
        .add_line(
            LineBuilder::new("Vino", Amount::from(dec!(1)), Amount::from(dec!(18.00)))
                .tax_rate(TaxCategory::Vat, RateKey::Standard)
                .add_discount(LineAdjustment::percent(Percentage::new(10, 2)).with_reason("Happy hour"))
                .build(),
        )
        .add_advance(Advance::amount("Reserva", Amount::from(dec!(20.00))))
        .build(&regime)
        .expect("document should calculate");

    let totals = invoice.totals.as_ref().unwrap();
    println!("Inclusive rendering of {}", invoice.code);
    println!("  Sum:            {}", totals.sum);
    println!("  Total (net):    {}", totals.total);
    for category in &totals.taxes.categories {
        for rate in &category.rates {
            let percent = rate.percent.map(|p| p.to_string()).unwrap_or_else(|| "exempt".into());
            println!("  {} {:>7}:    {} on {}", category.code, percent, rate.amount, rate.base);
        }
    }
    println!("  Total with tax: {}", totals.total_with_tax);
    println!("  Due:            {}", totals.due);

    let mut exclusive = invoice
        .remove_included_taxes()
        .expect("included taxes should be removable");
    exclusive.calculate(&regime).expect("exclusive rendering should calculate");

    println!();
    println!("Exclusive rendering");
    for line in &exclusive.lines {
        println!("  {:<14} {} x {} = {}", line.item.name, line.quantity, line.item.price, line.total.unwrap_or_default());
    }
    let totals = exclusive.totals.as_ref().unwrap();
    println!("  Total with tax: {}", totals.total_with_tax);
    println!("  Due:            {}", totals.due);

    println!();
    println!("{}", serde_json::to_string_pretty(&exclusive).unwrap());
}
