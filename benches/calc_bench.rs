use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal_macros::dec;

use cuadre::*;

fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn regime() -> RegimeDef {
    RegimeDef::new("ES", "EUR").with_category(
        CategoryDef::new(TaxCategory::Vat)
            .with_rate(
                RateDef::new(RateKey::Standard)
                    .with_value(RateValue::since(
                        NaiveDate::from_ymd_opt(2012, 9, 1).unwrap(),
                        Percentage::new(21, 2),
                    ))
                    .with_value(RateValue::always(Percentage::new(18, 2))),
            )
            .with_rate(
                RateDef::new(RateKey::Reduced)
                    .with_value(RateValue::always(Percentage::new(10, 2))),
            ),
    )
}

fn build_invoice(lines: usize, inclusive: bool) -> Invoice {
    let mut builder = InvoiceBuilder::new("BENCH-001", test_date());
    if inclusive {
        builder = builder.prices_include(TaxCategory::Vat);
    }
    for i in 1..=lines {
        // 12.10 at 21% and 11.00 at 10% both net to 10.00
        let (key, price) = if i % 3 == 0 {
            (RateKey::Reduced, dec!(11.00))
        } else {
            (RateKey::Standard, dec!(12.10))
        };
        builder = builder.add_line(
            LineBuilder::new(
                format!("Item {i}"),
                Amount::from(dec!(3)),
                Amount::from(price),
            )
            .add_discount(LineAdjustment::percent(Percentage::new(10, 2)))
            .tax_rate(TaxCategory::Vat, key)
            .build(),
        );
    }
    builder
        .add_outlay("Shipping", Amount::from(dec!(4.95)))
        .add_advance(Advance::percent("Deposit", Percentage::new(25, 2)))
        .build_unchecked()
        .unwrap()
}

fn bench_calculate(c: &mut Criterion) {
    let regime = regime();
    let invoice = build_invoice(10, false);
    c.bench_function("calculate_10_lines", |b| {
        b.iter(|| {
            let mut inv = invoice.clone();
            calculate(black_box(&mut inv), &regime).unwrap();
            black_box(inv)
        });
    });
}

fn bench_calculate_1000_lines(c: &mut Criterion) {
    let regime = regime();
    let invoice = build_invoice(1000, false);
    c.bench_function("calculate_1000_lines", |b| {
        b.iter(|| {
            let mut inv = invoice.clone();
            calculate(black_box(&mut inv), &regime).unwrap();
            black_box(inv)
        });
    });
}

fn bench_calculate_inclusive_1000_lines(c: &mut Criterion) {
    let regime = regime();
    let invoice = build_invoice(1000, true);
    c.bench_function("calculate_inclusive_1000_lines", |b| {
        b.iter(|| {
            let mut inv = invoice.clone();
            calculate(black_box(&mut inv), &regime).unwrap();
            black_box(inv)
        });
    });
}

fn bench_remove_included_taxes(c: &mut Criterion) {
    let regime = regime();
    let mut invoice = build_invoice(1000, true);
    invoice.calculate(&regime).unwrap();
    c.bench_function("remove_included_taxes_1000_lines", |b| {
        b.iter(|| black_box(remove_included_taxes(black_box(&invoice)).unwrap()));
    });
}

fn bench_json_roundtrip(c: &mut Criterion) {
    let regime = regime();
    let mut invoice = build_invoice(100, false);
    invoice.calculate(&regime).unwrap();
    let json = serde_json::to_string(&invoice).unwrap();
    c.bench_function("json_parse_and_calculate_100_lines", |b| {
        b.iter(|| {
            let mut inv: Invoice = serde_json::from_str(black_box(&json)).unwrap();
            inv.calculate(&regime).unwrap();
            black_box(inv)
        });
    });
}

criterion_group!(
    benches,
    bench_calculate,
    bench_calculate_1000_lines,
    bench_calculate_inclusive_1000_lines,
    bench_remove_included_taxes,
    bench_json_roundtrip,
);
criterion_main!(benches);
