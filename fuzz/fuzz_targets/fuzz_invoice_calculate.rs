#![no_main]

use chrono::NaiveDate;
use cuadre::*;
use libfuzzer_sys::fuzz_target;

fn regime() -> RegimeDef {
    RegimeDef::new("ES", "EUR").with_category(
        CategoryDef::new(TaxCategory::Vat).with_rate(
            RateDef::new(RateKey::Standard).with_value(RateValue::since(
                NaiveDate::from_ymd_opt(2012, 9, 1).unwrap(),
                Percentage::new(21, 2),
            )),
        ),
    )
}

fuzz_target!(|data: &[u8]| {
    let Ok(mut invoice) = serde_json::from_slice::<Invoice>(data) else {
        return;
    };
    let regime = regime();
    // A document that calculates once must calculate again and survive removal.
    if invoice.calculate(&regime).is_ok() {
        let _ = invoice.calculate(&regime);
        if let Ok(mut exclusive) = invoice.remove_included_taxes() {
            let _ = exclusive.calculate(&regime);
        }
    }
});
