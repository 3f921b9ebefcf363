#![no_main]

use cuadre::{Amount, Percentage};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Must not panic; errors are fine.
        if let Ok(a) = s.parse::<Amount>() {
            let _ = a.rescale(2);
            let _ = a.checked_mul(a);
            let _ = a.divide(Amount::new(121, 2), 6);
        }
        if let Ok(p) = s.parse::<Percentage>() {
            let _ = p.remove(Amount::new(100000, 2), 6);
        }
    }
});
