//! Core number model, currencies and errors.
//!
//! Everything here is independent of invoices: exact fixed-point amounts,
//! percentages, the currency precision table and exchange rates.

mod amount;
pub mod currencies;
mod error;
pub mod exchange;
mod percentage;

pub use amount::*;
pub use currencies::{CurrencyDef, currency_def, currency_scale, is_known_currency_code};
pub use error::*;
pub use exchange::ExchangeRate;
pub use percentage::*;
