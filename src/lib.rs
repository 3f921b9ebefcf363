//! # cuadre
//!
//! Exact, reproducible invoice arithmetic: line sums, discounts and charges,
//! per-category tax breakdowns, included-tax removal and document totals
//! that reconcile to the last minor unit.
//!
//! All monetary values use [`Amount`], a fixed-point decimal with an
//! explicitly tracked scale, never floating point. Precision is only ever
//! reduced through [`Amount::rescale`] and every division names its target
//! scale.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use cuadre::*;
//!
//! let regime = RegimeDef::new("ES", "EUR").with_category(
//!     CategoryDef::new(TaxCategory::Vat).with_rate(
//!         RateDef::new(RateKey::Standard)
//!             .with_value(RateValue::since(NaiveDate::from_ymd_opt(2012, 9, 1).unwrap(), Percentage::new(21, 2))),
//!     ),
//! );
//!
//! let invoice = InvoiceBuilder::new("F-2024-001", NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
//!     .add_line(
//!         LineBuilder::new("Consulting", Amount::new(10, 0), Amount::new(15000, 2))
//!             .tax_rate(TaxCategory::Vat, RateKey::Standard)
//!             .build(),
//!     )
//!     .build(&regime)
//!     .unwrap();
//!
//! let totals = invoice.totals.unwrap();
//! assert_eq!(totals.total.to_string(), "1500.00");
//! assert_eq!(totals.tax.to_string(), "315.00");
//! assert_eq!(totals.payable.to_string(), "1815.00");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Amounts, tax regimes, invoice calculation |
//! | `json` | Load regime datasets from JSON |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "core")]
pub mod tax;

#[cfg(feature = "core")]
pub mod bill;

// Re-export the public surface at crate root for convenience
#[cfg(feature = "core")]
pub use crate::bill::*;
#[cfg(feature = "core")]
pub use crate::core::*;
#[cfg(feature = "core")]
pub use crate::tax::*;
