//! # gstbill
//!
//! Invoice engine for hotels billing under Indian GST: per-item CGST/SGST or
//! IGST split, whole-unit rounding with an explicit round-off, and gap-free
//! per-hotel invoice numbering that is safe under concurrent issuance.
//!
//! All monetary values use [`rust_decimal::Decimal`] — never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use gstbill::core::*;
//! use rust_decimal_macros::dec;
//!
//! let items = vec![
//!     LineItemBuilder::new("Deluxe Room", "996311")
//!         .room_rent(dec!(1000))
//!         .build(),
//! ];
//!
//! // Same state: 9% CGST + 9% SGST.
//! let totals = compute_invoice_totals(&items, "KA", "KA").unwrap();
//! assert_eq!(totals.tax_details.room_rent_cgst, dec!(90));
//! assert_eq!(totals.total_amount, dec!(1180));
//!
//! // Different state: 18% IGST.
//! let totals = compute_invoice_totals(&items, "KA", "MH").unwrap();
//! assert_eq!(totals.tax_details.room_rent_igst, dec!(180));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Types, tax engine, numbering format, validation, config |
//! | `issuer` (default) | Per-hotel number issuer, counter store, invoice desk |
//! | `json` | Load [`EngineConfig`](crate::core::EngineConfig) from JSON |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "issuer")]
pub mod issuer;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
