//! # ebwandler
//!
//! Reconciliation engine converting UBL invoices and credit notes into
//! ebInterface documents (schema versions 4.0 to 6.1).
//!
//! The engine derives values the source leaves implicit (tax percentages,
//! taxable bases, tax amounts), picks exactly one payment method, normalizes
//! the signs of reductions and surcharges and merges payment terms. Instead of
//! failing on the first problem it records every deviation as a
//! [`Diagnostic`](core::Diagnostic) of severity WARNING or ERROR.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//! Reading and writing the XML dialects is left to external collaborators.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use ebwandler::core::*;
//! use ebwandler::convert::convert;
//! use rust_decimal_macros::dec;
//!
//! let doc = SourceDocumentBuilder::new("INV-7", NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
//!     .supplier(SourcePartyBuilder::new("ACME GmbH").vat_id("ATU12345678").build())
//!     .customer(SourcePartyBuilder::new("Kunde AG").vat_id("ATU87654321").build())
//!     .add_tax_subtotal(TaxSubtotalBuilder::vat("S").percent(dec!(20)).taxable_amount(dec!(100)).build())
//!     .add_payment_means(
//!         PaymentMeansCandidate::new("30")
//!             .with_channel("IBAN")
//!             .with_instruction_id("REF123")
//!             .with_account(FinancialAccount::iban("AT611904300234573201")),
//!     )
//!     .add_payment_terms(PaymentTerms::due(NaiveDate::from_ymd_opt(2024, 7, 15).unwrap()))
//!     .payable_amount(dec!(120))
//!     .build()
//!     .unwrap();
//!
//! let conversion = convert(&doc, &Settings::default());
//! assert!(conversion.diagnostics.is_empty());
//! let target = conversion.into_result().unwrap();
//! assert_eq!(target.tax.total_vat(), dec!(20.00));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` | Source/target models, diagnostics, settings |
//! | `convert` (default) | The reconciliation engine |
//! | `json` | `Settings::from_json_str` |
//! | `all` | Everything |
//!
//! Tests of optional features are gated on them; run the whole suite with
//! `cargo test --features all`.

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "convert")]
pub mod convert;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
