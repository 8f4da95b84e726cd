//! # billcraft
//!
//! The calculation, validation, and persistence core of a single-tenant
//! invoicing tool: clients, invoices with line items, tax/discount totals,
//! a monotonic invoice-number generator, and a pluggable key-value store.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//! Totals are composed in full precision and rounded to two decimal places
//! only at the composition boundary.
//!
//! ## Quick Start
//!
//! ```rust
//! use billcraft::core::*;
//! use rust_decimal_macros::dec;
//!
//! let items = vec![
//!     LineItem::new("Design work", dec!(10), dec!(50)),
//!     LineItem::new("Hosting", dec!(1), dec!(25)),
//! ];
//!
//! // Discount applies to the subtotal; tax applies to what remains.
//! let totals = compose_totals(&items, dec!(18), Some(Discount::fixed(dec!(25))));
//! assert_eq!(totals.subtotal, dec!(525.00));
//! assert_eq!(totals.discount_amount, dec!(25.00));
//! assert_eq!(totals.tax_amount, dec!(90.00));
//! assert_eq!(totals.total, dec!(590.00));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Invoice/client types, totals, validation, numbering |
//! | `store` (default) | Key-value persistence, repository CRUD, export/import |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "store")]
pub mod store;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
