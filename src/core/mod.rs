//! Core invoice types, totals arithmetic, validation, and numbering.
//!
//! Everything here is pure and synchronous; persistence lives behind the
//! seams in [`crate::store`] and the [`CounterStore`] trait.

mod builder;
mod calc;
mod error;
mod numbering;
mod reports;
mod types;
mod validation;

pub use builder::*;
pub use calc::*;
pub use error::*;
pub use numbering::*;
pub use reports::*;
pub use types::*;
pub use validation::*;
