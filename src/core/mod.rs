//! Document models, diagnostics and settings.
//!
//! This module holds everything the reconciliation engine reads and writes:
//! the UBL source model, the ebInterface target model, the diagnostics sink
//! and the policy settings.

mod builder;
mod diagnostics;
mod error;
pub mod rounding;
pub mod select;
mod settings;
mod source;
mod target;

pub use builder::*;
pub use diagnostics::*;
pub use error::*;
pub use settings::*;
pub use source::*;
pub use target::*;
